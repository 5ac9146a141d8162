use crate::models::audio_models::RawAudioFormat;
use crate::models::error::CaptureError;
use crate::processing::growable_buffer::GrowableBuffer;
use crate::processing::linear_resampler::{resampling_ratio, LinearResampler, RATE_EPSILON};
use crate::processing::sample_decoder::{SampleDecoder, STEREO_CHANNELS};

/// Result of processing one raw delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Empty or malformed input; nothing was decoded.
    Skipped,
    /// Input was decoded; `output_frames` were handed to the callback
    /// (zero means the callback was not invoked).
    Processed { input_frames: usize, output_frames: usize },
}

/// Mutable per-session audio state, touched only by the delivery thread.
///
/// Owns the decode and resample scratch buffers and the resampler phase so
/// they persist across deliveries.
#[derive(Debug)]
pub struct AudioSession {
    target_sample_rate: f32,
    device_format: RawAudioFormat,
    resampler: LinearResampler,
    decoded: GrowableBuffer,
    resampled: GrowableBuffer,
}

impl AudioSession {
    pub fn new(target_sample_rate: f32, device_format: RawAudioFormat) -> Self {
        Self {
            target_sample_rate,
            device_format,
            resampler: LinearResampler::for_rates(device_format.frame_rate, target_sample_rate),
            decoded: GrowableBuffer::new(),
            resampled: GrowableBuffer::new(),
        }
    }

    pub fn device_format(&self) -> &RawAudioFormat {
        &self.device_format
    }

    /// The configured target rate, whether or not it is in effect.
    pub fn configured_target_rate(&self) -> f32 {
        self.target_sample_rate
    }

    /// The rate delivered to the callback's consumer, or `0.0` in passthrough.
    pub fn effective_target_rate(&self) -> f32 {
        if self.is_resampling() {
            self.target_sample_rate
        } else {
            0.0
        }
    }

    pub fn ratio(&self) -> f64 {
        self.resampler.ratio()
    }

    pub fn is_resampling(&self) -> bool {
        !self.resampler.is_passthrough()
    }

    pub fn carryover(&self) -> f64 {
        self.resampler.carryover()
    }

    pub fn decoded_capacity(&self) -> usize {
        self.decoded.capacity()
    }

    pub fn resampled_capacity(&self) -> usize {
        self.resampled.capacity()
    }

    /// Adopt a newly negotiated device format. The ratio is only recomputed
    /// when the rate moved by more than [`RATE_EPSILON`].
    pub fn update_device_format(&mut self, format: RawAudioFormat) {
        let old_rate = self.device_format.frame_rate;
        self.device_format = format;
        if (old_rate as f64 - format.frame_rate as f64).abs() > RATE_EPSILON {
            self.resampler
                .set_ratio(resampling_ratio(format.frame_rate, self.target_sample_rate));
        }
    }

    pub fn set_target_sample_rate(&mut self, target_sample_rate: f32) {
        let old_rate = self.target_sample_rate;
        self.target_sample_rate = target_sample_rate;
        if (old_rate as f64 - target_sample_rate as f64).abs() > RATE_EPSILON {
            self.resampler
                .set_ratio(resampling_ratio(self.device_format.frame_rate, target_sample_rate));
        }
    }

    /// Restart resampling phase without touching the scratch buffers.
    pub fn reset_phase(&mut self) {
        self.resampler.reset();
    }

    /// Release both scratch buffers and zero the carryover.
    pub fn reset(&mut self) {
        self.decoded.release();
        self.resampled.release();
        self.resampler.reset();
    }

    /// Decode one raw delivery, resample it when a target rate is in effect,
    /// and hand the result to `deliver` as interleaved stereo plus a frame count.
    ///
    /// `deliver` is called at most once, and not at all when resampling
    /// produced no frames yet. A buffer growth failure aborts this delivery
    /// only; session state stays usable.
    pub fn process<F>(
        &mut self,
        data: &[u8],
        format: &RawAudioFormat,
        mut deliver: F,
    ) -> Result<DeliveryOutcome, CaptureError>
    where
        F: FnMut(&[f32], usize),
    {
        if data.is_empty() {
            return Ok(DeliveryOutcome::Skipped);
        }

        let decoder = SampleDecoder::new(format.channel_count, format.encoding);
        let frame_size = decoder.frame_size();
        if frame_size == 0 {
            log::warn!(
                "Invalid input format (channels={}, encoding={:?})",
                format.channel_count,
                format.encoding
            );
            return Ok(DeliveryOutcome::Skipped);
        }

        let input_frames = data.len() / frame_size;
        if input_frames == 0 {
            return Ok(DeliveryOutcome::Skipped);
        }

        let decoded_len = input_frames * STEREO_CHANNELS;
        self.decoded.ensure(decoded_len)?;
        decoder.decode_into(data, &mut self.decoded.as_mut_slice()[..decoded_len]);
        let decoded = &self.decoded.as_slice()[..decoded_len];

        if !self.is_resampling() {
            deliver(decoded, input_frames);
            return Ok(DeliveryOutcome::Processed {
                input_frames,
                output_frames: input_frames,
            });
        }

        let max_output_samples = self
            .resampler
            .max_output_frames(input_frames)
            .checked_mul(STEREO_CHANNELS)
            .ok_or(CaptureError::BufferAllocation {
                requested: usize::MAX,
            })?;
        self.resampled.ensure(max_output_samples)?;
        let output_frames = self
            .resampler
            .process(decoded, self.resampled.as_mut_slice());

        if output_frames > 0 {
            deliver(
                &self.resampled.as_slice()[..output_frames * STEREO_CHANNELS],
                output_frames,
            );
        }
        Ok(DeliveryOutcome::Processed {
            input_frames,
            output_frames,
        })
    }
}
