use super::sample_decoder::STEREO_CHANNELS;

/// Rate differences at or below this are treated as equal.
pub const RATE_EPSILON: f64 = 1e-5;

/// Ratio of device rate to target rate, or `1.0` when no conversion is needed.
///
/// A non-positive target (or device) rate disables resampling, as does a
/// target within [`RATE_EPSILON`] of the device rate.
pub fn resampling_ratio(device_rate: f32, target_rate: f32) -> f64 {
    let device = device_rate as f64;
    let target = target_rate as f64;
    if target > 0.0 && device > 0.0 && (target - device).abs() > RATE_EPSILON {
        device / target
    } else {
        1.0
    }
}

/// Stateful linear-interpolation resampler for interleaved stereo frames.
///
/// The fractional read position is carried between calls, together with the
/// last input frame of the previous call. Resampling `A` then `B` therefore
/// yields the same frames as resampling `A ‖ B` in one call: the pair that
/// straddles the chunk boundary is interpolated instead of being dropped.
///
/// Output is only produced where both bounding input frames are present;
/// the remainder waits for the next chunk and is never extrapolated.
#[derive(Debug, Clone)]
pub struct LinearResampler {
    ratio: f64,
    /// Read position relative to `history` (or to the first frame of the next
    /// chunk when there is no history yet). Always in `[0, ratio)` between calls.
    offset: f64,
    history: Option<[f32; STEREO_CHANNELS]>,
}

impl LinearResampler {
    /// Create a resampler reading `ratio` input frames per output frame.
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            offset: 0.0,
            history: None,
        }
    }

    pub fn for_rates(device_rate: f32, target_rate: f32) -> Self {
        Self::new(resampling_ratio(device_rate, target_rate))
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Change the ratio. Phase and history are dropped since they were
    /// measured against the old rate.
    pub fn set_ratio(&mut self, ratio: f64) {
        if ratio != self.ratio {
            self.ratio = ratio;
            self.reset();
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.ratio == 1.0
    }

    /// Fractional input position carried into the next call.
    pub fn carryover(&self) -> f64 {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.history = None;
    }

    /// Upper bound on frames a call with `input_frames` frames can emit.
    /// Saturates at `usize::MAX` for extreme upsampling ratios.
    pub fn max_output_frames(&self, input_frames: usize) -> usize {
        if self.is_passthrough() {
            return input_frames;
        }
        let frames = ((input_frames as f64 + self.offset) / self.ratio).ceil() as usize;
        frames.saturating_add(2)
    }

    /// Resample interleaved stereo `input` into `output`, returning the number
    /// of frames written.
    ///
    /// `output` should hold `2 * max_output_frames(input_frames)` samples;
    /// when it is smaller, output stops early and the excess is lost.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> usize {
        let input_frames = input.len() / STEREO_CHANNELS;
        if input_frames == 0 {
            return 0;
        }

        if self.is_passthrough() {
            let samples = (input_frames * STEREO_CHANNELS).min(output.len());
            output[..samples].copy_from_slice(&input[..samples]);
            return samples / STEREO_CHANNELS;
        }

        let view = FrameView {
            history: self.history,
            input,
        };
        let total = view.len();
        let capacity = output.len() / STEREO_CHANNELS;

        let mut pos = self.offset;
        let mut emitted = 0;
        while emitted < capacity {
            let index = pos.floor() as usize;
            if index + 1 >= total {
                break;
            }
            let alpha = pos - index as f64;
            let a = view.frame(index);
            let b = view.frame(index + 1);

            let out = &mut output[emitted * STEREO_CHANNELS..(emitted + 1) * STEREO_CHANNELS];
            for ch in 0..STEREO_CHANNELS {
                out[ch] = (a[ch] as f64 * (1.0 - alpha) + b[ch] as f64 * alpha) as f32;
            }
            emitted += 1;
            pos += self.ratio;
        }

        self.offset = (pos - (total - 1) as f64).max(0.0);
        let last = (input_frames - 1) * STEREO_CHANNELS;
        self.history = Some([input[last], input[last + 1]]);
        emitted
    }
}

/// The carried history frame followed by the current chunk.
struct FrameView<'a> {
    history: Option<[f32; STEREO_CHANNELS]>,
    input: &'a [f32],
}

impl FrameView<'_> {
    fn lead(&self) -> usize {
        usize::from(self.history.is_some())
    }

    fn len(&self) -> usize {
        self.lead() + self.input.len() / STEREO_CHANNELS
    }

    fn frame(&self, index: usize) -> [f32; STEREO_CHANNELS] {
        match self.history {
            Some(frame) if index == 0 => frame,
            _ => {
                let start = (index - self.lead()) * STEREO_CHANNELS;
                [self.input[start], self.input[start + 1]]
            }
        }
    }
}
