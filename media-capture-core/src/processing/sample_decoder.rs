use crate::models::audio_models::SampleEncoding;

/// Number of interleaved channels in decoded output.
pub const STEREO_CHANNELS: usize = 2;

#[inline]
pub fn int16_to_float(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

#[inline]
pub fn int8_to_float(sample: i8) -> f32 {
    sample as f32 / 128.0
}

#[inline]
pub fn uint8_to_float(sample: u8) -> f32 {
    (sample as i16 - 128) as f32 / 128.0
}

#[inline]
pub fn int32_to_float(sample: i32) -> f32 {
    (sample as f64 / 2147483648.0) as f32
}

/// Converts raw interleaved host frames into stereo `f32` frames.
///
/// Channel 0 feeds the left output, channel 1 the right. Mono input is
/// duplicated to both sides and channels beyond the second are ignored.
/// Samples are read in native byte order.
#[derive(Debug, Clone, Copy)]
pub struct SampleDecoder {
    channels: usize,
    encoding: SampleEncoding,
}

impl SampleDecoder {
    pub fn new(channels: u32, encoding: SampleEncoding) -> Self {
        Self {
            channels: channels as usize,
            encoding,
        }
    }

    /// Bytes per input frame; 0 when the channel count or encoding is unusable.
    pub fn frame_size(&self) -> usize {
        self.encoding.sample_size().unwrap_or(0) * self.channels
    }

    /// Decode a single channel sample. Unknown encodings and short input decode to silence.
    pub fn decode_sample(&self, bytes: &[u8]) -> f32 {
        match self.encoding {
            SampleEncoding::Float32 => read_array(bytes).map(f32::from_ne_bytes).unwrap_or(0.0),
            SampleEncoding::Int32 => read_array(bytes)
                .map(|b| int32_to_float(i32::from_ne_bytes(b)))
                .unwrap_or(0.0),
            SampleEncoding::Int16 => read_array(bytes)
                .map(|b| int16_to_float(i16::from_ne_bytes(b)))
                .unwrap_or(0.0),
            SampleEncoding::Int8 => bytes.first().map(|&b| int8_to_float(b as i8)).unwrap_or(0.0),
            SampleEncoding::UInt8 => bytes.first().map(|&b| uint8_to_float(b)).unwrap_or(0.0),
            SampleEncoding::Unknown(_) => 0.0,
        }
    }

    /// Decode one raw frame into a `(left, right)` pair.
    pub fn decode_frame(&self, frame: &[u8]) -> (f32, f32) {
        let Some(sample_size) = self.encoding.sample_size() else {
            return (0.0, 0.0);
        };
        if self.channels == 0 {
            return (0.0, 0.0);
        }

        let left = self.decode_sample(frame);
        let right = if self.channels >= 2 {
            frame
                .get(sample_size..)
                .map(|rest| self.decode_sample(rest))
                .unwrap_or(0.0)
        } else {
            left
        };
        (left, right)
    }

    /// Decode every whole frame in `data` into interleaved stereo `out`.
    ///
    /// `out` must hold at least `2 * frames` samples. Returns the number of
    /// frames written; a trailing partial frame is ignored.
    pub fn decode_into(&self, data: &[u8], out: &mut [f32]) -> usize {
        let frame_size = self.frame_size();
        if frame_size == 0 {
            return 0;
        }

        let frames = (data.len() / frame_size).min(out.len() / STEREO_CHANNELS);
        for (frame, pair) in data
            .chunks_exact(frame_size)
            .zip(out.chunks_exact_mut(STEREO_CHANNELS))
            .take(frames)
        {
            let (left, right) = self.decode_frame(frame);
            pair[0] = left;
            pair[1] = right;
        }
        frames
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}
