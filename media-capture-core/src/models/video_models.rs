use serde::Serialize;

/// Performance time in microseconds on the host's time source.
pub type MediaTime = i64;

/// Identity token of a host media buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Pixel layout of a video surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Wildcard; the producer has not picked a layout yet.
    NoColorSpace,
    Rgb32,
    Rgba32,
    Rgb24,
    Rgb16,
    Rgb15,
    Rgba15,
    Cmap8,
    Gray8,
    Gray1,
    YCbCr422,
    /// A host color space code surfaces cannot represent.
    Other(u32),
}

impl ColorSpace {
    pub fn from_code(code: u32) -> Self {
        match code {
            0x0000 => Self::NoColorSpace,
            0x0008 => Self::Rgb32,
            0x2008 => Self::Rgba32,
            0x0003 => Self::Rgb24,
            0x0005 => Self::Rgb16,
            0x0010 => Self::Rgb15,
            0x2010 => Self::Rgba15,
            0x0004 => Self::Cmap8,
            0x0002 => Self::Gray8,
            0x0001 => Self::Gray1,
            0x4000 => Self::YCbCr422,
            other => Self::Other(other),
        }
    }

    pub fn bits_per_pixel(&self) -> Option<u32> {
        match self {
            Self::Rgb32 | Self::Rgba32 => Some(32),
            Self::Rgb24 => Some(24),
            Self::Rgb16 | Self::Rgb15 | Self::Rgba15 | Self::YCbCr422 => Some(16),
            Self::Cmap8 | Self::Gray8 => Some(8),
            Self::Gray1 => Some(1),
            Self::NoColorSpace | Self::Other(_) => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::NoColorSpace)
    }

    /// Whether a frame surface can be allocated (and drawn) in this layout.
    pub fn is_supported(&self) -> bool {
        self.bits_per_pixel().is_some()
    }
}

/// Raw video format negotiated with the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFormat {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    /// Filled in by the consumer once surfaces exist; 0 means unset.
    pub bytes_per_row: u32,
}

impl VideoFormat {
    pub fn new(width: u32, height: u32, color_space: ColorSpace) -> Self {
        Self {
            width,
            height,
            color_space,
            bytes_per_row: 0,
        }
    }

    pub fn wildcard() -> Self {
        Self::new(0, 0, ColorSpace::NoColorSpace)
    }

    /// Row stride padded to 32 bits, as surfaces lay rows out.
    pub fn padded_bytes_per_row(&self) -> Option<usize> {
        let bits = self.color_space.bits_per_pixel()? as usize;
        Some((self.width as usize * bits + 31) / 32 * 4)
    }

    /// Total surface size in bytes, or `None` when the format is incomplete.
    pub fn surface_len(&self) -> Option<usize> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        self.padded_bytes_per_row()?.checked_mul(self.height as usize)
    }
}

/// A video buffer delivered by the producer.
///
/// For buffers the consumer handed to the producer (owned buffers) the pixel
/// data already lives in the matching slot surface and `data` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoBuffer {
    pub id: BufferId,
    pub start_time: MediaTime,
    pub data: Vec<u8>,
}

impl VideoBuffer {
    pub fn new(id: BufferId, start_time: MediaTime, data: Vec<u8>) -> Self {
        Self { id, start_time, data }
    }
}

/// Counters for debugging a video consumer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoDiagnostics {
    pub frames_received: u64,
    pub frames_dispatched: u64,
    pub frames_copied: u64,
    pub frames_dropped: u64,
    pub buffers_recycled: u64,
    pub early_waits: u64,
}
