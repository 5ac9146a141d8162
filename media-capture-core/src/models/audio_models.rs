use serde::Serialize;

/// Host format code for 32-bit float samples.
pub const FORMAT_CODE_FLOAT: u32 = 0x24;
/// Host format code for signed 32-bit integer samples.
pub const FORMAT_CODE_INT: u32 = 0x4;
/// Host format code for signed 16-bit integer samples.
pub const FORMAT_CODE_SHORT: u32 = 0x2;
/// Host format code for signed 8-bit samples.
pub const FORMAT_CODE_CHAR: u32 = 0x11;
/// Host format code for unsigned 8-bit samples.
pub const FORMAT_CODE_UCHAR: u32 = 0x1;

/// Encoding of one sample in a raw audio buffer delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleEncoding {
    Float32,
    Int32,
    Int16,
    Int8,
    UInt8,
    /// A host format code the core does not understand.
    Unknown(u32),
}

impl SampleEncoding {
    pub fn from_format_code(code: u32) -> Self {
        match code {
            FORMAT_CODE_FLOAT => Self::Float32,
            FORMAT_CODE_INT => Self::Int32,
            FORMAT_CODE_SHORT => Self::Int16,
            FORMAT_CODE_CHAR => Self::Int8,
            FORMAT_CODE_UCHAR => Self::UInt8,
            other => Self::Unknown(other),
        }
    }

    pub fn format_code(&self) -> u32 {
        match self {
            Self::Float32 => FORMAT_CODE_FLOAT,
            Self::Int32 => FORMAT_CODE_INT,
            Self::Int16 => FORMAT_CODE_SHORT,
            Self::Int8 => FORMAT_CODE_CHAR,
            Self::UInt8 => FORMAT_CODE_UCHAR,
            Self::Unknown(code) => *code,
        }
    }

    /// Size of one sample in bytes, or `None` for unknown encodings.
    pub fn sample_size(&self) -> Option<usize> {
        match self {
            Self::Float32 | Self::Int32 => Some(4),
            Self::Int16 => Some(2),
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Unknown(_) => None,
        }
    }
}

/// Raw audio format as advertised or negotiated by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawAudioFormat {
    pub frame_rate: f32,
    pub channel_count: u32,
    pub encoding: SampleEncoding,
}

impl RawAudioFormat {
    pub fn new(frame_rate: f32, channel_count: u32, encoding: SampleEncoding) -> Self {
        Self {
            frame_rate,
            channel_count,
            encoding,
        }
    }

    /// Bytes per interleaved frame, or `None` when channels or encoding are unusable.
    pub fn frame_size(&self) -> Option<usize> {
        let sample_size = self.encoding.sample_size()?;
        if self.channel_count == 0 {
            return None;
        }
        Some(sample_size * self.channel_count as usize)
    }

    pub fn is_valid(&self) -> bool {
        self.frame_rate > 0.0 && self.frame_rate.is_finite() && self.frame_size().is_some()
    }
}

/// The audio input node the host offers for capture.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputDevice {
    pub name: String,
    pub format: RawAudioFormat,
}

/// Counters for debugging an audio capture session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioDiagnostics {
    pub session_id: String,
    pub started_at: Option<String>,
    pub deliveries: u64,
    pub dropped_deliveries: u64,
    pub frames_decoded: u64,
    pub frames_emitted: u64,
    pub callback_count: u64,
}

impl AudioDiagnostics {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_codes_round_trip_known_encodings() {
        for encoding in [
            SampleEncoding::Float32,
            SampleEncoding::Int32,
            SampleEncoding::Int16,
            SampleEncoding::Int8,
            SampleEncoding::UInt8,
        ] {
            assert_eq!(SampleEncoding::from_format_code(encoding.format_code()), encoding);
        }
    }

    #[test]
    fn unknown_code_has_no_sample_size() {
        let encoding = SampleEncoding::from_format_code(0x99);
        assert_eq!(encoding, SampleEncoding::Unknown(0x99));
        assert_eq!(encoding.sample_size(), None);
    }

    #[test]
    fn frame_size_accounts_for_channels() {
        let format = RawAudioFormat::new(48000.0, 2, SampleEncoding::Int16);
        assert_eq!(format.frame_size(), Some(4));
        assert!(format.is_valid());
    }

    #[test]
    fn zero_channels_or_rate_is_invalid() {
        assert!(!RawAudioFormat::new(48000.0, 0, SampleEncoding::Float32).is_valid());
        assert!(!RawAudioFormat::new(0.0, 2, SampleEncoding::Float32).is_valid());
        assert!(!RawAudioFormat::new(48000.0, 2, SampleEncoding::Unknown(7)).is_valid());
    }

    #[test]
    fn diagnostics_serialize_with_session_id() {
        let diagnostics = AudioDiagnostics::new();
        assert_eq!(diagnostics.session_id.len(), 36);
        let json = diagnostics.to_json();
        assert!(json.contains("\"frames_emitted\": 0"));
    }
}
