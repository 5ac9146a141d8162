use thiserror::Error;

/// Errors that can occur while setting up or running a capture pipeline.
///
/// Delivery-path failures never escape as panics: the affected delivery is
/// dropped and the error is logged or recorded as the pipeline status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("pipeline not initialized")]
    NotInitialized,

    #[error("capture device not available")]
    DeviceNotAvailable,

    #[error("invalid media format: {0}")]
    InvalidFormat(String),

    #[error("negotiated format mismatch: {0}")]
    FormatMismatch(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("failed to grow buffer to {requested} samples")]
    BufferAllocation { requested: usize },

    #[error("bad format: {0}")]
    BadFormat(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("host error: {0}")]
    Host(String),
}
