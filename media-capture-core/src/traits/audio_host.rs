use crate::models::audio_models::{AudioInputDevice, RawAudioFormat};
use crate::models::error::CaptureError;

/// Callback invoked with decoded (and possibly resampled) audio.
///
/// Parameters:
/// - `samples`: Interleaved stereo f32 samples `[L0, R0, L1, R1, ...]`.
/// - `frames`: Number of stereo frames in `samples`.
///
/// The slice is only valid for the duration of the call; it is reused by the
/// next delivery.
pub type AudioCallback = Box<dyn FnMut(&[f32], usize) + Send + 'static>;

/// Host media service as seen by the audio pipeline.
///
/// The host owns device discovery, node registration and the connection
/// handshake. Once started it delivers raw buffers by calling
/// `AudioPipeline::deliver` on its real-time thread.
pub trait AudioHost: Send {
    /// The default audio input and the raw format it advertises.
    fn default_input(&mut self) -> Result<AudioInputDevice, CaptureError>;

    /// Create a recorder node named `node_name`, connect it to the default
    /// input and return the format the connection settled on.
    fn connect(&mut self, node_name: &str) -> Result<RawAudioFormat, CaptureError>;

    /// Begin delivering buffers.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop delivering buffers.
    fn stop(&mut self);

    /// Tear down the recorder connection.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}
