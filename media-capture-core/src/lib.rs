//! # media-capture-core
//!
//! Host-agnostic media capture core library.
//!
//! Turns raw audio delivered by an input device into interleaved stereo
//! float frames at a requested sample rate, and hands captured video frames
//! to a consumer through a small ring of reusable surfaces. Host media
//! services implement the `AudioHost` and `VideoHost` traits and plug into
//! the generic `AudioPipeline` and `VideoPipeline`.
//!
//! ## Architecture
//!
//! ```text
//! media-capture-core (this crate)
//! ├── traits/       ← AudioHost, VideoHost, AudioCallback, FrameCallback
//! ├── models/       ← CaptureError, CaptureState, CaptureConfiguration, formats, diagnostics
//! ├── processing/   ← SampleDecoder, LinearResampler, GrowableBuffer, FrameSlotRing, event queue
//! └── session/      ← AudioSession, AudioPipeline, VideoPipeline
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioDiagnostics, AudioInputDevice, RawAudioFormat, SampleEncoding};
pub use models::config::CaptureConfiguration;
pub use models::error::CaptureError;
pub use models::state::{CaptureState, HostNotification, RunState};
pub use models::video_models::{
    BufferId, ColorSpace, MediaTime, VideoBuffer, VideoDiagnostics, VideoFormat,
};
pub use processing::frame_slot_ring::{FrameSlotRing, FrameSurface, SLOT_COUNT};
pub use processing::growable_buffer::GrowableBuffer;
pub use processing::linear_resampler::LinearResampler;
pub use processing::sample_decoder::SampleDecoder;
pub use processing::timed_event_queue::{EventKind, TimedEvent, TimedEventQueue};
pub use session::audio_pipeline::AudioPipeline;
pub use session::audio_session::{AudioSession, DeliveryOutcome};
pub use session::video_pipeline::VideoPipeline;
pub use traits::audio_host::{AudioCallback, AudioHost};
pub use traits::video_host::{FrameCallback, VideoHost};
