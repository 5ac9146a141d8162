use crate::models::error::CaptureError;
use crate::models::video_models::{BufferId, MediaTime};
use crate::processing::frame_slot_ring::FrameSurface;

/// Callback invoked with the surface selected for a delivered frame.
///
/// Runs under the slot lock; the surface may be overwritten or recycled by
/// the next delivery, so copy anything that must outlive the call.
pub type FrameCallback = Box<dyn FnMut(&FrameSurface) + Send + 'static>;

/// Host media service as seen by the video pipeline.
pub trait VideoHost: Send + Sync {
    /// Current performance time on the node's time source.
    fn now(&self) -> MediaTime;

    /// Block the calling thread until `time` (bounded real-time wait).
    fn wait_until(&self, time: MediaTime);

    /// Hand a buffer back to its producer for reuse.
    fn recycle(&self, id: BufferId);

    /// Add `surface` to the consumer's buffer group and return its identity.
    fn add_buffer(&self, slot: usize, surface: &FrameSurface) -> Result<BufferId, CaptureError>;

    /// Offer (`Some`) or withdraw (`None`) our buffers for the producer to fill.
    fn set_output_buffers(&self, buffers: Option<&[BufferId]>) -> Result<(), CaptureError>;

    /// Wait for the producer to return every buffer of our group.
    fn reclaim_buffers(&self) -> Result<(), CaptureError>;

    /// Delete the buffer group holding `buffers`.
    fn remove_buffers(&self, buffers: &[BufferId]);
}
