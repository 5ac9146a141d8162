use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::state::RunState;
use crate::models::video_models::{BufferId, MediaTime, VideoBuffer, VideoDiagnostics, VideoFormat};
use crate::processing::frame_slot_ring::{FrameSlotRing, FrameSurface};
use crate::processing::timed_event_queue::{EventKind, TimedEvent, TimedEventQueue};
use crate::traits::video_host::{FrameCallback, VideoHost};

/// Processing latency reported to the producer, in microseconds.
pub const CONSUMER_LATENCY: MediaTime = 3000;

/// Frames starting further than this in the future are held back until their
/// start time before dispatch.
pub const EARLY_DISPATCH_THRESHOLD: MediaTime = 3000;

struct NodeState {
    run_state: RunState,
    connection_active: bool,
    input_format: VideoFormat,
    performance_time_base: MediaTime,
}

/// Everything guarded by the slot lock.
struct SlotTarget {
    ring: Option<FrameSlotRing>,
    callback: Option<FrameCallback>,
}

/// Video consumer node exchanging a ring of capture surfaces with a producer.
///
/// Buffers arrive through [`buffer_received`](Self::buffer_received) and are
/// queued at their start time. The host's real-time thread drains the queue
/// with [`run_pending`](Self::run_pending). Each due frame is matched to a
/// slot: owned buffers are used in place, foreign ones are copied into the
/// next slot. The frame callback then runs and buffers are recycled:
/// ```text
/// buffer_received → [TimedEventQueue] → run_pending → [FrameSlotRing] → callback → recycle
/// ```
///
/// Slot selection, callback and recycle bookkeeping form one critical
/// section under the slot lock, shared with
/// [`with_current_frame`](Self::with_current_frame) readers.
pub struct VideoPipeline<H: VideoHost> {
    name: String,
    host: H,
    node: Mutex<NodeState>,
    target: Mutex<SlotTarget>,
    events: Mutex<TimedEventQueue>,
    diagnostics: Mutex<VideoDiagnostics>,
}

impl<H: VideoHost> VideoPipeline<H> {
    pub fn new(name: impl Into<String>, host: H) -> Self {
        Self {
            name: name.into(),
            host,
            node: Mutex::new(NodeState {
                run_state: RunState::Stopped,
                connection_active: false,
                input_format: VideoFormat::wildcard(),
                performance_time_base: 0,
            }),
            target: Mutex::new(SlotTarget {
                ring: None,
                callback: None,
            }),
            events: Mutex::new(TimedEventQueue::new()),
            diagnostics: Mutex::new(VideoDiagnostics::default()),
        }
    }

    pub fn set_frame_callback(&self, callback: FrameCallback) {
        self.target.lock().callback = Some(callback);
    }

    pub fn clear_frame_callback(&self) {
        self.target.lock().callback = None;
    }

    // --- Format negotiation and connection ---

    /// Check a proposed format. Wildcard color spaces are left for the producer to pick.
    pub fn accept_format(&self, format: &VideoFormat) -> Result<(), CaptureError> {
        let color_space = format.color_space;
        if !color_space.is_wildcard() && !color_space.is_supported() {
            log::warn!("{}: unsupported color space {:?}", self.name, color_space);
            return Err(CaptureError::BadFormat(format!(
                "unsupported color space {:?}",
                color_space
            )));
        }
        Ok(())
    }

    /// Build the slot ring for `format` and offer its buffers to the producer.
    ///
    /// Returns the input format completed with the surface row stride.
    pub fn connected(&self, format: VideoFormat) -> Result<VideoFormat, CaptureError> {
        self.create_buffers(format).map_err(|e| {
            log::error!("{}: couldn't create buffers: {}", self.name, e);
            e
        })?;

        let (ids, bytes_per_row) = {
            let target = self.target.lock();
            let ring = target.ring.as_ref().ok_or(CaptureError::NotInitialized)?;
            let bytes_per_row = ring.format().map_or(0, |f| f.bytes_per_row);
            (ring.buffer_ids(), bytes_per_row)
        };

        if let Err(e) = self.host.set_output_buffers(Some(&ids)) {
            log::warn!("{}: producer is not using our buffers: {}", self.name, e);
        }

        let mut node = self.node.lock();
        node.input_format = VideoFormat {
            bytes_per_row,
            ..format
        };
        node.connection_active = true;
        Ok(node.input_format)
    }

    /// Withdraw our buffers from the producer and drop the display target.
    pub fn disconnected(&self) {
        if let Err(e) = self.host.set_output_buffers(None) {
            log::warn!("{}: failed to withdraw output buffers: {}", self.name, e);
        }

        let owned_mode = self
            .target
            .lock()
            .ring
            .as_ref()
            .is_some_and(|ring| ring.is_owned_mode());
        if owned_mode {
            if let Err(e) = self.host.reclaim_buffers() {
                log::error!("{}: failed to reclaim our buffers: {}", self.name, e);
            }
        }

        self.node.lock().connection_active = false;
        self.unset_target_buffer();
    }

    /// Rebuild the slot ring after the producer switched formats.
    pub fn format_changed(&self, format: VideoFormat) -> Result<(), CaptureError> {
        self.node.lock().input_format = format;
        self.create_buffers(format)
    }

    /// Replace the slot ring with one sized for `format`.
    pub fn create_buffers(&self, format: VideoFormat) -> Result<(), CaptureError> {
        self.delete_buffers();

        let mut registered = Vec::new();
        let ring = FrameSlotRing::new(format, |slot, surface| {
            let id = self.host.add_buffer(slot, surface)?;
            registered.push(id);
            Ok(id)
        });
        match ring {
            Ok(ring) => {
                self.target.lock().ring = Some(ring);
                Ok(())
            }
            Err(e) => {
                // Slots registered before the failure still belong to the host.
                if !registered.is_empty() {
                    self.host.remove_buffers(&registered);
                }
                Err(e)
            }
        }
    }

    /// Release the display target and destroy the slot ring.
    pub fn delete_buffers(&self) {
        let ring = {
            let mut target = self.target.lock();
            let Some(mut ring) = target.ring.take() else {
                return;
            };
            if let Some(id) = ring.unset_target() {
                self.recycle(id);
            }
            ring
        };
        self.host.remove_buffers(&ring.buffer_ids());
    }

    // --- Event scheduling ---

    /// Accept a buffer from the producer. Queued at its start time unless stopped.
    pub fn buffer_received(&self, buffer: VideoBuffer) {
        self.diagnostics.lock().frames_received += 1;
        if self.run_state() == RunState::Stopped {
            self.drop_buffer(buffer.id);
            return;
        }
        self.events
            .lock()
            .push(TimedEvent::new(buffer.start_time, EventKind::HandleBuffer(buffer)));
    }

    pub fn start(&self, performance_time: MediaTime) {
        self.events.lock().push(TimedEvent::new(performance_time, EventKind::Start));
    }

    pub fn stop(&self, performance_time: MediaTime) {
        self.events.lock().push(TimedEvent::new(performance_time, EventKind::Stop));
    }

    pub fn seek(&self, media_time: MediaTime, performance_time: MediaTime) {
        self.events.lock().push(TimedEvent::new(
            performance_time,
            EventKind::Seek {
                performance_time: media_time,
            },
        ));
    }

    pub fn warp(&self, real_time: MediaTime, performance_time: MediaTime) {
        self.events.lock().push(TimedEvent::new(
            real_time,
            EventKind::Warp { performance_time },
        ));
    }

    /// Dispatch every queued event due at or before `until`, in time order.
    /// Returns the number of events handled.
    pub fn run_pending(&self, until: MediaTime) -> usize {
        let mut handled = 0;
        loop {
            let Some(event) = self.events.lock().pop_due(until) else {
                break;
            };
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&self, event: TimedEvent) {
        match event.kind {
            EventKind::Start => {
                let mut node = self.node.lock();
                node.run_state = RunState::Started;
                node.performance_time_base = event.time;
            }
            EventKind::Seek { performance_time } | EventKind::Warp { performance_time } => {
                self.node.lock().performance_time_base = performance_time;
            }
            EventKind::Stop => {
                self.node.lock().run_state = RunState::Stopped;
                let flushed = self.events.lock().flush_buffers_until(event.time);
                for buffer in flushed {
                    self.drop_buffer(buffer.id);
                }
                self.unset_target_buffer();
            }
            EventKind::HandleBuffer(buffer) => self.handle_buffer(buffer),
        }
    }

    // --- Frame dispatch ---

    fn handle_buffer(&self, buffer: VideoBuffer) {
        let accepting = {
            let node = self.node.lock();
            node.run_state == RunState::Started && node.connection_active
        };
        if !accepting || self.target.lock().ring.is_none() {
            self.drop_buffer(buffer.id);
            return;
        }

        let too_early = buffer.start_time.saturating_sub(self.host.now());
        if too_early > EARLY_DISPATCH_THRESHOLD {
            self.diagnostics.lock().early_waits += 1;
            self.host.wait_until(buffer.start_time);
        }

        let recycle_delivered = {
            let mut guard = self.target.lock();
            let SlotTarget { ring, callback } = &mut *guard;
            match ring.as_mut() {
                Some(ring) => {
                    let selection = ring.classify(buffer.id);
                    if !selection.is_owned() {
                        ring.copy_into(selection.index, &buffer.data);
                        self.diagnostics.lock().frames_copied += 1;
                    }

                    let surface = ring.surface(selection.index);
                    if let (Some(callback), Some(surface)) = (callback.as_mut(), surface) {
                        callback(surface);
                    }

                    if let Some(previous) = ring.mark_displayed(selection, buffer.id) {
                        self.recycle(previous);
                    }
                    self.diagnostics.lock().frames_dispatched += 1;
                    !selection.is_owned()
                }
                // Ring torn down while we waited.
                None => {
                    self.diagnostics.lock().frames_dropped += 1;
                    true
                }
            }
        };

        if recycle_delivered {
            self.recycle(buffer.id);
        }
    }

    /// Release the retained slot back to the host and clear the display pointer.
    fn unset_target_buffer(&self) {
        let mut target = self.target.lock();
        if let Some(id) = target.ring.as_mut().and_then(|ring| ring.unset_target()) {
            self.recycle(id);
        }
    }

    fn recycle(&self, id: BufferId) {
        self.host.recycle(id);
        self.diagnostics.lock().buffers_recycled += 1;
    }

    fn drop_buffer(&self, id: BufferId) {
        self.diagnostics.lock().frames_dropped += 1;
        self.recycle(id);
    }

    // --- Inspection ---

    /// Run `f` on the most recently displayed surface, under the slot lock.
    pub fn with_current_frame<R>(&self, f: impl FnOnce(&FrameSurface) -> R) -> Option<R> {
        let target = self.target.lock();
        target.ring.as_ref()?.current_surface().map(f)
    }

    pub fn last_displayed(&self) -> Option<usize> {
        self.target.lock().ring.as_ref()?.last_displayed()
    }

    pub fn retained_buffer(&self) -> Option<BufferId> {
        self.target.lock().ring.as_ref()?.retained()
    }

    /// Identities of the ring's buffers, empty before a format is negotiated.
    pub fn slot_buffer_ids(&self) -> Vec<BufferId> {
        self.target
            .lock()
            .ring
            .as_ref()
            .map(|ring| ring.buffer_ids())
            .unwrap_or_default()
    }

    pub fn run_state(&self) -> RunState {
        self.node.lock().run_state
    }

    pub fn is_connected(&self) -> bool {
        self.node.lock().connection_active
    }

    pub fn input_format(&self) -> VideoFormat {
        self.node.lock().input_format
    }

    pub fn performance_time_base(&self) -> MediaTime {
        self.node.lock().performance_time_base
    }

    pub fn pending_events(&self) -> usize {
        self.events.lock().len()
    }

    pub fn latency(&self) -> MediaTime {
        CONSUMER_LATENCY
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn diagnostics(&self) -> VideoDiagnostics {
        self.diagnostics.lock().clone()
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: VideoHost> Drop for VideoPipeline<H> {
    fn drop(&mut self) {
        let queued = self.events.get_mut().drain_buffers();
        for buffer in queued {
            self.host.recycle(buffer.id);
        }
        self.delete_buffers();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::models::video_models::ColorSpace;

    #[derive(Default)]
    struct FakeVideoHost {
        now: AtomicI64,
        next_id: AtomicU64,
        refuse_buffers: bool,
        fail_add_at: Option<usize>,
        waits: Mutex<Vec<MediaTime>>,
        recycled: Arc<Mutex<Vec<BufferId>>>,
        offered: Mutex<Option<Vec<BufferId>>>,
        removed: Arc<Mutex<Vec<BufferId>>>,
        reclaims: AtomicUsize,
    }

    impl FakeVideoHost {
        fn recycled(&self) -> Vec<BufferId> {
            self.recycled.lock().clone()
        }
    }

    impl VideoHost for FakeVideoHost {
        fn now(&self) -> MediaTime {
            self.now.load(Ordering::SeqCst)
        }

        fn wait_until(&self, time: MediaTime) {
            self.waits.lock().push(time);
            self.now.store(time, Ordering::SeqCst);
        }

        fn recycle(&self, id: BufferId) {
            self.recycled.lock().push(id);
        }

        fn add_buffer(
            &self,
            slot: usize,
            _surface: &FrameSurface,
        ) -> Result<BufferId, CaptureError> {
            if self.fail_add_at == Some(slot) {
                return Err(CaptureError::Host("buffer group full".into()));
            }
            Ok(BufferId(1000 + self.next_id.fetch_add(1, Ordering::SeqCst)))
        }

        fn set_output_buffers(&self, buffers: Option<&[BufferId]>) -> Result<(), CaptureError> {
            if self.refuse_buffers && buffers.is_some() {
                return Err(CaptureError::Host("producer refused".into()));
            }
            *self.offered.lock() = buffers.map(|ids| ids.to_vec());
            Ok(())
        }

        fn reclaim_buffers(&self) -> Result<(), CaptureError> {
            self.reclaims.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn remove_buffers(&self, buffers: &[BufferId]) {
            self.removed.lock().extend_from_slice(buffers);
        }
    }

    const SURFACE_LEN: usize = 4 * 2 * 4;

    fn format() -> VideoFormat {
        VideoFormat::new(4, 2, ColorSpace::Rgb32)
    }

    fn frame(id: u64, start_time: MediaTime, fill: u8) -> VideoBuffer {
        VideoBuffer::new(BufferId(id), start_time, vec![fill; SURFACE_LEN])
    }

    type Seen = Arc<Mutex<Vec<u8>>>;

    /// Connected, started pipeline whose callback records each frame's first byte.
    fn running_pipeline(host: FakeVideoHost) -> (VideoPipeline<FakeVideoHost>, Seen) {
        let pipeline = VideoPipeline::new("Video Consumer", host);
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        pipeline.set_frame_callback(Box::new(move |surface: &FrameSurface| {
            sink.lock().push(surface.bits()[0]);
        }));
        pipeline.connected(format()).unwrap();
        pipeline.start(0);
        pipeline.run_pending(0);
        (pipeline, seen)
    }

    fn deliver(pipeline: &VideoPipeline<FakeVideoHost>, buffer: VideoBuffer) {
        let time = buffer.start_time;
        pipeline.buffer_received(buffer);
        pipeline.run_pending(time);
    }

    #[test]
    fn connect_offers_four_slots() {
        let pipeline = VideoPipeline::new("Video Consumer", FakeVideoHost::default());

        let negotiated = pipeline.connected(format()).unwrap();

        assert_eq!(negotiated.bytes_per_row, 16);
        assert!(pipeline.is_connected());
        let ids = pipeline.slot_buffer_ids();
        assert_eq!(ids.len(), 4);
        assert_eq!(*pipeline.host().offered.lock(), Some(ids));
        assert_eq!(pipeline.latency(), 3000);
    }

    #[test]
    fn refused_buffers_still_connect() {
        let host = FakeVideoHost {
            refuse_buffers: true,
            ..Default::default()
        };
        let pipeline = VideoPipeline::new("Video Consumer", host);

        assert!(pipeline.connected(format()).is_ok());
        assert!(pipeline.is_connected());
    }

    #[test]
    fn failed_registration_removes_earlier_slots() {
        let host = FakeVideoHost {
            fail_add_at: Some(2),
            ..Default::default()
        };
        let removed = Arc::clone(&host.removed);
        let pipeline = VideoPipeline::new("Video Consumer", host);

        assert!(pipeline.connected(format()).is_err());

        assert_eq!(*removed.lock(), vec![BufferId(1000), BufferId(1001)]);
        assert!(pipeline.slot_buffer_ids().is_empty());
        assert!(!pipeline.is_connected());
        assert_eq!(*pipeline.host().offered.lock(), None);
    }

    #[test]
    fn far_future_frame_waits_without_overflow() {
        let (pipeline, seen) = running_pipeline(FakeVideoHost::default());
        pipeline.host().now.store(-10, Ordering::SeqCst);

        pipeline.buffer_received(frame(1, MediaTime::MAX, 1));
        pipeline.run_pending(MediaTime::MAX);

        assert_eq!(*pipeline.host().waits.lock(), vec![MediaTime::MAX]);
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn frames_before_connection_are_recycled() {
        let pipeline = VideoPipeline::new("Video Consumer", FakeVideoHost::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        pipeline.set_frame_callback(Box::new(move |_: &FrameSurface| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        pipeline.start(0);
        pipeline.run_pending(0);

        deliver(&pipeline, frame(1, 0, 7));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.host().recycled(), vec![BufferId(1)]);
        assert_eq!(pipeline.diagnostics().frames_dropped, 1);
    }

    #[test]
    fn frames_while_stopped_are_recycled_immediately() {
        let pipeline = VideoPipeline::new("Video Consumer", FakeVideoHost::default());
        pipeline.connected(format()).unwrap();

        pipeline.buffer_received(frame(5, 0, 1));

        assert_eq!(pipeline.pending_events(), 0);
        assert_eq!(pipeline.host().recycled(), vec![BufferId(5)]);
    }

    #[test]
    fn foreign_frames_are_copied_round_robin() {
        let (pipeline, seen) = running_pipeline(FakeVideoHost::default());

        for (i, fill) in [10u8, 20, 30, 40, 50].into_iter().enumerate() {
            deliver(&pipeline, frame(i as u64 + 1, 0, fill));
            assert_eq!(pipeline.last_displayed(), Some(i % 4));
        }

        assert_eq!(*seen.lock(), vec![10, 20, 30, 40, 50]);
        assert_eq!(
            pipeline.host().recycled(),
            (1..=5).map(BufferId).collect::<Vec<_>>()
        );
        assert_eq!(pipeline.retained_buffer(), None);
        let diagnostics = pipeline.diagnostics();
        assert_eq!(diagnostics.frames_copied, 5);
        assert_eq!(diagnostics.frames_dispatched, 5);
        assert_eq!(pipeline.with_current_frame(|s| s.bits().to_vec()), Some(vec![50; SURFACE_LEN]));
    }

    #[test]
    fn owned_frames_are_not_copied_and_one_is_retained() {
        let (pipeline, seen) = running_pipeline(FakeVideoHost::default());
        let ids = pipeline.slot_buffer_ids();

        deliver(&pipeline, VideoBuffer::new(ids[2], 0, vec![99; SURFACE_LEN]));

        assert_eq!(pipeline.diagnostics().frames_copied, 0);
        assert_eq!(*seen.lock(), vec![0]);
        assert_eq!(pipeline.last_displayed(), Some(2));
        assert_eq!(pipeline.retained_buffer(), Some(ids[2]));
        assert!(pipeline.host().recycled().is_empty());

        deliver(&pipeline, VideoBuffer::new(ids[3], 0, Vec::new()));

        assert_eq!(pipeline.retained_buffer(), Some(ids[3]));
        assert_eq!(pipeline.host().recycled(), vec![ids[2]]);
    }

    #[test]
    fn switching_to_foreign_releases_retained_slot() {
        let (pipeline, _) = running_pipeline(FakeVideoHost::default());
        let ids = pipeline.slot_buffer_ids();

        deliver(&pipeline, VideoBuffer::new(ids[1], 0, Vec::new()));
        deliver(&pipeline, frame(77, 0, 3));

        assert_eq!(pipeline.last_displayed(), Some(2));
        assert_eq!(pipeline.retained_buffer(), None);
        assert_eq!(pipeline.host().recycled(), vec![ids[1], BufferId(77)]);
    }

    #[test]
    fn early_frames_wait_for_start_time() {
        let (pipeline, seen) = running_pipeline(FakeVideoHost::default());
        pipeline.host().now.store(1_000, Ordering::SeqCst);

        pipeline.buffer_received(frame(1, 3_500, 1));
        pipeline.run_pending(10_000);
        assert!(pipeline.host().waits.lock().is_empty());

        pipeline.buffer_received(frame(2, 20_000, 2));
        pipeline.run_pending(20_000);

        assert_eq!(*pipeline.host().waits.lock(), vec![20_000]);
        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(pipeline.diagnostics().early_waits, 1);
    }

    #[test]
    fn frames_are_dispatched_in_start_time_order() {
        let (pipeline, seen) = running_pipeline(FakeVideoHost::default());

        pipeline.buffer_received(frame(1, 300, 3));
        pipeline.buffer_received(frame(2, 100, 1));
        pipeline.buffer_received(frame(3, 200, 2));
        pipeline.host().now.store(300, Ordering::SeqCst);

        assert_eq!(pipeline.run_pending(300), 3);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn stop_flushes_queue_and_releases_retained_slot() {
        let (pipeline, seen) = running_pipeline(FakeVideoHost::default());
        let ids = pipeline.slot_buffer_ids();
        deliver(&pipeline, VideoBuffer::new(ids[0], 0, Vec::new()));

        pipeline.buffer_received(frame(8, 500, 8));
        pipeline.buffer_received(frame(9, 900, 9));
        pipeline.handle_event(TimedEvent::new(600, EventKind::Stop));

        assert_eq!(pipeline.run_state(), RunState::Stopped);
        assert_eq!(pipeline.last_displayed(), None);
        assert_eq!(pipeline.retained_buffer(), None);
        assert_eq!(pipeline.host().recycled(), vec![BufferId(8), ids[0]]);

        pipeline.host().now.store(900, Ordering::SeqCst);
        pipeline.run_pending(900);

        assert_eq!(*seen.lock(), vec![0]);
        assert_eq!(pipeline.host().recycled(), vec![BufferId(8), ids[0], BufferId(9)]);
        assert_eq!(pipeline.pending_events(), 0);
    }

    #[test]
    fn start_and_seek_move_time_base() {
        let pipeline = VideoPipeline::new("Video Consumer", FakeVideoHost::default());
        pipeline.start(1_000);
        pipeline.seek(50, 2_000);
        pipeline.warp(3_000, 7_000);

        pipeline.run_pending(1_500);
        assert_eq!(pipeline.run_state(), RunState::Started);
        assert_eq!(pipeline.performance_time_base(), 1_000);

        pipeline.run_pending(2_000);
        assert_eq!(pipeline.performance_time_base(), 50);

        pipeline.run_pending(3_000);
        assert_eq!(pipeline.performance_time_base(), 7_000);
    }

    #[test]
    fn disconnect_reclaims_owned_buffers_and_releases_target() {
        let (pipeline, _) = running_pipeline(FakeVideoHost::default());
        let ids = pipeline.slot_buffer_ids();
        deliver(&pipeline, VideoBuffer::new(ids[3], 0, Vec::new()));

        pipeline.disconnected();

        assert!(!pipeline.is_connected());
        assert_eq!(*pipeline.host().offered.lock(), None);
        assert_eq!(pipeline.host().reclaims.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.retained_buffer(), None);
        assert_eq!(pipeline.host().recycled(), vec![ids[3]]);

        deliver(&pipeline, frame(4, 0, 4));
        assert_eq!(pipeline.diagnostics().frames_dropped, 1);
    }

    #[test]
    fn format_change_rebuilds_ring() {
        let (pipeline, _) = running_pipeline(FakeVideoHost::default());
        let old_ids = pipeline.slot_buffer_ids();
        deliver(&pipeline, frame(1, 0, 1));

        pipeline
            .format_changed(VideoFormat::new(8, 8, ColorSpace::Gray8))
            .unwrap();

        let new_ids = pipeline.slot_buffer_ids();
        assert_eq!(new_ids.len(), 4);
        assert!(new_ids.iter().all(|id| !old_ids.contains(id)));
        assert_eq!(*pipeline.host().removed.lock(), old_ids);
        assert_eq!(pipeline.last_displayed(), None);
        assert_eq!(pipeline.input_format().color_space, ColorSpace::Gray8);
    }

    #[test]
    fn accept_format_rejects_unsupported_color_space() {
        let pipeline = VideoPipeline::new("Video Consumer", FakeVideoHost::default());

        assert!(pipeline.accept_format(&VideoFormat::wildcard()).is_ok());
        assert!(pipeline.accept_format(&format()).is_ok());
        let err = pipeline
            .accept_format(&VideoFormat::new(4, 4, ColorSpace::Other(0x1234)))
            .unwrap_err();
        assert!(matches!(err, CaptureError::BadFormat(_)));
    }

    #[test]
    fn drop_recycles_queued_and_retained_buffers() {
        let host = FakeVideoHost::default();
        let recycled = Arc::clone(&host.recycled);
        let removed = Arc::clone(&host.removed);
        let (pipeline, _) = running_pipeline(host);
        let ids = pipeline.slot_buffer_ids();
        deliver(&pipeline, VideoBuffer::new(ids[0], 0, Vec::new()));
        pipeline.buffer_received(frame(6, 10_000, 6));

        drop(pipeline);

        assert_eq!(*recycled.lock(), vec![BufferId(6), ids[0]]);
        assert_eq!(*removed.lock(), ids);
    }
}
