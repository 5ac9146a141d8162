use std::collections::VecDeque;

use crate::models::video_models::{MediaTime, VideoBuffer};

/// What a queued node event asks the consumer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Stop,
    /// Jump the media clock to `performance_time`.
    Seek { performance_time: MediaTime },
    /// Re-anchor the performance time base at `performance_time`.
    Warp { performance_time: MediaTime },
    HandleBuffer(VideoBuffer),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub time: MediaTime,
    pub kind: EventKind,
}

impl TimedEvent {
    pub fn new(time: MediaTime, kind: EventKind) -> Self {
        Self { time, kind }
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.kind, EventKind::HandleBuffer(_))
    }
}

/// Node events ordered by performance time; equal times keep arrival order.
#[derive(Debug, Default)]
pub struct TimedEventQueue {
    events: VecDeque<TimedEvent>,
}

impl TimedEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TimedEvent) {
        let pos = self.events.partition_point(|queued| queued.time <= event.time);
        self.events.insert(pos, event);
    }

    /// Remove and return the earliest event if it is due at or before `until`.
    pub fn pop_due(&mut self, until: MediaTime) -> Option<TimedEvent> {
        if self.events.front()?.time <= until {
            self.events.pop_front()
        } else {
            None
        }
    }

    /// Remove every buffer event scheduled at or before `time`, returning the
    /// buffers so the caller can recycle them. Other events stay queued.
    pub fn flush_buffers_until(&mut self, time: MediaTime) -> Vec<VideoBuffer> {
        let mut flushed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.events.len());
        for event in self.events.drain(..) {
            match event.kind {
                EventKind::HandleBuffer(buffer) if event.time <= time => flushed.push(buffer),
                kind => kept.push_back(TimedEvent { time: event.time, kind }),
            }
        }
        self.events = kept;
        flushed
    }

    /// Remove every queued buffer event regardless of time.
    pub fn drain_buffers(&mut self) -> Vec<VideoBuffer> {
        self.flush_buffers_until(MediaTime::MAX)
    }

    pub fn next_time(&self) -> Option<MediaTime> {
        self.events.front().map(|event| event.time)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
