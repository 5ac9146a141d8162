/// Audio pipeline state machine.
///
/// State transitions:
/// ```text
/// uninitialized → initialized → running → stopped
///                      ↑           │  ↑       │
///                      └─(start    │  └───────┘ (start)
///                        failure)──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Uninitialized,
    Initialized,
    Running,
    Stopped,
}

impl CaptureState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the device format is known and `start` may be attempted.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Initialized | Self::Stopped)
    }
}

/// Run state of the video consumer node, driven by queued start/stop events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Started,
}

/// Lifecycle notifications issued by the host while a recorder is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostNotification {
    /// The host is about to stop delivering buffers.
    WillStop,
    /// Any other notification; ignored by the core.
    Other(i32),
}
