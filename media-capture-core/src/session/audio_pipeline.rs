use crate::models::audio_models::{AudioDiagnostics, RawAudioFormat};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::state::{CaptureState, HostNotification};
use crate::session::audio_session::{AudioSession, DeliveryOutcome};
use crate::traits::audio_host::{AudioCallback, AudioHost};

/// Audio capture orchestrator.
///
/// Generic over the host media service via the `AudioHost` trait. The host
/// thread calls [`deliver`](Self::deliver) for every raw buffer; each one is
/// decoded to stereo f32, resampled when a target rate is configured, and
/// passed to the user callback:
/// ```text
/// [AudioHost] → deliver → [SampleDecoder] → [GrowableBuffer] → [LinearResampler] → callback
/// ```
///
/// Delivery and lifecycle calls must be serialized by the caller; the
/// pipeline itself holds no locks.
pub struct AudioPipeline<H: AudioHost> {
    host: H,
    config: CaptureConfiguration,
    callback: Option<AudioCallback>,
    state: CaptureState,
    status: Result<(), CaptureError>,
    device_name: String,
    session: Option<AudioSession>,
    diagnostics: AudioDiagnostics,
}

impl<H: AudioHost> AudioPipeline<H> {
    /// Query the host for its default input and prepare a session for it.
    ///
    /// Never fails outright: when no usable device is found the pipeline is
    /// left `Uninitialized` and the error is kept as [`status`](Self::status).
    pub fn new(host: H, config: CaptureConfiguration, callback: Option<AudioCallback>) -> Self {
        let mut pipeline = Self {
            host,
            config,
            callback,
            state: CaptureState::Uninitialized,
            status: Err(CaptureError::NotInitialized),
            device_name: String::new(),
            session: None,
            diagnostics: AudioDiagnostics::new(),
        };

        pipeline.status = pipeline.initialize_device();
        match &pipeline.status {
            Ok(()) => pipeline.state = CaptureState::Initialized,
            Err(e) => log::error!("Failed to initialize audio device: {}", e),
        }
        pipeline
    }

    fn initialize_device(&mut self) -> Result<(), CaptureError> {
        self.config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let device = self.host.default_input()?;
        self.device_name = device.name;
        if !device.format.is_valid() {
            return Err(CaptureError::InvalidFormat(format!(
                "input device reported rate={} channels={} encoding={:?}",
                device.format.frame_rate, device.format.channel_count, device.format.encoding
            )));
        }

        self.session = Some(AudioSession::new(self.config.target_sample_rate, device.format));
        Ok(())
    }

    pub fn set_callback(&mut self, callback: AudioCallback) {
        self.callback = Some(callback);
    }

    /// Change the output rate. Takes effect from the next delivery; `0.0`
    /// switches to the device rate.
    pub fn set_target_sample_rate(&mut self, target_sample_rate: f32) -> Result<(), CaptureError> {
        let config = CaptureConfiguration {
            target_sample_rate,
            ..self.config.clone()
        };
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        self.config = config;
        if let Some(session) = self.session.as_mut() {
            session.set_target_sample_rate(target_sample_rate);
        }
        Ok(())
    }

    /// Connect to the input and begin delivering. Transitions: initialized/stopped → running.
    ///
    /// On failure the connection is torn down, the pipeline returns to
    /// `Initialized` and the error is recorded as its status.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.state.is_running() {
            return Ok(());
        }
        if !self.state.can_start() {
            return Err(self.status.clone().err().unwrap_or(CaptureError::NotInitialized));
        }

        if self.host.is_connected() {
            log::warn!("Recorder already connected before start; cleaning up");
            self.cleanup_media();
            self.release_buffers();
        }

        match self.connect_and_start() {
            Ok(()) => {
                self.state = CaptureState::Running;
                self.status = Ok(());
                self.diagnostics.started_at = Some(chrono::Utc::now().to_rfc3339());
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to start audio capture: {}", e);
                self.cleanup_media();
                self.release_buffers();
                self.state = CaptureState::Initialized;
                self.status = Err(e.clone());
                Err(e)
            }
        }
    }

    fn connect_and_start(&mut self) -> Result<(), CaptureError> {
        let format = self
            .host
            .connect(&self.config.node_name)
            .map_err(|e| match e {
                CaptureError::ConnectionFailed(_) => e,
                other => CaptureError::ConnectionFailed(other.to_string()),
            })?;
        if !format.is_valid() {
            return Err(CaptureError::FormatMismatch(format!(
                "connection settled on rate={} channels={} encoding={:?}",
                format.frame_rate, format.channel_count, format.encoding
            )));
        }

        let session = self.session.as_mut().ok_or(CaptureError::NotInitialized)?;
        session.update_device_format(format);
        session.reset_phase();

        self.host.start()
    }

    /// Stop delivering and release session buffers. Transitions: running → stopped.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        if self.state != CaptureState::Uninitialized {
            self.state = CaptureState::Stopped;
        }
        self.cleanup_media();
        self.release_buffers();
        if self.session.is_some() {
            self.status = Ok(());
        }
        Ok(())
    }

    /// React to a host lifecycle notification.
    pub fn notify(&mut self, notification: HostNotification) {
        match notification {
            HostNotification::WillStop => {
                if self.state.is_running() {
                    log::debug!("Host is stopping; no further audio will be processed");
                    self.state = CaptureState::Stopped;
                }
            }
            HostNotification::Other(_) => {}
        }
    }

    /// Process one raw buffer delivered by the host.
    ///
    /// Ignored unless running. Malformed buffers are dropped silently and a
    /// failed buffer growth drops only this delivery.
    pub fn deliver(&mut self, data: &[u8], format: &RawAudioFormat) {
        if !self.state.is_running() {
            return;
        }
        let (Some(callback), Some(session)) = (self.callback.as_mut(), self.session.as_mut()) else {
            return;
        };

        self.diagnostics.deliveries += 1;
        match session.process(data, format, callback) {
            Ok(DeliveryOutcome::Processed {
                input_frames,
                output_frames,
            }) => {
                self.diagnostics.frames_decoded += input_frames as u64;
                self.diagnostics.frames_emitted += output_frames as u64;
                if output_frames > 0 {
                    self.diagnostics.callback_count += 1;
                }
            }
            Ok(DeliveryOutcome::Skipped) => {
                self.diagnostics.dropped_deliveries += 1;
            }
            Err(e) => {
                log::error!("Dropping audio delivery of {} bytes: {}", data.len(), e);
                self.diagnostics.dropped_deliveries += 1;
            }
        }
    }

    fn cleanup_media(&mut self) {
        if !self.host.is_connected() {
            return;
        }
        self.host.stop();
        self.host.disconnect();
    }

    fn release_buffers(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Outcome of the last setup or lifecycle operation.
    pub fn status(&self) -> Result<(), CaptureError> {
        self.status.clone()
    }

    pub fn session(&self) -> Option<&AudioSession> {
        self.session.as_ref()
    }

    pub fn device_sample_rate(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.device_format().frame_rate)
    }

    /// Effective output rate; `0.0` while delivering at the device rate.
    pub fn target_sample_rate(&self) -> f32 {
        self.session
            .as_ref()
            .map_or(self.config.target_sample_rate, |s| s.effective_target_rate())
    }

    pub fn input_channel_count(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.device_format().channel_count)
    }

    pub fn input_format_code(&self) -> u32 {
        self.session
            .as_ref()
            .map_or(0, |s| s.device_format().encoding.format_code())
    }

    pub fn input_device_name(&self) -> &str {
        &self.device_name
    }

    pub fn node_name(&self) -> &str {
        &self.config.node_name
    }

    pub fn diagnostics(&self) -> AudioDiagnostics {
        self.diagnostics.clone()
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: AudioHost> Drop for AudioPipeline<H> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
