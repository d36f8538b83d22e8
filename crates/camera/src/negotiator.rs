//! Capability negotiator: user intent -> hardware constraint requests.
//!
//! All hardware interaction goes through the [`CameraControl`] port, so the
//! negotiator can be driven by a scripted fake in tests. Every request is
//! best-effort and asynchronous; nothing here may block the decode loop.
//!
//! Failure policy (deliberate asymmetry): a rejected torch request reverts the
//! observed state (optimistic-apply-then-rollback); rejected zoom, exposure
//! and focus requests are logged and the tracked value is kept.

use async_trait::async_trait;

use scantally_core::DeviceId;

use crate::capability::{CameraCapabilitySet, ConstraintRequest, FocusMode, TrackCapabilities};
use crate::device::{DeviceInfo, DeviceList};
use crate::error::CameraError;

/// Port to the camera hardware (or a scripted fake).
///
/// `acquire` resolves once the stream's video track is ready and its
/// capability ranges are readable. `apply` may fail per individual
/// constraint; a rejection never tears the stream down.
#[async_trait]
pub trait CameraControl: Send + Sync {
    async fn enumerate(&self) -> Result<Vec<DeviceInfo>, CameraError>;

    async fn acquire(&self, device: &DeviceId) -> Result<TrackCapabilities, CameraError>;

    async fn release(&self, device: &DeviceId);

    async fn apply(
        &self,
        device: &DeviceId,
        request: ConstraintRequest,
    ) -> Result<(), CameraError>;
}

/// Tag for an in-flight device switch.
///
/// A ticket becomes stale as soon as a newer switch begins; completing with a
/// stale ticket is refused so capability results from a superseded stream are
/// never applied.
#[derive(Debug, Clone)]
pub struct SwitchTicket {
    device: DeviceId,
    generation: u64,
}

impl SwitchTicket {
    /// The device this switch targets; the caller acquires a stream for it.
    pub fn device(&self) -> &DeviceId {
        &self.device
    }
}

/// Owns the device list, the active stream, and the tracked capability set.
pub struct CapabilityNegotiator<C> {
    control: C,
    devices: Option<DeviceList>,
    capabilities: Option<CameraCapabilitySet>,
    streaming: bool,
    generation: u64,
}

impl<C: CameraControl> CapabilityNegotiator<C> {
    pub fn new(control: C) -> Self {
        Self {
            control,
            devices: None,
            capabilities: None,
            streaming: false,
            generation: 0,
        }
    }

    /// Tracked capability set of the active stream, if one is up.
    pub fn capabilities(&self) -> Option<&CameraCapabilitySet> {
        self.capabilities.as_ref()
    }

    pub fn active_device(&self) -> Option<&DeviceInfo> {
        self.devices.as_ref().map(DeviceList::active)
    }

    pub fn devices(&self) -> Option<&DeviceList> {
        self.devices.as_ref()
    }

    /// List available video-input devices and pre-select the likely rear
    /// camera. Does not acquire a stream.
    pub async fn enumerate_devices(&mut self) -> Result<&DeviceList, CameraError> {
        let found = self.control.enumerate().await?;
        let list = DeviceList::from_enumeration(found)?;
        Ok(self.devices.insert(list))
    }

    /// Enumerate, acquire a stream for the pre-selected device, and discover
    /// its capabilities. `AccessDenied` propagates untouched - it is fatal to
    /// the scanning surface and the caller must show a blocking error state.
    pub async fn start(&mut self) -> Result<&CameraCapabilitySet, CameraError> {
        self.enumerate_devices().await?;
        let id = self.active_id()?;
        let raw = self.control.acquire(&id).await?;
        let set = CameraCapabilitySet::discover(&raw);
        self.streaming = true;
        tracing::info!(device = %id, "camera stream started");
        Ok(self.capabilities.insert(set))
    }

    /// Tear down the active stream and discard its capability set.
    pub async fn stop(&mut self) {
        if self.streaming {
            if let Ok(id) = self.active_id() {
                self.control.release(&id).await;
                tracing::info!(device = %id, "camera stream released");
            }
        }
        self.streaming = false;
        self.capabilities = None;
        self.generation += 1;
    }

    /// Begin a cyclic device switch.
    ///
    /// Releases the current stream *before* the next acquisition can begin
    /// (constrained hardware cannot hold two camera handles), advances the
    /// selection, and returns a generation-tagged ticket for the new target.
    pub async fn begin_switch(&mut self) -> Result<SwitchTicket, CameraError> {
        if self.devices.is_none() {
            return Err(CameraError::NoDevices);
        }
        if self.streaming {
            let old = self.active_id()?;
            self.control.release(&old).await;
            self.streaming = false;
        }
        self.capabilities = None;
        self.generation += 1;

        let Some(devices) = self.devices.as_mut() else {
            return Err(CameraError::NoDevices);
        };
        let next = devices.advance().id.clone();
        tracing::info!(device = %next, "switching camera device");
        Ok(SwitchTicket {
            device: next,
            generation: self.generation,
        })
    }

    /// Apply the capability report of a completed acquisition.
    ///
    /// If a newer switch began while this acquisition was in flight, the
    /// result is stale: it is refused with `Superseded` and the caller must
    /// release the stream it acquired.
    pub fn complete_switch(
        &mut self,
        ticket: &SwitchTicket,
        raw: TrackCapabilities,
    ) -> Result<&CameraCapabilitySet, CameraError> {
        if ticket.generation != self.generation {
            tracing::warn!(device = %ticket.device, "discarding capability result from superseded switch");
            return Err(CameraError::Superseded);
        }
        self.streaming = true;
        Ok(self.capabilities.insert(CameraCapabilitySet::discover(&raw)))
    }

    /// Switch to the next device and re-discover capabilities.
    pub async fn switch_device(&mut self) -> Result<DeviceId, CameraError> {
        let ticket = self.begin_switch().await?;
        let raw = self.control.acquire(&ticket.device).await?;
        if self.complete_switch(&ticket, raw).is_err() {
            // Stale acquisition: hand the stream straight back.
            self.control.release(&ticket.device).await;
            return Err(CameraError::Superseded);
        }
        Ok(ticket.device().clone())
    }

    /// Toggle the torch. Optimistic apply; rolled back on rejection.
    pub async fn request_torch(&mut self, on: bool) -> Result<(), CameraError> {
        let id = self.active_id()?;
        let caps = self.caps()?;
        if !caps.has_torch {
            tracing::trace!("no torch on active device; request ignored");
            return Ok(());
        }
        let prev = caps.torch_on;
        self.caps_mut()?.torch_on = on;
        match self.control.apply(&id, ConstraintRequest::Torch(on)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.caps_mut()?.torch_on = prev;
                tracing::warn!(error = %e, "torch request rejected; state reverted");
                Err(e)
            }
        }
    }

    /// Set the zoom level (clamped into the reported range).
    ///
    /// On rejection the tracked value is kept, not rolled back.
    pub async fn request_zoom(&mut self, value: f64) -> Result<(), CameraError> {
        let id = self.active_id()?;
        let zoom = self.caps()?.zoom;
        if !zoom.supported {
            tracing::trace!("zoom unsupported on active device; request ignored");
            return Ok(());
        }
        let clamped = zoom.clamp(value);
        self.caps_mut()?.zoom.current = clamped;
        self.apply_logged(&id, ConstraintRequest::Zoom(clamped), "zoom")
            .await
    }

    /// Set exposure compensation (clamped). Same non-rollback policy as zoom.
    pub async fn request_exposure(&mut self, value: f64) -> Result<(), CameraError> {
        let id = self.active_id()?;
        let exposure = self.caps()?.exposure;
        if !exposure.supported {
            tracing::trace!("exposure unsupported on active device; request ignored");
            return Ok(());
        }
        let clamped = exposure.clamp(value);
        self.caps_mut()?.exposure.current = clamped;
        self.apply_logged(&id, ConstraintRequest::ExposureCompensation(clamped), "exposure")
            .await
    }

    /// Set the manual focus distance (clamped).
    ///
    /// Dragging the manual-focus control forces `Manual` mode regardless of
    /// the current focus mode.
    pub async fn request_focus(&mut self, distance: f64) -> Result<(), CameraError> {
        let id = self.active_id()?;
        let focus = self.caps()?.focus_distance;
        if !focus.supported {
            tracing::trace!("manual focus unsupported on active device; request ignored");
            return Ok(());
        }
        if self.caps()?.focus_mode != FocusMode::Manual {
            if let Err(e) = self.control.apply(&id, ConstraintRequest::ManualFocus).await {
                tracing::warn!(error = %e, "manual focus mode rejected");
            }
            self.caps_mut()?.focus_mode = FocusMode::Manual;
        }
        let clamped = focus.clamp(distance);
        self.caps_mut()?.focus_distance.current = clamped;
        self.apply_logged(&id, ConstraintRequest::FocusDistance(clamped), "focus distance")
            .await
    }

    /// Cycle Auto -> Macro -> Manual -> Auto.
    ///
    /// Entering `Macro` tries hardware macro first; if rejected, falls back to
    /// manual focus pinned at the minimum distance (nearest focus) as an
    /// approximation, and still reports `Macro`.
    pub async fn cycle_focus_mode(&mut self) -> Result<FocusMode, CameraError> {
        let id = self.active_id()?;
        let target = self.caps()?.focus_mode.next();

        match target {
            FocusMode::Macro => {
                if let Err(e) = self.control.apply(&id, ConstraintRequest::MacroFocus).await {
                    tracing::info!(error = %e, "hardware macro rejected; approximating with nearest manual focus");
                    self.pin_nearest_focus(&id).await;
                }
            }
            FocusMode::Manual => {
                if let Err(e) = self.control.apply(&id, ConstraintRequest::ManualFocus).await {
                    tracing::warn!(error = %e, "manual focus mode rejected");
                }
            }
            FocusMode::Auto => {
                if let Err(e) = self
                    .control
                    .apply(&id, ConstraintRequest::ContinuousFocus)
                    .await
                {
                    tracing::warn!(error = %e, "continuous autofocus rejected");
                }
            }
        }

        self.caps_mut()?.focus_mode = target;
        Ok(target)
    }

    async fn pin_nearest_focus(&mut self, id: &DeviceId) {
        if let Err(e) = self.control.apply(id, ConstraintRequest::ManualFocus).await {
            tracing::warn!(error = %e, "manual focus fallback rejected");
        }
        let focus = match self.caps() {
            Ok(caps) if caps.focus_distance.supported => caps.focus_distance,
            _ => return,
        };
        if let Err(e) = self
            .control
            .apply(id, ConstraintRequest::FocusDistance(focus.min))
            .await
        {
            tracing::warn!(error = %e, "nearest-focus request rejected");
        }
        if let Ok(caps) = self.caps_mut() {
            caps.focus_distance.current = focus.min;
        }
    }

    async fn apply_logged(
        &mut self,
        id: &DeviceId,
        request: ConstraintRequest,
        what: &str,
    ) -> Result<(), CameraError> {
        match self.control.apply(id, request).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // Tracked value intentionally kept (no rollback for ranged
                // controls); the caller still learns about the failure.
                tracing::warn!(error = %e, "{what} request rejected");
                Err(e)
            }
        }
    }

    fn active_id(&self) -> Result<DeviceId, CameraError> {
        self.devices
            .as_ref()
            .map(|d| d.active().id.clone())
            .ok_or(CameraError::NoDevices)
    }

    fn caps(&self) -> Result<&CameraCapabilitySet, CameraError> {
        self.capabilities.as_ref().ok_or(CameraError::NoStream)
    }

    fn caps_mut(&mut self) -> Result<&mut CameraCapabilitySet, CameraError> {
        self.capabilities.as_mut().ok_or(CameraError::NoStream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityRange;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Scripted hardware double: rejects the request kinds it is told to,
    /// records everything applied and released.
    #[derive(Default)]
    struct FakeCamera {
        devices: Vec<DeviceInfo>,
        capabilities: TrackCapabilities,
        reject: HashSet<&'static str>,
        applied: Mutex<Vec<ConstraintRequest>>,
        released: Mutex<Vec<DeviceId>>,
    }

    impl FakeCamera {
        fn two_lens() -> Self {
            Self {
                devices: vec![
                    DeviceInfo::new("front-0", "Front Camera"),
                    DeviceInfo::new("back-0", "Back Camera"),
                ],
                capabilities: TrackCapabilities {
                    torch: true,
                    zoom: Some(CapabilityRange {
                        min: 1.0,
                        max: 8.0,
                        step: 0.1,
                        current: 1.0,
                    }),
                    exposure_compensation: Some(CapabilityRange {
                        min: -2.0,
                        max: 2.0,
                        step: 0.5,
                        current: 0.0,
                    }),
                    focus_distance: Some(CapabilityRange {
                        min: 0.1,
                        max: 4.0,
                        step: 0.05,
                        current: 1.0,
                    }),
                },
                ..Self::default()
            }
        }

        fn rejecting(mut self, kinds: &[&'static str]) -> Self {
            self.reject = kinds.iter().copied().collect();
            self
        }

        fn applied(&self) -> Vec<ConstraintRequest> {
            self.applied.lock().unwrap().clone()
        }

        fn released(&self) -> Vec<DeviceId> {
            self.released.lock().unwrap().clone()
        }
    }

    fn kind(request: &ConstraintRequest) -> &'static str {
        match request {
            ConstraintRequest::Torch(_) => "torch",
            ConstraintRequest::Zoom(_) => "zoom",
            ConstraintRequest::ExposureCompensation(_) => "exposure",
            ConstraintRequest::FocusDistance(_) => "focus-distance",
            ConstraintRequest::ContinuousFocus => "continuous",
            ConstraintRequest::MacroFocus => "macro",
            ConstraintRequest::ManualFocus => "manual",
        }
    }

    #[async_trait]
    impl CameraControl for FakeCamera {
        async fn enumerate(&self) -> Result<Vec<DeviceInfo>, CameraError> {
            Ok(self.devices.clone())
        }

        async fn acquire(&self, _device: &DeviceId) -> Result<TrackCapabilities, CameraError> {
            if self.reject.contains("acquire") {
                return Err(CameraError::AccessDenied);
            }
            Ok(self.capabilities.clone())
        }

        async fn release(&self, device: &DeviceId) {
            self.released.lock().unwrap().push(device.clone());
        }

        async fn apply(
            &self,
            _device: &DeviceId,
            request: ConstraintRequest,
        ) -> Result<(), CameraError> {
            if self.reject.contains(kind(&request)) {
                return Err(CameraError::rejected(kind(&request)));
            }
            self.applied.lock().unwrap().push(request);
            Ok(())
        }
    }

    #[tokio::test]
    async fn start_selects_rear_camera_and_discovers() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        let caps = negotiator.start().await.unwrap();

        assert!(caps.has_torch);
        assert!(caps.zoom.supported);
        assert_eq!(negotiator.active_device().unwrap().label, "Back Camera");
    }

    #[tokio::test]
    async fn access_denied_is_fatal_and_propagates() {
        let mut negotiator =
            CapabilityNegotiator::new(FakeCamera::two_lens().rejecting(&["acquire"]));
        let err = negotiator.start().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn torch_rejection_rolls_observed_state_back() {
        let mut negotiator =
            CapabilityNegotiator::new(FakeCamera::two_lens().rejecting(&["torch"]));
        negotiator.start().await.unwrap();

        let err = negotiator.request_torch(true).await.unwrap_err();
        assert_eq!(err, CameraError::rejected("torch"));
        assert!(!negotiator.capabilities().unwrap().torch_on);
    }

    #[tokio::test]
    async fn torch_applies_optimistically_on_success() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        negotiator.start().await.unwrap();

        negotiator.request_torch(true).await.unwrap();
        assert!(negotiator.capabilities().unwrap().torch_on);
    }

    #[tokio::test]
    async fn zoom_rejection_keeps_tracked_value() {
        let mut negotiator =
            CapabilityNegotiator::new(FakeCamera::two_lens().rejecting(&["zoom"]));
        negotiator.start().await.unwrap();

        assert!(negotiator.request_zoom(4.0).await.is_err());
        // Tracked value intentionally not rolled back.
        assert_eq!(negotiator.capabilities().unwrap().zoom.current, 4.0);
    }

    #[tokio::test]
    async fn zoom_request_is_clamped_into_range() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        negotiator.start().await.unwrap();

        negotiator.request_zoom(99.0).await.unwrap();
        assert_eq!(negotiator.capabilities().unwrap().zoom.current, 8.0);
    }

    #[tokio::test]
    async fn unsupported_zoom_is_inert_not_an_error() {
        let mut camera = FakeCamera::two_lens();
        camera.capabilities.zoom = None;
        let mut negotiator = CapabilityNegotiator::new(camera);
        negotiator.start().await.unwrap();

        negotiator.request_zoom(4.0).await.unwrap();
        // Nothing was sent to hardware.
        assert!(negotiator.control.applied().is_empty());
    }

    #[tokio::test]
    async fn focus_cycle_returns_to_auto_after_three_steps() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        negotiator.start().await.unwrap();

        assert_eq!(negotiator.cycle_focus_mode().await.unwrap(), FocusMode::Macro);
        assert_eq!(negotiator.cycle_focus_mode().await.unwrap(), FocusMode::Manual);
        assert_eq!(negotiator.cycle_focus_mode().await.unwrap(), FocusMode::Auto);
    }

    #[tokio::test]
    async fn rejected_macro_falls_back_to_nearest_manual_focus() {
        let mut negotiator =
            CapabilityNegotiator::new(FakeCamera::two_lens().rejecting(&["macro"]));
        negotiator.start().await.unwrap();

        let mode = negotiator.cycle_focus_mode().await.unwrap();

        // Still reported as Macro, approximated by manual @ minimum distance.
        assert_eq!(mode, FocusMode::Macro);
        assert_eq!(negotiator.capabilities().unwrap().focus_distance.current, 0.1);
        let applied = negotiator.control.applied();
        assert!(applied.contains(&ConstraintRequest::ManualFocus));
        assert!(applied.contains(&ConstraintRequest::FocusDistance(0.1)));
    }

    #[tokio::test]
    async fn dragging_focus_forces_manual_mode() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        negotiator.start().await.unwrap();

        negotiator.request_focus(0.5).await.unwrap();

        let caps = negotiator.capabilities().unwrap();
        assert_eq!(caps.focus_mode, FocusMode::Manual);
        assert_eq!(caps.focus_distance.current, 0.5);
    }

    #[tokio::test]
    async fn switch_device_cycles_and_releases_previous_stream() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        negotiator.start().await.unwrap();
        assert_eq!(negotiator.active_device().unwrap().id.as_str(), "back-0");

        let next = negotiator.switch_device().await.unwrap();
        assert_eq!(next.as_str(), "front-0");
        assert_eq!(negotiator.control.released(), vec![DeviceId::new("back-0")]);
        assert!(negotiator.capabilities().is_some());

        // Wraps back around.
        let next = negotiator.switch_device().await.unwrap();
        assert_eq!(next.as_str(), "back-0");
    }

    #[tokio::test]
    async fn stale_switch_result_is_discarded() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        negotiator.start().await.unwrap();

        let stale = negotiator.begin_switch().await.unwrap();
        // A second switch begins while the first acquisition is in flight.
        let fresh = negotiator.begin_switch().await.unwrap();

        let err = negotiator
            .complete_switch(&stale, TrackCapabilities::default())
            .unwrap_err();
        assert_eq!(err, CameraError::Superseded);
        assert!(negotiator.capabilities().is_none());

        let raw = negotiator.control.capabilities.clone();
        negotiator.complete_switch(&fresh, raw).unwrap();
        assert!(negotiator.capabilities().is_some());
    }

    #[tokio::test]
    async fn stop_discards_capability_set() {
        let mut negotiator = CapabilityNegotiator::new(FakeCamera::two_lens());
        negotiator.start().await.unwrap();
        negotiator.stop().await;

        assert!(negotiator.capabilities().is_none());
        assert_eq!(negotiator.control.released().len(), 1);
    }
}
