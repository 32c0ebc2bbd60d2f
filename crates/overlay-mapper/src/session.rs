//! Frame sessions and rotation updates.
//!
//! A [`FrameSession`] is the immutable description of how detector frames are
//! laid out: native frame size, the display rotation recorded when that size
//! was established, camera facing and device profile. Rotation changes never
//! mutate a session; they produce a new one that replaces the old one inside a
//! [`SessionHandle`], so the analysis side always reads a consistent snapshot.

use std::sync::{Arc, RwLock};

use overlay_models::{AxisSwapPolicy, CameraFacing, DeviceProfile, FrameSize, Rotation};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{MapperError, MapperResult};
use crate::mapper::BoundingBoxMapper;
use crate::metrics;

/// Immutable frame layout for a capture session.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSession {
    /// Analysis resolution selected for the camera, as reported by the camera
    analysis_resolution: FrameSize,
    /// Frame size in the orientation detectors report boxes in
    frame: FrameSize,
    initial_rotation: Rotation,
    facing: CameraFacing,
    device: DeviceProfile,
}

impl FrameSession {
    /// Create a session with an explicit frame size.
    pub fn new(
        frame: FrameSize,
        initial_rotation: Rotation,
        facing: CameraFacing,
        device: DeviceProfile,
    ) -> MapperResult<Self> {
        check_frame(frame)?;
        // Keep the camera-reported resolution so rotation updates can re-derive the frame.
        let analysis_resolution = if initial_rotation.is_portrait_natural() {
            frame.swapped()
        } else {
            frame
        };
        Ok(Self {
            analysis_resolution,
            frame,
            initial_rotation,
            facing,
            device,
        })
    }

    /// Create a session from the camera's analysis resolution.
    ///
    /// Camera resolutions are landscape-first. At 0° and 180° the display is in
    /// its natural orientation and detectors report portrait frames, so the
    /// axes are swapped; at 90° and 270° the resolution is used as-is.
    pub fn from_analysis_resolution(
        selected: FrameSize,
        initial_rotation: Rotation,
        facing: CameraFacing,
        device: DeviceProfile,
    ) -> MapperResult<Self> {
        check_frame(selected)?;
        Ok(Self {
            analysis_resolution: selected,
            frame: Self::frame_for(selected, initial_rotation),
            initial_rotation,
            facing,
            device,
        })
    }

    fn frame_for(selected: FrameSize, rotation: Rotation) -> FrameSize {
        if rotation.is_portrait_natural() {
            selected.swapped()
        } else {
            selected
        }
    }

    pub fn frame(&self) -> FrameSize {
        self.frame
    }

    pub fn analysis_resolution(&self) -> FrameSize {
        self.analysis_resolution
    }

    pub fn initial_rotation(&self) -> Rotation {
        self.initial_rotation
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn device(&self) -> DeviceProfile {
        self.device
    }

    /// Session re-established at a new display rotation.
    pub fn with_rotation(&self, rotation: Rotation) -> Self {
        Self {
            frame: Self::frame_for(self.analysis_resolution, rotation),
            initial_rotation: rotation,
            ..self.clone()
        }
    }

    /// Session after switching between front and back cameras.
    pub fn with_facing(&self, facing: CameraFacing) -> Self {
        Self {
            facing,
            ..self.clone()
        }
    }

    /// Session for a newly selected analysis resolution at the same rotation.
    pub fn with_analysis_resolution(&self, selected: FrameSize) -> MapperResult<Self> {
        Self::from_analysis_resolution(selected, self.initial_rotation, self.facing, self.device)
    }
}

/// Frames need non-zero axes that fit in pixel coordinates.
fn check_frame(frame: FrameSize) -> MapperResult<()> {
    let max = i32::MAX as u32;
    if frame.is_empty() || frame.width > max || frame.height > max {
        return Err(MapperError::InvalidFrameSize(frame));
    }
    Ok(())
}

/// Shared, swappable session.
///
/// Cloning the handle shares the same session. Writers replace the whole
/// session; readers take an `Arc` snapshot and never see a partial update.
/// A reader may map one frame with the previous session while a rotation
/// update is in flight.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Arc<FrameSession>>>,
}

impl SessionHandle {
    pub fn new(session: FrameSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(session))),
        }
    }

    /// Current session.
    pub fn snapshot(&self) -> Arc<FrameSession> {
        // A poisoned lock still holds a complete session.
        match self.inner.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Mapper over the current session.
    pub fn mapper(&self, policy: AxisSwapPolicy) -> BoundingBoxMapper {
        BoundingBoxMapper::new((*self.snapshot()).clone(), policy)
    }

    /// Replace the session outright, e.g. after a camera or resolution switch.
    pub fn replace(&self, session: FrameSession) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(session);
    }

    /// Apply a display rotation notification.
    ///
    /// Notifications matching the stored rotation are ignored. Returns true if
    /// the session changed.
    pub fn on_display_rotation_changed(&self, rotation: Rotation) -> bool {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.initial_rotation() == rotation {
            debug!(rotation = %rotation, "Rotation unchanged, keeping session");
            return false;
        }

        let previous = guard.initial_rotation();
        let updated = guard.with_rotation(rotation);
        info!(
            from = %previous,
            to = %rotation,
            frame = %updated.frame(),
            "Display changed, updated rotation and frame dimensions"
        );
        *guard = Arc::new(updated);
        metrics::record_rotation_change();
        true
    }

    /// Apply a raw platform rotation ordinal (`0..=3`).
    pub fn on_display_rotation_ordinal(&self, ordinal: i32) -> MapperResult<bool> {
        let rotation = Rotation::from_ordinal(ordinal)
            .ok_or_else(|| MapperError::invalid_rotation(ordinal.to_string()))?;
        Ok(self.on_display_rotation_changed(rotation))
    }

    /// Re-check the rotation after the preview resumes; the display may have
    /// turned while paused.
    pub fn on_resume(&self, current: Rotation) -> bool {
        self.on_display_rotation_changed(current)
    }
}

/// Apply every rotation published on `rotations` to `handle`.
///
/// The task ends when the sender side is dropped.
pub fn spawn_rotation_listener(
    handle: SessionHandle,
    mut rotations: watch::Receiver<Rotation>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let initial = *rotations.borrow_and_update();
        handle.on_display_rotation_changed(initial);

        while rotations.changed().await.is_ok() {
            let rotation = *rotations.borrow_and_update();
            handle.on_display_rotation_changed(rotation);
        }
        debug!("Rotation source closed, stopping listener");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTED: FrameSize = FrameSize::new(640, 480);

    fn session_at(rotation: Rotation) -> FrameSession {
        FrameSession::from_analysis_resolution(
            SELECTED,
            rotation,
            CameraFacing::Back,
            DeviceProfile::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_portrait_rotations_swap_resolution() {
        assert_eq!(session_at(Rotation::Deg0).frame(), FrameSize::new(480, 640));
        assert_eq!(session_at(Rotation::Deg180).frame(), FrameSize::new(480, 640));
        assert_eq!(session_at(Rotation::Deg90).frame(), FrameSize::new(640, 480));
        assert_eq!(session_at(Rotation::Deg270).frame(), FrameSize::new(640, 480));
    }

    #[test]
    fn test_zero_frame_rejected() {
        let err = FrameSession::new(
            FrameSize::new(0, 480),
            Rotation::Deg0,
            CameraFacing::Back,
            DeviceProfile::default(),
        );
        assert!(matches!(err, Err(MapperError::InvalidFrameSize(_))));

        let err = FrameSession::from_analysis_resolution(
            FrameSize::new(640, 0),
            Rotation::Deg90,
            CameraFacing::Back,
            DeviceProfile::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let err = FrameSession::new(
            FrameSize::new(3_000_000_000, 480),
            Rotation::Deg90,
            CameraFacing::Back,
            DeviceProfile::default(),
        );
        assert!(matches!(err, Err(MapperError::InvalidFrameSize(_))));

        let err = FrameSession::from_analysis_resolution(
            FrameSize::new(640, i32::MAX as u32 + 1),
            Rotation::Deg0,
            CameraFacing::Back,
            DeviceProfile::default(),
        );
        assert!(matches!(err, Err(MapperError::InvalidFrameSize(_))));

        let largest = FrameSize::new(i32::MAX as u32, i32::MAX as u32);
        let session = FrameSession::new(
            largest,
            Rotation::Deg0,
            CameraFacing::Back,
            DeviceProfile::default(),
        );
        assert!(session.is_ok());
    }

    #[test]
    fn test_new_recovers_analysis_resolution() {
        let session = FrameSession::new(
            FrameSize::new(480, 640),
            Rotation::Deg0,
            CameraFacing::Back,
            DeviceProfile::default(),
        )
        .unwrap();
        assert_eq!(session.analysis_resolution(), SELECTED);
        assert_eq!(session.with_rotation(Rotation::Deg90).frame(), SELECTED);
    }

    #[test]
    fn test_with_rotation_rederives_frame() {
        let session = session_at(Rotation::Deg0);
        let turned = session.with_rotation(Rotation::Deg90);

        assert_eq!(turned.initial_rotation(), Rotation::Deg90);
        assert_eq!(turned.frame(), FrameSize::new(640, 480));
        assert_eq!(turned.analysis_resolution(), SELECTED);
        // Original is untouched.
        assert_eq!(session.frame(), FrameSize::new(480, 640));
    }

    #[test]
    fn test_with_facing_and_resolution() {
        let session = session_at(Rotation::Deg0).with_facing(CameraFacing::Front);
        assert!(session.facing().is_front());

        let hd = session.with_analysis_resolution(FrameSize::new(1280, 720)).unwrap();
        assert_eq!(hd.frame(), FrameSize::new(720, 1280));
        assert!(hd.facing().is_front());
    }

    #[test]
    fn test_same_rotation_is_ignored() {
        let handle = SessionHandle::new(session_at(Rotation::Deg0));
        let before = handle.snapshot();

        assert!(!handle.on_display_rotation_changed(Rotation::Deg0));
        assert!(Arc::ptr_eq(&before, &handle.snapshot()));
    }

    #[test]
    fn test_rotation_change_replaces_session() {
        let handle = SessionHandle::new(session_at(Rotation::Deg0));
        let reader = handle.clone();

        assert!(handle.on_display_rotation_changed(Rotation::Deg270));
        let snapshot = reader.snapshot();
        assert_eq!(snapshot.initial_rotation(), Rotation::Deg270);
        assert_eq!(snapshot.frame(), FrameSize::new(640, 480));
    }

    #[test]
    fn test_rotation_ordinal_validation() {
        let handle = SessionHandle::new(session_at(Rotation::Deg0));
        assert!(handle.on_display_rotation_ordinal(2).unwrap());
        assert!(matches!(
            handle.on_display_rotation_ordinal(5),
            Err(MapperError::InvalidRotation(_))
        ));
        assert_eq!(handle.snapshot().initial_rotation(), Rotation::Deg180);
    }

    #[test]
    fn test_on_resume_picks_up_missed_rotation() {
        let handle = SessionHandle::new(session_at(Rotation::Deg0));
        assert!(handle.on_resume(Rotation::Deg90));
        assert!(!handle.on_resume(Rotation::Deg90));
    }

    #[test]
    fn test_replace_and_mapper() {
        let handle = SessionHandle::new(session_at(Rotation::Deg0));
        handle.replace(session_at(Rotation::Deg0).with_facing(CameraFacing::Front));

        let mapper = handle.mapper(AxisSwapPolicy::Never);
        assert!(mapper.session().facing().is_front());
        assert_eq!(mapper.policy(), AxisSwapPolicy::Never);
    }

    #[test]
    fn test_rotation_listener_applies_initial_value() {
        let handle = SessionHandle::new(session_at(Rotation::Deg0));
        let (tx, rx) = watch::channel(Rotation::Deg270);
        drop(tx);

        tokio_test::block_on(async {
            spawn_rotation_listener(handle.clone(), rx).await.unwrap();
        });
        assert_eq!(handle.snapshot().initial_rotation(), Rotation::Deg270);
    }

    #[tokio::test]
    async fn test_rotation_listener_applies_updates() {
        let handle = SessionHandle::new(session_at(Rotation::Deg0));
        let (tx, rx) = watch::channel(Rotation::Deg0);
        let task = spawn_rotation_listener(handle.clone(), rx);

        tx.send(Rotation::Deg90).unwrap();
        tokio::task::yield_now().await;
        tx.send(Rotation::Deg180).unwrap();
        drop(tx);

        task.await.unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.initial_rotation(), Rotation::Deg180);
        assert_eq!(snapshot.frame(), FrameSize::new(480, 640));
    }
}
