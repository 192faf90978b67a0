use glam::{Quat, Vec2, Vec3};

use super::*;

#[derive(Default)]
struct ToggleStack {
    enabled: bool,
    toggles: Vec<bool>,
}

impl PostProcessStack for ToggleStack {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.toggles.push(enabled);
    }

    fn render_composite(
        &mut self,
        source: &LinearImage,
        _pose: &Pose,
    ) -> anyhow::Result<LinearImage> {
        Ok(source.clone())
    }
}

#[test]
fn test_energy_fraction() {
    let mut report = CaptureReport::new(4);
    assert_eq!(report.energy_fraction(), 0.0);

    report.accepted = 3;
    report.rejected = 1;
    assert_eq!(report.energy_fraction(), 0.75);

    assert_eq!(CaptureReport::new(0).energy_fraction(), 0.0);
}

#[test]
fn test_sample_label() {
    assert_eq!(sample_label(3, 2048), "Capturing image (3 / 2048)");
}

#[test]
fn test_pose_guard_restores_on_drop() {
    let original = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.3));
    let mut camera = original;

    {
        let mut guard = PoseGuard::new(&mut camera);
        guard.set(Pose::new(Vec3::splat(9.0), Quat::IDENTITY));
        guard.restore();
        guard.set(Pose::new(Vec3::splat(-9.0), Quat::from_rotation_x(1.0)));
    }

    assert_eq!(camera, original);
}

#[test]
fn test_post_process_guard_reenables_on_drop() {
    let mut stack = ToggleStack {
        enabled: true,
        ..Default::default()
    };

    {
        let guard = PostProcessGuard::disable(&mut stack);
        assert!(guard.is_active());
    }

    assert!(stack.enabled);
    assert_eq!(stack.toggles, vec![false, true]);
}

#[test]
fn test_post_process_guard_enables_once() {
    let mut stack = ToggleStack::default();

    {
        let mut guard = PostProcessGuard::disable(&mut stack);
        assert!(guard.enable().is_some());
        assert!(guard.enable().is_none());
        assert!(!guard.is_active());
    }

    assert_eq!(stack.toggles, vec![false, true]);
}

#[test]
fn test_jitter_uses_world_up() {
    let original = Pose::default();
    let focal_point = Vec3::new(0.0, 0.0, 2.0);

    let pose = jitter(&original, Vec2::new(0.1, 0.0), focal_point).unwrap();

    assert!((pose.position - Vec3::new(0.1, 0.0, 0.0)).length() < 1e-6);
    let to_focus = (focal_point - pose.position).normalize();
    assert!((pose.forward() - to_focus).length() < 1e-5);
    assert!(pose.up().dot(Vec3::Y) > 0.99);
}

#[test]
fn test_jitter_falls_back_to_camera_up() {
    // Camera looking straight down: every view direction through the focal
    // point at zero offset is parallel to world up.
    let original = Pose::looking_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Z).unwrap();
    let focal_point = Vec3::ZERO;

    let pose = jitter(&original, Vec2::ZERO, focal_point).unwrap();

    assert!((pose.forward() - Vec3::NEG_Y).length() < 1e-5);
    assert!((pose.up() - original.up()).length() < 1e-5);
}

#[test]
fn test_jitter_skips_when_focus_at_camera() {
    let original = Pose::default();
    assert!(jitter(&original, Vec2::ZERO, Vec3::ZERO).is_none());
}
