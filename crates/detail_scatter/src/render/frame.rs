//! Per-frame instance transforms: billboarding, scale, and sway.
use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

use crate::detail::Orientation;
use crate::render::batch::InstanceBatch;
use crate::scatter::runner::Placement;

/// Camera state consumed by the per-frame updater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl CameraPose {
    pub fn new(
        position: impl Into<mint::Vector3<f32>>,
        forward: impl Into<mint::Vector3<f32>>,
    ) -> Self {
        Self {
            position: Vec3::from(position.into()),
            forward: Vec3::from(forward.into()),
            up: Vec3::Y,
        }
    }

    pub fn with_up(mut self, up: impl Into<mint::Vector3<f32>>) -> Self {
        self.up = Vec3::from(up.into());
        self
    }

    /// Camera at `position` looking at `target`.
    pub fn look_at(
        position: impl Into<mint::Vector3<f32>>,
        target: impl Into<mint::Vector3<f32>>,
    ) -> Self {
        let position = Vec3::from(position.into());
        let forward = (Vec3::from(target.into()) - position).normalize_or(Vec3::NEG_Z);
        Self {
            position,
            forward,
            up: Vec3::Y,
        }
    }
}

/// Rotation turning an instance at `position` toward the camera about world up.
pub fn cylindrical_billboard(position: Vec3, camera: &CameraPose) -> Quat {
    let d = camera.position - position;
    if d.x == 0.0 && d.z == 0.0 {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y(d.x.atan2(d.z))
}

/// Rotation pointing an instance's local +Z at the camera.
pub fn spherical_billboard(position: Vec3, camera: &CameraPose) -> Quat {
    let z = (camera.position - position)
        .try_normalize()
        .or_else(|| (-camera.forward).try_normalize())
        .unwrap_or(Vec3::Z);

    let x = [camera.up, camera.forward, Vec3::X, Vec3::Y]
        .into_iter()
        .find_map(|secondary| secondary.cross(z).try_normalize())
        .unwrap_or(Vec3::X);
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

/// Shear displacing each local point along X and Z in proportion to its height.
pub fn sway_shear(sway: f32, elapsed: f32, frequency: f32, slot: usize) -> Mat4 {
    let i = slot as f32;
    let phase = elapsed * frequency;
    let s1 = (phase + i).sin() * sway;
    let s2 = (phase - i).sin() * sway;
    Mat4::from_cols(Vec4::X, Vec4::new(s1, 1.0, s2, 0.0), Vec4::Z, Vec4::W)
}

/// World transform of one instance slot for the current frame.
pub fn instance_transform(
    placement: &Placement,
    orientation: Orientation,
    sway: f32,
    slot: usize,
    camera: &CameraPose,
    elapsed: f32,
    sway_frequency: f32,
) -> Mat4 {
    let rotation = match orientation {
        Orientation::ZAxis => cylindrical_billboard(placement.position, camera),
        Orientation::AllAxes => spherical_billboard(placement.position, camera),
        Orientation::None => placement.base_rotation(),
    };

    let mut m = Mat4::from_rotation_translation(rotation, placement.position);
    if placement.scale != 1.0 {
        m *= Mat4::from_scale(Vec3::splat(placement.scale));
    }
    if sway > 0.0 {
        m *= sway_shear(sway, elapsed, sway_frequency, slot);
    }
    m
}

impl InstanceBatch {
    /// Recomputes every slot's transform for this frame.
    pub fn update_transforms(&mut self, camera: &CameraPose, elapsed: f32, sway_frequency: f32) {
        let orientation = self.orientation();
        let sway = self.sway();
        for (slot, placement, transform) in self.slots_mut() {
            *transform = instance_transform(
                placement,
                orientation,
                sway,
                slot,
                camera,
                elapsed,
                sway_frequency,
            );
        }
    }
}
