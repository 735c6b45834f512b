//! Camera attached to the character body: pitch, look limits and lens.
//!
//! The camera looks along its local -Z. Pitch rotates it about the body's
//! lateral axis, so 0 looks straight down, pi/2 looks level along the body's
//! forward axis and pi looks straight up.
#![forbid(unsafe_code)]

use rapier3d::math::Vector;
use rapier3d::na::{Matrix4, Perspective3};
use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};

/// Pitch bounds in degrees, as written in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookLimit {
    pub down: Real,
    pub up: Real,
}

impl Default for LookLimit {
    fn default() -> Self {
        Self {
            down: 0.0,
            up: 180.0,
        }
    }
}

impl LookLimit {
    pub fn to_radians(self) -> PitchRange {
        PitchRange::new(self.down.to_radians(), self.up.to_radians())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchRange {
    min: Real,
    max: Real,
}

impl PitchRange {
    /// Bounds are reordered if given reversed.
    pub fn new(a: Real, b: Real) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> Real {
        self.min
    }

    pub fn max(&self) -> Real {
        self.max
    }

    pub fn clamp(&self, pitch: Real) -> Real {
        pitch.clamp(self.min, self.max)
    }

    pub fn contains(&self, pitch: Real) -> bool {
        pitch >= self.min && pitch <= self.max
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraLens {
    pub fov_y_degrees: Real,
    pub near: Real,
    pub far: Real,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraLens {
    pub fn projection(&self, aspect: Real) -> Matrix4<Real> {
        Perspective3::new(aspect, self.fov_y_degrees.to_radians(), self.near, self.far)
            .to_homogeneous()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vector<Real>,
    pub yaw: Real,
    pub pitch: Real,
}

impl CameraPose {
    pub fn look_direction(&self) -> Vector<Real> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vector::new(-sin_yaw * sin_pitch, cos_yaw * sin_pitch, -cos_pitch)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PlayerCamera {
    eye_height: Real,
    pitch: Real,
    range: PitchRange,
    eye: Vector<Real>,
    yaw: Real,
}

impl PlayerCamera {
    pub fn new(eye_height: Real, limit: LookLimit) -> Self {
        Self {
            eye_height,
            pitch: 0.0,
            range: limit.to_radians(),
            eye: Vector::zeros(),
            yaw: 0.0,
        }
    }

    pub fn pitch(&self) -> Real {
        self.pitch
    }

    pub fn pitch_range(&self) -> PitchRange {
        self.range
    }

    pub fn set_pitch(&mut self, pitch: Real) {
        self.pitch = self.range.clamp(pitch);
    }

    /// Adds to pitch without clamping; call [`clamp_pitch`] before anything
    /// reads the result.
    ///
    /// [`clamp_pitch`]: PlayerCamera::clamp_pitch
    pub fn apply_pitch_delta(&mut self, delta: Real) {
        self.pitch += delta;
    }

    pub fn clamp_pitch(&mut self) -> Real {
        self.pitch = self.range.clamp(self.pitch);
        self.pitch
    }

    pub fn update_from_origin(&mut self, origin: Vector<Real>, yaw: Real) -> CameraPose {
        self.eye = origin + Vector::new(0.0, 0.0, self.eye_height);
        self.yaw = yaw;
        self.pose()
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            eye: self.eye,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Real, b: Real) -> bool {
        (a - b).abs() < 1.0e-5
    }

    #[test]
    fn clamp_saturates_at_bounds() {
        let mut camera = PlayerCamera::new(0.0, LookLimit::default());
        camera.set_pitch(PI);
        camera.apply_pitch_delta(0.5);
        assert!(close(camera.clamp_pitch(), PI));

        camera.apply_pitch_delta(-50.0);
        assert_eq!(camera.clamp_pitch(), 0.0);
    }

    #[test]
    fn reversed_limits_are_reordered() {
        let range = LookLimit {
            down: 45.0,
            up: -45.0,
        }
        .to_radians();
        assert!(range.min() < range.max());
        assert!(range.contains(0.0));
        assert!(!range.contains(1.0));
    }

    #[test]
    fn level_pitch_looks_along_body_forward() {
        let mut camera = PlayerCamera::new(1.6, LookLimit::default());
        camera.set_pitch(FRAC_PI_2);
        let pose = camera.update_from_origin(Vector::new(1.0, 2.0, 3.0), 0.0);
        assert!(close(pose.eye.z, 4.6));
        let dir = pose.look_direction();
        assert!(close(dir.x, 0.0) && close(dir.y, 1.0) && close(dir.z, 0.0));

        camera.set_pitch(0.0);
        let down = camera.update_from_origin(Vector::zeros(), 1.0).look_direction();
        assert!(close(down.z, -1.0));
    }

    #[test]
    fn projection_uses_vertical_fov() {
        let lens = CameraLens {
            fov_y_degrees: 90.0,
            ..Default::default()
        };
        let proj = lens.projection(16.0 / 9.0);
        assert!(close(proj[(1, 1)], 1.0));
        assert!(close(proj[(0, 0)], 9.0 / 16.0));
    }
}
