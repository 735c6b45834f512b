//! First-person walk motor: planar moves along the body axes and vertical
//! velocity integrated under constant gravity (Z up).
#![forbid(unsafe_code)]

use rapier3d::math::Vector;
use rapier3d::prelude::Real;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsMotorConfig {
    pub walk_speed: Real,
    pub sprint_speed: Real,
    /// Signed acceleration along Z in m/s^2; negative pulls down.
    pub gravity: Real,
    /// Vertical velocity set on a grounded jump, in m/s.
    pub jump_power: Real,
}

impl Default for FpsMotorConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            sprint_speed: 10.0,
            gravity: -9.81,
            jump_power: 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FpsMotorInput {
    /// Lateral (x) and forward (y) axis values from the input snapshot.
    pub move_axis: [Real; 2],
    pub jump: bool,
    pub sprint: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerticalMotion {
    pub velocity: Real,
    pub grounded: bool,
    pub was_grounded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalStep {
    pub displacement: Real,
    pub velocity: Real,
    pub jumped: bool,
    pub landed: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct FpsMotorOutput {
    pub desired_translation: Vector<Real>,
    pub vertical: VerticalStep,
}

pub struct FpsMotor {
    config: FpsMotorConfig,
    vertical: VerticalMotion,
}

impl FpsMotor {
    pub fn new(config: FpsMotorConfig) -> Self {
        Self {
            config,
            vertical: VerticalMotion::default(),
        }
    }

    pub fn vertical(&self) -> VerticalMotion {
        self.vertical
    }

    /// One frame of vertical motion.
    ///
    /// Gravity integrates first, then a grounded character sheds downward
    /// velocity, then a grounded jump overrides the velocity. Only negative
    /// velocity is cancelled on contact so the frame after a jump, while the
    /// probe still touches the floor, keeps the launch.
    fn integrate_vertical(&mut self, jump: bool, grounded: bool, dt: Real) -> VerticalStep {
        let dt = dt.max(0.0);
        let was_grounded = self.vertical.grounded;
        let mut velocity = self.vertical.velocity + self.config.gravity * dt;
        let mut landed = false;
        if grounded && velocity < 0.0 {
            velocity = 0.0;
            landed = !was_grounded;
            if landed {
                debug!(velocity = self.vertical.velocity, "landed");
            }
        }
        let jumped = jump && grounded;
        if jumped {
            velocity = self.config.jump_power;
            trace!(velocity, "jump impulse");
        }
        self.vertical = VerticalMotion {
            velocity,
            grounded,
            was_grounded,
        };
        VerticalStep {
            displacement: velocity * dt,
            velocity,
            jumped,
            landed,
        }
    }

    fn planar_translation(&self, input: &FpsMotorInput, yaw: Real, dt: Real) -> Vector<Real> {
        let speed = if input.sprint {
            self.config.sprint_speed
        } else {
            self.config.walk_speed
        };
        let (lateral, forward) = body_axes(yaw);
        let dt = dt.max(0.0);
        lateral * (input.move_axis[0] * speed * dt) + forward * (input.move_axis[1] * speed * dt)
    }

    /// One frame of motion: vertical integration against `grounded`, then
    /// the planar move along the axes of `yaw`. The returned translation
    /// carries the vertical displacement in z.
    pub fn step(
        &mut self,
        input: &FpsMotorInput,
        grounded: bool,
        yaw: Real,
        dt: Real,
    ) -> FpsMotorOutput {
        let vertical = self.integrate_vertical(input.jump, grounded, dt);
        let mut desired_translation = self.planar_translation(input, yaw, dt);
        desired_translation.z += vertical.displacement;
        FpsMotorOutput {
            desired_translation,
            vertical,
        }
    }
}

/// Lateral (local +X) and forward (local +Y) axes of a body yawed about +Z.
fn body_axes(yaw: Real) -> (Vector<Real>, Vector<Real>) {
    let (sin, cos) = yaw.sin_cos();
    let lateral = Vector::new(cos, sin, 0.0);
    let forward = Vector::new(-sin, cos, 0.0);
    (lateral, forward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn close(a: Real, b: Real, eps: Real) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn free_fall_matches_closed_form() {
        let config = FpsMotorConfig::default();
        let mut motor = FpsMotor::new(config);
        let dt = 1.0 / 60.0;
        let mut z = 0.0;
        for n in 1..=120 {
            z += motor.integrate_vertical(false, false, dt).displacement;
            let n_real = n as Real;
            let expected_velocity = config.gravity * dt * n_real;
            let expected_z = config.gravity * dt * dt * n_real * (n_real + 1.0) * 0.5;
            assert!(close(motor.vertical().velocity, expected_velocity, 1.0e-3));
            assert!(close(z, expected_z, 1.0e-3));
        }
    }

    #[test]
    fn jump_held_in_air_changes_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut held = FpsMotor::new(FpsMotorConfig::default());
        let mut idle = FpsMotor::new(FpsMotorConfig::default());
        for _ in 0..200 {
            let dt = rng.gen_range(0.0..0.05);
            let a = held.integrate_vertical(true, false, dt);
            let b = idle.integrate_vertical(false, false, dt);
            assert_eq!(a, b);
            assert!(!a.jumped);
        }
    }

    #[test]
    fn contact_cancels_only_downward_velocity() {
        let mut motor = FpsMotor::new(FpsMotorConfig::default());
        motor.integrate_vertical(false, false, 0.5);
        assert!(motor.vertical().velocity < 0.0);

        let step = motor.integrate_vertical(false, true, 0.016);
        assert_eq!(step.velocity, 0.0);
        assert_eq!(step.displacement, 0.0);
        assert!(step.landed);

        let launch = motor.integrate_vertical(true, true, 0.016);
        assert!(launch.jumped);
        // Probe still reports contact on the frame after the launch.
        let rising = motor.integrate_vertical(false, true, 0.016);
        assert!(rising.velocity > 0.0);
        assert!(!rising.landed);
    }

    #[test]
    fn jump_overrides_instead_of_adding() {
        let config = FpsMotorConfig::default();
        let mut motor = FpsMotor::new(config);
        for _ in 0..5 {
            let step = motor.integrate_vertical(true, true, 0.02);
            assert_eq!(step.velocity, config.jump_power);
        }
    }

    #[test]
    fn zero_gravity_floats_at_launch_speed() {
        let config = FpsMotorConfig {
            gravity: 0.0,
            ..Default::default()
        };
        let mut motor = FpsMotor::new(config);
        motor.integrate_vertical(true, true, 0.1);
        for _ in 0..10 {
            let step = motor.integrate_vertical(false, false, 0.1);
            assert_eq!(step.velocity, config.jump_power);
        }
    }

    #[test]
    fn zero_delta_moves_nothing() {
        let mut motor = FpsMotor::new(FpsMotorConfig::default());
        let input = FpsMotorInput {
            move_axis: [1.0, 1.0],
            jump: true,
            sprint: true,
        };
        for grounded in [false, true, true, false] {
            let output = motor.step(&input, grounded, 0.7, 0.0);
            assert_eq!(output.desired_translation, Vector::zeros());
        }
    }

    #[test]
    fn forward_follows_yaw() {
        let motor = FpsMotor::new(FpsMotorConfig::default());
        let input = FpsMotorInput {
            move_axis: [0.0, 1.0],
            ..Default::default()
        };
        let ahead = motor.planar_translation(&input, 0.0, 1.0);
        assert!(close(ahead.y, 5.0, 1.0e-5));
        assert!(close(ahead.x, 0.0, 1.0e-5));

        let turned = motor.planar_translation(&input, std::f32::consts::FRAC_PI_2, 1.0);
        assert!(close(turned.x, -5.0, 1.0e-5));
        assert!(close(turned.y, 0.0, 1.0e-5));
    }

    #[test]
    fn sprint_selects_sprint_speed() {
        let motor = FpsMotor::new(FpsMotorConfig::default());
        let input = FpsMotorInput {
            move_axis: [-1.0, 0.0],
            sprint: true,
            ..Default::default()
        };
        let step = motor.planar_translation(&input, 0.0, 0.5);
        assert!(close(step.x, -5.0, 1.0e-5));
        assert_eq!(step.z, 0.0);
    }
}
