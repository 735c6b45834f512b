//! First-person character controller (input + ground probe + motor + camera).
//!
//! One [`CharacterController::update`] per rendered frame runs the whole
//! pipeline: normalize input, probe and snap to the ground, integrate
//! vertical motion, move along the body axes, apply look and clamp pitch.
#![forbid(unsafe_code)]

mod config;

use std::time::Duration;

use character_motor_fps::{FpsMotor, FpsMotorConfig, FpsMotorInput, VerticalStep};
use engine_core::clock::{FrameClock, FrameTime};
use ground_probe::{GroundContact, GroundProbe, SceneQuery};
use player_camera::{CameraPose, PlayerCamera};
use player_input::{ActionId, AxisId, InputError, InputMapping, PointerDrift, RawInputState};
use rapier3d::math::{Point, Vector};
use rapier3d::prelude::Real;
use thiserror::Error;
use tracing::{debug, info};

pub use config::{Bindings, CameraConfig, ConfigError, ControllerConfig, Sensitivity};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("binding '{binding}' does not resolve: {source}")]
    Binding {
        binding: &'static str,
        #[source]
        source: InputError,
    },
}

/// The controller's externally visible state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterPose {
    pub position: Vector<Real>,
    pub yaw: Real,
    pub pitch: Real,
}

#[derive(Clone, Copy, Debug)]
pub struct PlayerFrame {
    pub time: FrameTime,
    pub pose: CharacterPose,
    pub camera: CameraPose,
    pub contact: GroundContact,
    pub vertical: VerticalStep,
}

#[derive(Clone, Copy, Debug)]
struct ResolvedBindings {
    horizontal: AxisId,
    vertical: AxisId,
    jump: ActionId,
    sprint: ActionId,
}

impl ResolvedBindings {
    fn resolve(bindings: &Bindings, mapping: &InputMapping) -> Result<Self, ControllerError> {
        let axis = |binding: &'static str, name: &str| {
            mapping
                .axis_id(name)
                .map_err(|source| ControllerError::Binding { binding, source })
        };
        let action = |binding: &'static str, name: &str| {
            mapping
                .action_id(name)
                .map_err(|source| ControllerError::Binding { binding, source })
        };
        Ok(Self {
            horizontal: axis("horizontal", &bindings.horizontal)?,
            vertical: axis("vertical", &bindings.vertical)?,
            jump: action("jump", &bindings.jump)?,
            sprint: action("sprint", &bindings.sprint)?,
        })
    }
}

pub struct CharacterController {
    mapping: InputMapping,
    bindings: ResolvedBindings,
    sensitivity: Sensitivity,
    probe: GroundProbe,
    motor: FpsMotor,
    camera: PlayerCamera,
    pointer: PointerDrift,
    clock: FrameClock,
    position: Vector<Real>,
    yaw: Real,
}

impl CharacterController {
    pub fn new(config: &ControllerConfig, position: Vector<Real>) -> Result<Self, ControllerError> {
        config.validate()?;
        let bindings = ResolvedBindings::resolve(&config.bindings, &config.input)?;
        let motor = FpsMotor::new(FpsMotorConfig {
            walk_speed: config.walk_speed,
            sprint_speed: config.sprint_speed,
            gravity: config.gravity,
            jump_power: config.jump_power,
        });
        let mut camera = PlayerCamera::new(config.camera.eye_height, config.look_limit);
        camera.set_pitch(config.camera.initial_pitch.to_radians());
        camera.update_from_origin(position, 0.0);
        info!(
            walk_speed = config.walk_speed,
            sprint_speed = config.sprint_speed,
            floor_distance = config.floor_distance,
            "character controller ready"
        );
        Ok(Self {
            mapping: config.input.clone(),
            bindings,
            sensitivity: config.sensitivity,
            probe: GroundProbe::new(config.floor_distance),
            motor,
            camera,
            pointer: PointerDrift::new(config.pointer_idle_window()),
            clock: FrameClock::start(),
            position,
            yaw: 0.0,
        })
    }

    pub fn pose(&self) -> CharacterPose {
        CharacterPose {
            position: self.position,
            yaw: self.yaw,
            pitch: self.camera.pitch(),
        }
    }

    pub fn set_position(&mut self, position: Vector<Real>) {
        self.position = position;
        self.camera.update_from_origin(self.position, self.yaw);
    }

    /// Sets body yaw and camera pitch in radians; pitch is clamped.
    pub fn set_look(&mut self, yaw: Real, pitch: Real) {
        self.yaw = yaw;
        self.camera.set_pitch(pitch);
        self.camera.update_from_origin(self.position, self.yaw);
    }

    pub fn camera(&self) -> &PlayerCamera {
        &self.camera
    }

    pub fn motor(&self) -> &FpsMotor {
        &self.motor
    }

    pub fn pointer(&self) -> &PointerDrift {
        &self.pointer
    }

    /// Records a pointer movement stamped with the internal clock.
    pub fn on_pointer_motion(&mut self, delta: [f32; 2]) {
        let now = self.clock.now();
        self.pointer.on_motion(delta, now);
    }

    pub fn on_pointer_motion_at(&mut self, delta: [f32; 2], now: Duration) {
        self.pointer.on_motion(delta, now);
    }

    /// Runs one frame timed by the internal clock.
    pub fn update<S: SceneQuery + ?Sized>(&mut self, raw: &RawInputState, scene: &S) -> PlayerFrame {
        let time = self.clock.tick();
        self.update_with_time(raw, scene, time)
    }

    /// Runs one frame with host-supplied time.
    pub fn update_with_time<S: SceneQuery + ?Sized>(
        &mut self,
        raw: &RawInputState,
        scene: &S,
        time: FrameTime,
    ) -> PlayerFrame {
        let time = time.sanitized();
        let dt = time.delta;

        let pointer = self.pointer.poll(time.elapsed);
        let snapshot = self.mapping.normalize(raw);
        let input = FpsMotorInput {
            move_axis: [
                snapshot.axis_value(self.bindings.horizontal),
                snapshot.axis_value(self.bindings.vertical),
            ],
            jump: snapshot.action_active(self.bindings.jump),
            sprint: snapshot.action_active(self.bindings.sprint),
        };

        let contact = self.probe.probe(Point::from(self.position), scene);
        if let Some(surface_z) = contact.surface_z {
            self.position.z = surface_z;
        }

        // Planar move uses the yaw from before this frame's look input.
        let motion = self.motor.step(&input, contact.grounded, self.yaw, dt);
        self.position += motion.desired_translation;
        let vertical = motion.vertical;
        if vertical.landed {
            debug!(z = self.position.z, "grounded");
        }

        self.yaw += -pointer[0] * dt * self.sensitivity.x;
        self.camera
            .apply_pitch_delta(-pointer[1] * dt * self.sensitivity.y);
        self.camera.clamp_pitch();

        let camera = self.camera.update_from_origin(self.position, self.yaw);
        PlayerFrame {
            time,
            pose: self.pose(),
            camera,
            contact,
            vertical,
        }
    }

    /// Drops any pending pointer idle transition. Call when the host stops
    /// driving the controller.
    pub fn shutdown(&mut self) {
        self.pointer.cancel();
    }
}
