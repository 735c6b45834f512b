use std::path::PathBuf;
use std::time::Duration;

use engine_core::logging;
use physics_rapier::PhysicsWorld;
use platform_winit::{
    create_window, grab_cursor, pointer_delta, ControlFlow, ElementState, Event, InputCapture,
    KeyCode, PhysicalKey, WindowEvent,
};
use player_controller::{CharacterController, ControllerConfig};
use rapier3d::math::Vector;
use tracing::{debug, error, info, warn};

const EXIT_USAGE: i32 = 2;
const EXIT_CONFIG: i32 = 10;
const EXIT_WINDOW: i32 = 11;
const FLOOR_HALF_EXTENT: f32 = 500.0;
const SPAWN_HEIGHT: f32 = 3.0;
const POSE_LOG_INTERVAL: Duration = Duration::from_secs(1);

struct CliArgs {
    config: Option<PathBuf>,
    log_filter: Option<String>,
}

enum ArgParseError {
    Help,
    Message(String),
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(ArgParseError::Help) => {
            print_usage();
            return;
        }
        Err(ArgParseError::Message(message)) => {
            eprintln!("{}", message);
            print_usage();
            std::process::exit(EXIT_USAGE);
        }
    };

    logging::init(
        args.log_filter
            .as_deref()
            .unwrap_or(logging::DEFAULT_FILTER),
    );
    logging::install_panic_hook();

    let config = match args.config.as_deref() {
        Some(path) => match ControllerConfig::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "controller config loaded");
                config
            }
            Err(err) => {
                error!("{}", err);
                std::process::exit(EXIT_CONFIG);
            }
        },
        None => {
            warn!("no --config given, using built-in controller defaults");
            ControllerConfig::default()
        }
    };

    let mut controller =
        match CharacterController::new(&config, Vector::new(0.0, 0.0, SPAWN_HEIGHT)) {
            Ok(controller) => controller,
            Err(err) => {
                error!("controller init failed: {}", err);
                std::process::exit(EXIT_CONFIG);
            }
        };

    let mut world = PhysicsWorld::new();
    world.insert_floor(0.0, FLOOR_HALF_EXTENT);

    let (event_loop, window) = match create_window("Pallet", 1280, 720) {
        Ok(result) => result,
        Err(err) => {
            error!("window init failed: {}", err);
            std::process::exit(EXIT_WINDOW);
        }
    };
    let main_window_id = window.id();
    let lens = config.camera.lens();

    let mut capture = InputCapture::new();
    let mut mouse_grabbed = false;
    let mut last_pose_log = Duration::ZERO;

    if let Err(err) = event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, window_id } if window_id == main_window_id => {
                capture.handle_window_event(&event);
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) if size.height > 0 => {
                        let aspect = size.width as f32 / size.height as f32;
                        let projection = lens.projection(aspect);
                        debug!(
                            aspect,
                            focal_y = projection[(1, 1)],
                            "projection updated"
                        );
                    }
                    WindowEvent::Focused(false) => {
                        mouse_grabbed = false;
                        grab_cursor(&window, false);
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        ..
                    } if !mouse_grabbed => {
                        mouse_grabbed = true;
                        grab_cursor(&window, true);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed
                            && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                        {
                            if mouse_grabbed {
                                mouse_grabbed = false;
                                grab_cursor(&window, false);
                            } else {
                                elwt.exit();
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::DeviceEvent { event, .. } => {
                if mouse_grabbed {
                    if let Some(delta) = pointer_delta(&event) {
                        controller.on_pointer_motion(delta);
                    }
                }
            }
            Event::AboutToWait => {
                let frame = controller.update(capture.raw(), &world);
                if frame.time.elapsed.saturating_sub(last_pose_log) >= POSE_LOG_INTERVAL {
                    last_pose_log = frame.time.elapsed;
                    let position = frame.pose.position;
                    let look = frame.camera.look_direction();
                    debug!(
                        x = position.x,
                        y = position.y,
                        z = position.z,
                        yaw = frame.pose.yaw,
                        pitch = frame.pose.pitch,
                        look_x = look.x,
                        look_y = look.y,
                        look_z = look.z,
                        grounded = frame.contact.grounded,
                        "pose"
                    );
                }
            }
            Event::LoopExiting => {
                controller.shutdown();
                info!("controller shut down");
            }
            _ => {}
        }
    }) {
        error!("event loop exited with error: {}", err);
    }
}

fn parse_args() -> Result<CliArgs, ArgParseError> {
    let mut config = None;
    let mut log_filter = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| ArgParseError::Message("--config expects a path".into()))?;
                config = Some(PathBuf::from(value));
            }
            "--log" => {
                let value = args
                    .next()
                    .ok_or_else(|| ArgParseError::Message("--log expects a filter".into()))?;
                log_filter = Some(value);
            }
            "-h" | "--help" => return Err(ArgParseError::Help),
            _ => {
                return Err(ArgParseError::Message(format!("unknown argument: {}", arg)));
            }
        }
    }

    Ok(CliArgs { config, log_filter })
}

fn print_usage() {
    eprintln!("usage: pallet [--config <path>] [--log <filter>]");
    eprintln!("example: pallet --config controller.toml --log debug");
    eprintln!("controls: click to grab the mouse, WASD or arrows to move, Space to jump, Shift to sprint, Esc to release or quit");
}
