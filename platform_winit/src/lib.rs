#![forbid(unsafe_code)]

use player_input::{InputCode, RawInputState};
use thiserror::Error;
use tracing::trace;

pub use winit::dpi::{PhysicalPosition, PhysicalSize};
pub use winit::event::{DeviceEvent, ElementState, Event, WindowEvent};
pub use winit::event_loop::{ControlFlow, EventLoop};
pub use winit::keyboard::{KeyCode, PhysicalKey};
pub use winit::window::{CursorGrabMode, Window};

#[derive(Debug, Error)]
pub enum WindowInitError {
    #[error("event loop initialization failed: {0}")]
    EventLoop(String),
    #[error("window creation failed: {0}")]
    Window(#[source] winit::error::OsError),
}

pub fn create_window(
    title: &str,
    width: u32,
    height: u32,
) -> Result<(EventLoop<()>, Window), WindowInitError> {
    let event_loop = EventLoop::new().map_err(|err| WindowInitError::EventLoop(err.to_string()))?;
    let window = winit::window::WindowBuilder::new()
        .with_title(title)
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .map_err(WindowInitError::Window)?;
    Ok((event_loop, window))
}

/// Confines and hides the cursor for mouse look. Falls back to `Locked`
/// where `Confined` is unsupported.
pub fn grab_cursor(window: &Window, grab: bool) {
    if grab {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(err) = grabbed {
            tracing::warn!(error = %err, "cursor grab unavailable");
        }
    } else {
        let _ = window.set_cursor_grab(CursorGrabMode::None);
    }
    window.set_cursor_visible(!grab);
}

/// Physical key codes use the W3C `KeyboardEvent.code` names, which is
/// also how winit spells its `KeyCode` variants.
pub fn code_name(code: KeyCode) -> InputCode {
    InputCode::new(format!("{:?}", code))
}

/// Raw pointer motion from a device event, if it is one.
pub fn pointer_delta(event: &DeviceEvent) -> Option<[f32; 2]> {
    match event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => Some([*dx as f32, *dy as f32]),
        _ => None,
    }
}

/// Tracks which physical keys are held, in terms the input mapping reads.
#[derive(Debug, Default)]
pub struct InputCapture {
    raw: RawInputState,
}

impl InputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &RawInputState {
        &self.raw
    }

    pub fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let held = state == ElementState::Pressed;
        trace!(?code, held, "key");
        self.raw.set(code_name(code), held);
    }

    /// Feeds keyboard and focus changes. Losing focus releases every key,
    /// since the release events go to whichever window gained it.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.repeat {
                    self.handle_key(event.physical_key, event.state);
                }
            }
            WindowEvent::Focused(false) => self.raw.release_all(),
            _ => {}
        }
    }
}
