//! Window creation and event handling via winit.
//!
//! [`App`] implements winit's [`ApplicationHandler`]. It owns the window, the
//! GPU context and the [`RenderSession`], and calls
//! [`tick`](RenderSession::tick) once per `RedrawRequested`, asking for the
//! next redraw straight after so the loop follows the display refresh.

use std::sync::Arc;
use std::time::Instant;

use horizon_config::Config;
use horizon_raymarch::SceneMode;
use horizon_render::{
    RenderContext, RenderSession, SessionError, SurfaceError, SurfaceExtent,
    init_render_context_blocking,
};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::clock::{AnimationClock, FrameStats};

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    CycleMode,
    SelectMode(SceneMode),
    TogglePause,
    Exit,
}

/// Key bindings: Space/Tab cycle, 1/2/3 pick a mode, P pauses, Escape quits.
pub fn key_action(key: KeyCode) -> Option<KeyAction> {
    match key {
        KeyCode::Space | KeyCode::Tab => Some(KeyAction::CycleMode),
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(KeyAction::SelectMode(SceneMode::from_index(0))),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(KeyAction::SelectMode(SceneMode::from_index(1))),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(KeyAction::SelectMode(SceneMode::from_index(2))),
        KeyCode::KeyP => Some(KeyAction::TogglePause),
        KeyCode::Escape => Some(KeyAction::Exit),
        _ => None,
    }
}

/// Window title for `mode`, ending with the label of the mode-switch control.
pub fn window_title(prefix: &str, mode: SceneMode) -> String {
    format!("{prefix} | {} | Space: {}", mode.title(), mode.switch_label())
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(window_title(&config.window.title, config.scene.initial_mode))
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// Application state driven by the winit event loop.
pub struct App {
    config: Config,
    window: Option<Arc<Window>>,
    context: Option<RenderContext>,
    session: Option<RenderSession>,
    clock: AnimationClock,
    stats: FrameStats,
}

impl App {
    pub fn new(config: Config) -> Self {
        let clock = AnimationClock::new(config.scene.time_scale, config.scene.paused);
        Self {
            config,
            window: None,
            context: None,
            session: None,
            clock,
            stats: FrameStats::new(),
        }
    }

    /// Active mode, or the configured startup mode before the session exists.
    pub fn mode(&self) -> SceneMode {
        self.session
            .as_ref()
            .map_or(self.config.scene.initial_mode, RenderSession::mode)
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let attrs = window_attributes_from_config(&self.config);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| format!("window creation failed: {e}"))?,
        );

        let context = init_render_context_blocking(Arc::clone(&window), self.config.window.vsync)
            .map_err(|e| format!("GPU initialization failed: {e}"))?;

        let size = window.inner_size();
        let session = RenderSession::new(
            &context.device,
            &context.queue,
            context.surface_format,
            self.config.scene.initial_mode,
            SurfaceExtent {
                width: size.width,
                height: size.height,
            },
        )
        .map_err(|e| format!("render session failed: {e}"))?;
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            mode = %session.mode(),
            "Viewer ready"
        );

        window.request_redraw();
        self.window = Some(window);
        self.context = Some(context);
        self.session = Some(session);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if !event.state.is_pressed() || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(action) = key_action(code) else {
            return;
        };

        match action {
            KeyAction::Exit => {
                info!("Escape pressed, shutting down");
                event_loop.exit();
            }
            KeyAction::TogglePause => {
                let paused = self.clock.toggle();
                info!(paused, "Animation clock toggled");
            }
            KeyAction::CycleMode => {
                if let Some(session) = &mut self.session {
                    session.cycle_mode();
                }
                self.refresh_title();
            }
            KeyAction::SelectMode(mode) => {
                if let Some(session) = &mut self.session {
                    session.set_mode(mode);
                }
                self.refresh_title();
            }
        }
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&window_title(&self.config.window.title, self.mode()));
        }
    }

    fn publish_size(&self, width: u32, height: u32) {
        if let Some(session) = &self.session {
            let extent = session.resize(width, height);
            info!(width = extent.width, height = extent.height, "Window resized");
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(session), Some(context)) = (&mut self.session, &mut self.context) else {
            return;
        };

        match session.tick(self.clock.now_ms(), context) {
            Ok(()) => {}
            Err(SessionError::Surface(SurfaceError::Timeout)) => {
                warn!("Surface timeout, skipping frame");
            }
            Err(e) => {
                error!("Frame failed: {e}");
                event_loop.exit();
                return;
            }
        }

        if self.config.debug.show_frame_stats
            && let Some(fps) = self.stats.record(Instant::now())
        {
            info!(
                fps = format_args!("{fps:.1}"),
                frames = session.frames_submitted(),
                "Frame stats"
            );
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            error!("{e}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.publish_size(new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let inner = window.inner_size();
                    info!(scale_factor, "Scale factor changed");
                    self.publish_size(inner.width, inner.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_keys() {
        assert_eq!(key_action(KeyCode::Space), Some(KeyAction::CycleMode));
        assert_eq!(key_action(KeyCode::Tab), Some(KeyAction::CycleMode));
        assert_eq!(
            key_action(KeyCode::Digit1),
            Some(KeyAction::SelectMode(SceneMode::BlackHole))
        );
        assert_eq!(
            key_action(KeyCode::Digit2),
            Some(KeyAction::SelectMode(SceneMode::Agn))
        );
        assert_eq!(
            key_action(KeyCode::Numpad3),
            Some(KeyAction::SelectMode(SceneMode::FarAway))
        );
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key_action(KeyCode::Escape), Some(KeyAction::Exit));
        assert_eq!(key_action(KeyCode::KeyP), Some(KeyAction::TogglePause));
        assert_eq!(key_action(KeyCode::KeyW), None);
        assert_eq!(key_action(KeyCode::Digit4), None);
    }

    #[test]
    fn test_window_title_names_next_mode() {
        assert_eq!(
            window_title("Horizon", SceneMode::BlackHole),
            "Horizon | Black Hole | Space: Switch to AGN"
        );
        assert_eq!(
            window_title("Horizon", SceneMode::FarAway),
            "Horizon | Far Away | Space: Switch to Black Hole"
        );
    }

    #[test]
    fn test_app_starts_without_window() {
        let mut config = Config::default();
        config.scene.initial_mode = SceneMode::Agn;
        config.scene.paused = true;
        let app = App::new(config);
        assert!(app.window.is_none());
        assert!(app.session.is_none());
        assert_eq!(app.mode(), SceneMode::Agn);
        assert!(app.clock.is_paused());
    }

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.fullscreen = true;
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, window_title("Horizon", SceneMode::BlackHole));
        assert!(attrs.fullscreen.is_some());
    }
}
