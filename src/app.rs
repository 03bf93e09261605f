//! The graphics side of the demo: window, input and rendering.
//!
//! [`App`] owns the window and renderer and drives the virtual device's hand
//! from the mouse. It never touches the world directly; each frame it draws
//! the latest snapshot published by the [`HapticsThread`].

use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowId};

use crate::config::DemoConfig;
use crate::device::HandController;
use crate::error::DemoError;
use crate::frequency::FrequencyCounter;
use crate::gpu::Renderer;
use crate::haptics::HapticsThread;
use crate::input::{Command, Input, KeyCode};

/// Normalized depth change per scroll line.
const DEPTH_PER_LINE: f64 = 0.05;
/// Normalized depth change per second while W or S is held.
const DEPTH_SPEED: f64 = 0.5;

/// Window size as fractions of the monitor height.
const WINDOW_WIDTH_FRACTION: f64 = 0.8;
const WINDOW_HEIGHT_FRACTION: f64 = 0.5;

/// The demo window: renders haptics snapshots and drives the hand from the mouse.
///
/// Owns the [`HapticsThread`] and stops it when the event loop exits.
pub struct App {
    config: DemoConfig,
    haptics: HapticsThread,
    hand: HandController,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    input: Input,
    graphic_rate: FrequencyCounter,
    /// Hand depth along the camera axis, positive toward the viewer.
    depth: f64,
    fullscreen: bool,
    last_frame: Instant,
    title: String,
    error: Option<DemoError>,
}

impl App {
    /// Wrap a running haptics thread. The window opens on `resumed`.
    pub fn new(config: DemoConfig, haptics: HapticsThread, hand: HandController) -> Self {
        let fullscreen = config.window.fullscreen;
        Self {
            config,
            haptics,
            hand,
            window: None,
            renderer: None,
            input: Input::new(),
            graphic_rate: FrequencyCounter::new(),
            depth: 0.0,
            fullscreen,
            last_frame: Instant::now(),
            title: String::new(),
            error: None,
        }
    }

    /// The error that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<DemoError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: DemoError) {
        error!("{}", err);
        self.error = Some(err);
        self.quit(event_loop);
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.haptics.stop();
        event_loop.exit();
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Window, DemoError> {
        let mut attrs = Window::default_attributes().with_title(self.config.window.title.clone());

        if let Some(monitor) = event_loop.primary_monitor().or_else(|| event_loop.available_monitors().next()) {
            let screen = monitor.size();
            let h = screen.height as f64;
            let width = WINDOW_WIDTH_FRACTION * h;
            let height = WINDOW_HEIGHT_FRACTION * h;
            let origin = monitor.position();
            attrs = attrs
                .with_inner_size(PhysicalSize::new(width, height))
                .with_position(PhysicalPosition::new(
                    origin.x as f64 + (screen.width as f64 - width) / 2.0,
                    origin.y as f64 + (h - height) / 2.0,
                ));
        }

        if self.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        Ok(event_loop.create_window(attrs)?)
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        if let Some(window) = &self.window {
            window.set_fullscreen(self.fullscreen.then(|| Fullscreen::Borderless(None)));
        }
        info!("Fullscreen {}", if self.fullscreen { "on" } else { "off" });
    }

    fn toggle_mirror(&mut self) {
        if let Some(renderer) = &mut self.renderer {
            let mirrored = !renderer.is_mirrored();
            renderer.set_mirrored(mirrored);
            info!("Mirrored display {}", if mirrored { "on" } else { "off" });
        }
    }

    /// Map the cursor and depth onto the hand target.
    fn update_hand(&mut self, dt: f64) {
        self.depth -= self.input.scroll_delta() as f64 * DEPTH_PER_LINE;
        if self.input.key_held(KeyCode::W) {
            self.depth -= DEPTH_SPEED * dt;
        }
        if self.input.key_held(KeyCode::S) {
            self.depth += DEPTH_SPEED * dt;
        }
        self.depth = self.depth.clamp(-1.0, 1.0);

        let Some(renderer) = &self.renderer else {
            return;
        };
        let camera = renderer.camera();
        let (right, mut up) = camera.screen_axes();
        if camera.mirrored {
            up = -up;
        }
        let ndc = self.input.mouse_ndc();
        let target = right.as_dvec3() * ndc.x as f64
            + up.as_dvec3() * ndc.y as f64
            - camera.forward().as_dvec3() * self.depth;
        self.hand.set_target(target);
    }

    fn update_title(&mut self, haptic_rate: f64) {
        let title = format!(
            "{} - {:.0} Hz / {:.0} Hz",
            self.config.window.title,
            self.graphic_rate.frequency(),
            haptic_rate
        );
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        for command in self.input.commands() {
            match command {
                Command::Quit => {
                    self.quit(event_loop);
                    return;
                }
                Command::ToggleFullscreen => self.toggle_fullscreen(),
                Command::ToggleMirror => self.toggle_mirror(),
                Command::ResetDepth => self.depth = 0.0,
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.update_hand(dt);

        let snapshot = self.haptics.snapshot();
        let mut out_of_memory = false;
        if let Some(renderer) = &mut self.renderer {
            match renderer.render(&snapshot) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => out_of_memory = true,
                Err(e) => warn!("Render error: {:?}", e),
            }
        }
        if out_of_memory {
            error!("GPU out of memory");
            return self.quit(event_loop);
        }

        self.graphic_rate.signal(1);
        self.update_title(snapshot.haptic_rate);
        self.input.begin_frame();

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

        let window = match self.create_window(event_loop) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e),
        };

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        match pollster::block_on(Renderer::new(Arc::clone(&window), &self.config)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => return self.fail(event_loop, e.into()),
        }

        window.request_redraw();
        self.window = Some(window);
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                self.input.set_window_size(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.haptics.flags().is_finished() && !event_loop.exiting() {
            warn!("Haptics loop ended; closing the window");
            self.quit(event_loop);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.haptics.stop();
        info!("Demo closed");
    }
}
