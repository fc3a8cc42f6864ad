//! Frame Driver
//!
//! [`Viewer`] ties the scene graph to the outside world. The windowing
//! collaborator forwards key events to [`Viewer::on_key`] and calls
//! [`Viewer::frame`] once per presented frame with the current framebuffer
//! size and a [`DrawSink`] that issues the real draw calls.

use glam::{Mat4, Vec3};

use crate::clock::{Clock, SystemClock};
use crate::config::ViewerSettings;
use crate::input::{InputEvent, Key, KeyState};
use crate::scene::{
    CharacterController, DrawSink, FlyCamera, FrameContext, FrameUniforms, PolygonMode, SceneGraph,
};

pub struct Viewer {
    pub graph: SceneGraph,
    pub camera: FlyCamera,
    clock: Box<dyn Clock>,
    keys: KeyState,
    character: Option<CharacterController>,
    polygon_mode: PolygonMode,
    light_dir: Vec3,
    should_close: bool,
    last_frame_time: f32,
    settings: ViewerSettings,
}

impl Viewer {
    /// Viewer driven by wall-clock time.
    #[must_use]
    pub fn new(settings: ViewerSettings) -> Self {
        Self::with_clock(settings, Box::new(SystemClock::new()))
    }

    #[must_use]
    pub fn with_clock(settings: ViewerSettings, clock: Box<dyn Clock>) -> Self {
        log::info!(
            "Viewer '{}' {}x{}",
            settings.window.title,
            settings.window.width,
            settings.window.height
        );
        Self {
            graph: SceneGraph::new(),
            camera: FlyCamera::from_settings(&settings.camera),
            last_frame_time: clock.now(),
            clock,
            keys: KeyState::new(),
            character: None,
            polygon_mode: PolygonMode::Fill,
            light_dir: settings.light_direction,
            should_close: false,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn clock_mut(&mut self) -> &mut dyn Clock {
        self.clock.as_mut()
    }

    #[must_use]
    pub fn now(&self) -> f32 {
        self.clock.now()
    }

    #[must_use]
    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    #[must_use]
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    #[must_use]
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Installs the keyboard-driven character and syncs its pose nodes.
    pub fn set_character(&mut self, character: CharacterController) {
        character.apply(&mut self.graph);
        self.character = Some(character);
    }

    #[must_use]
    pub fn character(&self) -> Option<&CharacterController> {
        self.character.as_ref()
    }

    /// Restarts every animation from time zero.
    pub fn reset_animations(&mut self) {
        self.clock.reset();
        self.last_frame_time = self.clock.now();
        if let Some(character) = &mut self.character {
            character.reset();
            character.apply(&mut self.graph);
        }
        log::debug!("Animations reset");
    }

    /// Handles one key event from the window.
    ///
    /// Press and repeat trigger the viewer bindings (Escape, P, Space) and
    /// are broadcast through the scene graph. The character sees every
    /// event, releases included.
    pub fn on_key(&mut self, event: InputEvent) {
        self.keys.handle_event(&event);

        if event.action.is_down() {
            match event.key {
                Key::Escape => self.should_close = true,
                Key::P => {
                    self.polygon_mode = self.polygon_mode.next();
                    log::debug!("Polygon mode {:?}", self.polygon_mode);
                }
                Key::Space => self.reset_animations(),
                _ => {}
            }
            self.graph.dispatch_input(&event);
        }

        if let Some(character) = &mut self.character
            && character.handle_key(&event)
        {
            character.apply(&mut self.graph);
        }
    }

    /// Uniforms for a framebuffer of the given size.
    #[must_use]
    pub fn uniforms(&self, width: u32, height: u32) -> FrameUniforms {
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        FrameUniforms {
            view: self.camera.view_matrix(),
            projection: self.camera.projection(aspect),
            camera_position: self.camera.position,
            light_dir: self.light_dir,
            polygon_mode: self.polygon_mode,
        }
    }

    /// Renders one frame and returns the clock time it was drawn at.
    ///
    /// The clock is sampled once; camera movement uses the time since the
    /// previous frame.
    pub fn frame(&mut self, width: u32, height: u32, sink: &mut dyn DrawSink) -> f32 {
        let time = self.clock.now();
        let dt = (time - self.last_frame_time).max(0.0);
        self.last_frame_time = time;

        self.camera.update(&self.keys, dt);

        let frame = FrameContext::new(time, self.uniforms(width, height));
        self.graph.draw(Mat4::IDENTITY, &frame, sink);
        time
    }
}
