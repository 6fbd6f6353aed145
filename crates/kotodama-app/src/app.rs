//! Visualizer application implementing winit ApplicationHandler
//!
//! Owns the window, the render stack, and the activation dance: the field
//! spawns nothing until the glyph source arrives from its loader thread,
//! then starts unconditionally. Teardown is synchronous and ordered —
//! stop the loop, release particles, drain the pool, dispose the
//! background, drop the surface.

use kotodama_core::{Color, WordRng};
use kotodama_field::{FieldConfig, Orientation, ParticleField};
use kotodama_render::{
    BackgroundField, Camera, GlyphMeshCache, GlyphSource, RenderContext, StereoCompositor,
};
use kotodama_runtime::{AppConfig, FrameScheduler, PerformanceTier, RenderSettings};
use std::sync::mpsc;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Result of the font loader thread
type FontMessage = Result<Vec<u8>, String>;

pub struct VisualizerApp {
    config: AppConfig,
    words: Vec<String>,
    palette: [Color; 4],
    tier: PerformanceTier,
    settings: RenderSettings,
    fullscreen: bool,

    // Asset loading
    font_rx: Option<mpsc::Receiver<FontMessage>>,
    glyph_source: Option<GlyphSource>,

    // Window + render stack, present only after `resumed`
    window: Option<Arc<Window>>,
    context: Option<RenderContext>,
    compositor: Option<StereoCompositor>,
    background: Option<BackgroundField>,
    cache: GlyphMeshCache,

    // Simulation, present only once the glyph source resolved
    field: Option<ParticleField>,
    camera: Camera,
    scheduler: FrameScheduler,
}

impl VisualizerApp {
    pub fn new(
        config: AppConfig,
        words: Vec<String>,
        palette: [Color; 4],
        tier: PerformanceTier,
        stereo: bool,
        fullscreen: bool,
    ) -> Self {
        let font_rx = Some(spawn_font_loader(config.font.clone()));
        Self {
            config,
            words,
            palette,
            tier,
            settings: RenderSettings {
                stereo,
                pixel_density: 1.0,
            },
            fullscreen,
            font_rx,
            glyph_source: None,
            window: None,
            context: None,
            compositor: None,
            background: None,
            cache: GlyphMeshCache::new(),
            field: None,
            camera: Camera::new(),
            scheduler: FrameScheduler::new(),
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                eprintln!("[app] window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };
        if self.fullscreen {
            window.set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
        }

        let native_density = window.scale_factor() as f32;
        let effective = self.tier.pixel_density(native_density);
        self.settings.pixel_density = effective;
        let render_scale = if native_density > 0.0 {
            effective / native_density
        } else {
            1.0
        };

        let context = match pollster::block_on(RenderContext::new(window.clone(), render_scale)) {
            Ok(context) => context,
            Err(e) => {
                eprintln!("[app] render context failed: {e}");
                event_loop.exit();
                return;
            }
        };

        self.camera.aspect = context.aspect_ratio();
        self.compositor = Some(StereoCompositor::new(&context.device, context.config.format));
        self.background = Some(BackgroundField::new(
            &context.device,
            context.config.format,
            self.palette,
        ));
        self.context = Some(context);
        self.window = Some(window);
    }

    /// Poll the loader thread; on arrival, validate and activate the field.
    /// A failed load is logged and the field stays inactive — no retry.
    fn poll_glyph_source(&mut self) {
        let Some(rx) = &self.font_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(bytes)) => {
                self.font_rx = None;
                match GlyphSource::from_bytes(bytes) {
                    Ok(source) => {
                        self.glyph_source = Some(source);
                        self.activate_field();
                    }
                    Err(e) => eprintln!("[app] glyph source unusable: {e}"),
                }
            }
            Ok(Err(e)) => {
                self.font_rx = None;
                eprintln!("[app] glyph source failed to load: {e}");
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.font_rx = None;
                eprintln!("[app] glyph loader thread vanished");
            }
        }
    }

    fn activate_field(&mut self) {
        if self.field.is_some() || self.glyph_source.is_none() || self.words.is_empty() {
            return;
        }
        let profile = self.tier.profile();
        let field_config = FieldConfig {
            max_particles: profile.max_particles,
            ..Default::default()
        };
        let seed = if self.config.seed != 0 {
            self.config.seed
        } else {
            // Session-unique seed; reproducible runs set one in the config
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(1)
        };
        let field = ParticleField::new(self.words.clone(), field_config, WordRng::new(seed));
        println!(
            "[app] field active: {} words, {} particles, cap {}",
            self.words.len(),
            field.active_count(),
            profile.max_particles
        );
        self.field = Some(field);
    }

    fn tick_and_render(&mut self) {
        self.poll_glyph_source();

        let Some(tick) = self.scheduler.tick() else {
            return;
        };
        let (Some(context), Some(compositor), Some(background)) =
            (&self.context, &self.compositor, &self.background)
        else {
            return;
        };

        // Idle until the glyph source resolves: nothing to simulate or draw
        let (Some(field), Some(source)) = (&mut self.field, &self.glyph_source) else {
            return;
        };

        field.tick();

        for (slot, particle) in field.active() {
            let vertical = particle.orientation == Orientation::FixedVertical;
            if let Err(e) = self.cache.ensure(
                &context.device,
                &compositor.glyph_pipeline,
                slot,
                &particle.word,
                vertical,
                source,
            ) {
                eprintln!("[app] glyph mesh build failed: {e}");
            }
        }

        if let Err(e) = compositor.render(
            context,
            &self.camera,
            field,
            &self.cache,
            background,
            &self.settings,
            tick.elapsed as f32,
        ) {
            eprintln!("[app] render failed: {e}");
        }
    }

    /// Ordered teardown. Safe to call more than once; missing pieces are
    /// skipped silently.
    fn deactivate(&mut self) {
        self.scheduler.cancel_token().cancel();
        // A still-loading glyph source is simply abandoned
        self.font_rx = None;
        if let Some(field) = &mut self.field {
            field.release_all();
            field.drain();
        }
        self.field = None;
        self.cache.drain();
        if let Some(background) = &self.background {
            background.dispose();
        }
        self.background = None;
        self.compositor = None;
        self.context = None;
        self.window = None;
    }
}

impl ApplicationHandler for VisualizerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.initialize(event_loop);
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
                self.deactivate();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.context {
                    context.resize(new_size);
                    self.camera.aspect = context.aspect_ratio();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match key_code {
                        KeyCode::Escape => {
                            self.deactivate();
                            event_loop.exit();
                        }
                        KeyCode::KeyS => {
                            self.settings.stereo = !self.settings.stereo;
                            println!(
                                "[app] stereo {}",
                                if self.settings.stereo { "on" } else { "off" }
                            );
                        }
                        KeyCode::F11 => {
                            if let Some(window) = &self.window {
                                if window.fullscreen().is_some() {
                                    window.set_fullscreen(None);
                                } else {
                                    window.set_fullscreen(Some(
                                        winit::window::Fullscreen::Borderless(None),
                                    ));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick_and_render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Read the font file on a worker thread and hand the bytes back over a
/// channel. The receiver side polls once per event-loop pass.
fn spawn_font_loader(path: String) -> mpsc::Receiver<FontMessage> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let message = std::fs::read(&path).map_err(|e| format!("{path}: {e}"));
        // Receiver may already be gone if the app tore down first
        let _ = tx.send(message);
    });
    rx
}
