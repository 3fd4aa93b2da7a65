mod audio;
mod core;
mod input;
mod playback;
mod ui;

use audio::CuePlayer;
use core::VesselEvent;
use playback::{PlaybackEngine, TimelineScrubber};
use ui::{ControlAction, FileDialogs, PlaybackControls, PlotAction, ScatterPlotWindow};

use imgui::{Context, FontConfig, FontSource};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin_winit::{DisplayBuilder, GlWindow};
use glow::HasContext;
use raw_window_handle::HasRawWindowHandle;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;
use tracing::{info, warn};

struct AppState {
    playback: PlaybackEngine,
    scrubber: TimelineScrubber,
    cue_player: Option<CuePlayer>,
    scatter: ScatterPlotWindow,
    controls: PlaybackControls,
    file_loaded: bool,
    show_plot: bool,
    show_controls: bool,
    show_file_open_pending: bool,
    status_message: Option<String>,
    // Async loading state
    loading: bool,
    loading_receiver: Option<Receiver<LoadingUpdate>>,
}

/// Messages for async loading
enum LoadingUpdate {
    Complete(Vec<VesselEvent>),
    Error(String),
}

/// Persistent application settings
#[derive(Serialize, Deserialize)]
struct AppSettings {
    show_plot: bool,
    show_controls: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_plot: true,
            show_controls: true,
        }
    }
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("harbor-viz").join("settings.json"))
    }

    fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(contents) = fs::read_to_string(&path) {
                    if let Ok(settings) = serde_json::from_str(&contents) {
                        return settings;
                    }
                }
            }
        }
        Self::default()
    }

    fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(&path, json);
            }
        }
    }
}

impl AppState {
    fn new() -> Self {
        let settings = AppSettings::load();

        Self {
            playback: PlaybackEngine::new(Vec::new()),
            scrubber: TimelineScrubber::new(),
            cue_player: CuePlayer::new(),
            scatter: ScatterPlotWindow::new(),
            controls: PlaybackControls::new(),
            file_loaded: false,
            show_plot: settings.show_plot,
            show_controls: settings.show_controls,
            show_file_open_pending: false,
            status_message: None,
            loading: false,
            loading_receiver: None,
        }
    }

    fn save_settings(&self) {
        let settings = AppSettings {
            show_plot: self.show_plot,
            show_controls: self.show_controls,
        };
        settings.save();
    }

    /// Kick off a background load of a vessel log
    fn load_file(&mut self, path: PathBuf) {
        self.loading = true;
        self.status_message = Some(format!("Loading {}...", path.display()));

        let (tx, rx) = channel();
        self.loading_receiver = Some(rx);

        std::thread::spawn(move || {
            let result = input::load_file(&path)
                .with_context(|| format!("failed to load {}", path.display()));
            let update = match result {
                Ok(events) => LoadingUpdate::Complete(events),
                Err(e) => LoadingUpdate::Error(format!("{:#}", e)),
            };
            let _ = tx.send(update);
        });
    }

    /// Poll the loading thread without blocking the frame
    fn process_loading(&mut self) {
        let receiver = match self.loading_receiver.take() {
            Some(r) => r,
            None => return,
        };

        match receiver.try_recv() {
            Ok(LoadingUpdate::Complete(events)) => {
                self.finish_loading(events);
                self.loading = false;
            }
            Ok(LoadingUpdate::Error(e)) => {
                warn!("load failed: {}", e);
                self.status_message = Some(format!("Failed to load file: {}", e));
                self.loading = false;
            }
            Err(_) => {
                self.loading_receiver = Some(receiver);
            }
        }
    }

    fn finish_loading(&mut self, events: Vec<VesselEvent>) {
        let count = events.len();
        self.playback = PlaybackEngine::new(events);
        self.scrubber = TimelineScrubber::new();
        self.file_loaded = true;
        self.status_message = Some(format!("Loaded {} vessel movements", count));
        info!("loaded {} vessel movements", count);
    }

    fn process_file_dialogs(&mut self) {
        if self.show_file_open_pending {
            if let Some(path) = FileDialogs::open_vessel_log() {
                self.load_file(path);
            }
            self.show_file_open_pending = false;
        }
    }

    /// Advance playback and fire any due cues
    fn update_playback(&mut self, now: Instant) {
        let fired = self.playback.update(now);
        for idx in fired {
            if let Some(player) = &self.cue_player {
                player.play(&self.playback.events()[idx]);
            }
        }
    }

    fn play_cue(&self, idx: usize) {
        if let (Some(player), Some(event)) = (&self.cue_player, self.playback.events().get(idx)) {
            player.play(event);
        }
    }

    fn apply_plot_action(&mut self, action: PlotAction) {
        let width = self.scatter.plot_width();
        match action {
            PlotAction::None => {}
            PlotAction::PlayCue(idx) => self.play_cue(idx),
            PlotAction::ScrubBegin(x) => self.scrubber.begin(&mut self.playback, x, width),
            PlotAction::ScrubDrag(x) => self.scrubber.drag(x, width),
            PlotAction::ScrubEnd(x) => {
                if let Some(scale) = self.scatter.time_scale() {
                    if let Some(date) =
                        self.scrubber.end(&mut self.playback, &scale, x, width)
                    {
                        self.status_message =
                            Some(format!("Scrubbed to {}", date.format("%Y-%m-%d")));
                    }
                }
            }
        }
    }

    fn apply_control_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::None => {}
            ControlAction::Play => self.playback.play(),
            ControlAction::Pause => self.playback.pause(),
            ControlAction::SetSpeed(v) => self.playback.set_speed(v),
        }
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Create event loop
    let event_loop = EventLoop::new().expect("Failed to create EventLoop");

    // Build the window and GL display using glutin-winit
    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(
            WindowBuilder::new()
                .with_title("Harbor-Viz - Vessel Traffic Visualization")
                .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 760.0)),
        ))
        .build(
            &event_loop,
            glutin::config::ConfigTemplateBuilder::new(),
            |mut iter| iter.next().unwrap(),
        )
        .expect("Failed to create window and display");

    let window = window.expect("Failed to create window");
    let gl_display = gl_config.display();

    let context = unsafe {
        gl_display.create_context(
            &gl_config,
            &glutin::context::ContextAttributesBuilder::new()
                .build(Some(window.raw_window_handle())),
        )
    }
    .expect("Failed to create GL context");

    let attrs = window.build_surface_attributes(
        glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new(),
    );

    let surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
        .expect("Failed to create surface");

    let context = context
        .make_current(&surface)
        .expect("Failed to make context current");

    let gl = unsafe {
        glow::Context::from_loader_function(|ptr| {
            gl_display.get_proc_address(&std::ffi::CString::new(ptr).unwrap()) as *const _
        })
    };

    // Set up imgui
    let mut imgui = Context::create();
    imgui.set_log_filename(None::<std::path::PathBuf>);

    // Save window layout next to the settings file
    let ini_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("harbor-viz")
        .join("layout.ini");

    if let Some(parent) = ini_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    imgui.set_ini_filename(Some(ini_path));
    imgui.io_mut().config_flags |= imgui::ConfigFlags::DOCKING_ENABLE;

    // Configure fonts
    let hidpi_factor = window.scale_factor();
    let font_size = (14.0 * hidpi_factor) as f32;
    imgui.fonts().add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            size_pixels: font_size,
            ..FontConfig::default()
        }),
    }]);
    imgui.io_mut().font_global_scale = (1.0 / hidpi_factor) as f32;

    // Set up platform and renderer
    let mut platform = WinitPlatform::init(&mut imgui);
    platform.attach_window(imgui.io_mut(), &window, HiDpiMode::Default);

    let mut renderer = imgui_glow_renderer::AutoRenderer::initialize(gl, &mut imgui)
        .expect("Failed to initialize renderer");

    // Second glow context for clearing (same underlying GL context)
    let gl_clear = unsafe {
        glow::Context::from_loader_function(|ptr| {
            gl_display.get_proc_address(&std::ffi::CString::new(ptr).unwrap()) as *const _
        })
    };

    // Create app state
    let mut state = AppState::new();
    let mut last_frame_time = Instant::now();
    let mut last_settings_save = Instant::now();

    // Optional log path on the command line
    if let Some(arg) = std::env::args().nth(1) {
        state.load_file(PathBuf::from(arg));
    }

    // Main loop
    event_loop
        .run(move |event, window_target| {
            match event {
                Event::NewEvents(_) => {
                    let now = Instant::now();
                    imgui.io_mut().update_delta_time(now - last_frame_time);
                    last_frame_time = now;
                }
                Event::AboutToWait => {
                    state.process_file_dialogs();
                    state.process_loading();

                    // Advance playback and fire due cues
                    state.update_playback(Instant::now());

                    // Save settings periodically (every 30 seconds)
                    if last_settings_save.elapsed().as_secs() >= 30 {
                        state.save_settings();
                        last_settings_save = Instant::now();
                    }

                    platform
                        .prepare_frame(imgui.io_mut(), &window)
                        .expect("Failed to prepare frame");
                    window.request_redraw();
                }
                Event::WindowEvent {
                    event: WindowEvent::RedrawRequested,
                    ..
                } => {
                    let ui = imgui.new_frame();

                    // Menu bar
                    ui.main_menu_bar(|| {
                        ui.menu("File", || {
                            if ui.menu_item("Open Vessel Log...") {
                                state.show_file_open_pending = true;
                            }
                            ui.separator();
                            if ui.menu_item("Exit") {
                                window_target.exit();
                            }
                        });

                        ui.menu("Playback", || {
                            if ui.menu_item("Play") {
                                state.playback.play();
                            }
                            if ui.menu_item("Pause") {
                                state.playback.pause();
                            }
                            ui.separator();
                            ui.text(format!("Speed: {:.1}x", state.playback.speed()));
                        });

                        ui.menu("View", || {
                            let _tok = if state.show_plot {
                                Some(ui.push_style_color(
                                    imgui::StyleColor::Text,
                                    [0.0, 1.0, 0.0, 1.0],
                                ))
                            } else {
                                None
                            };
                            if ui.menu_item("Vessel Traffic") {
                                state.show_plot = !state.show_plot;
                            }
                            drop(_tok);

                            let _tok = if state.show_controls {
                                Some(ui.push_style_color(
                                    imgui::StyleColor::Text,
                                    [0.0, 1.0, 0.0, 1.0],
                                ))
                            } else {
                                None
                            };
                            if ui.menu_item("Playback Controls") {
                                state.show_controls = !state.show_controls;
                            }
                            drop(_tok);
                        });
                    });

                    // Status bar
                    let window_size = window.inner_size();
                    ui.set_cursor_pos([
                        0.0,
                        window_size.height as f32 / hidpi_factor as f32 - 25.0,
                    ]);
                    ui.child_window("Status")
                        .size([window_size.width as f32 / hidpi_factor as f32, 25.0])
                        .build(|| {
                            if state.loading {
                                ui.text_colored(
                                    [1.0, 0.8, 0.3, 1.0],
                                    state
                                        .status_message
                                        .as_deref()
                                        .unwrap_or("Loading..."),
                                );
                            } else if let Some(ref msg) = state.status_message {
                                ui.text(msg);
                            } else if state.file_loaded {
                                ui.text(format!(
                                    "Vessels: {} | Position: {}",
                                    state.playback.len(),
                                    state.playback.position()
                                ));
                            } else {
                                ui.text(
                                    "Open a vessel log to begin (File > Open Vessel Log...)",
                                );
                            }
                        });

                    // Dockspace so the plot and controls can be rearranged
                    ui.dockspace_over_main_viewport();

                    if state.show_plot {
                        let action = state.scatter.render(
                            ui,
                            &state.playback,
                            &state.scrubber,
                            &mut state.show_plot,
                        );
                        state.apply_plot_action(action);
                    }

                    if state.show_controls {
                        let action = state.controls.render(
                            ui,
                            &state.playback,
                            &mut state.show_controls,
                        );
                        state.apply_control_action(action);
                    }

                    // Prepare and render
                    platform.prepare_render(ui, &window);
                    let draw_data = imgui.render();

                    unsafe {
                        gl_clear.clear_color(0.1, 0.1, 0.1, 1.0);
                        gl_clear.clear(glow::COLOR_BUFFER_BIT);
                    }

                    renderer.render(draw_data).expect("Rendering failed");

                    surface
                        .swap_buffers(&context)
                        .expect("Failed to swap buffers");
                }
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    ..
                } => {
                    state.save_settings();
                    window_target.exit();
                }
                _ => {}
            }

            platform.handle_event(imgui.io_mut(), &window, &event);
        })
        .expect("EventLoop error");
}
