use crate::braille;
use dla_aggregation::export;
use dla_aggregation::{AppConfig, DlaSimulation, RenderSettings};
use std::path::PathBuf;
use tracing::{info, warn};

/// Pixels per simulation unit in PNG exports
pub const EXPORT_SCALE: f32 = 4.0;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Stickiness,
    Walkers,
    Size,
    Shape,
    Bias,
    Force,
    Target,
    Spawn,
    Cluster,
    Replenish,
    PruneAge,
    MaxAge,
    PruneDistance,
    MaxDistance,
    Lines,
    Render,
    Speed,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in sidebar order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Stickiness,
            Focus::Stickiness => Focus::Walkers,
            Focus::Walkers => Focus::Size,
            Focus::Size => Focus::Shape,
            Focus::Shape => Focus::Bias,
            Focus::Bias => Focus::Force,
            Focus::Force => Focus::Target,
            Focus::Target => Focus::Spawn,
            Focus::Spawn => Focus::Cluster,
            Focus::Cluster => Focus::Replenish,
            Focus::Replenish => Focus::PruneAge,
            Focus::PruneAge => Focus::MaxAge,
            Focus::MaxAge => Focus::PruneDistance,
            Focus::PruneDistance => Focus::MaxDistance,
            Focus::MaxDistance => Focus::Lines,
            Focus::Lines => Focus::Render,
            Focus::Render => Focus::Speed,
            Focus::Speed => Focus::Stickiness, // Loop back
        }
    }

    /// Shift+Tab cycles through parameters in reverse order
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Speed,
            Focus::Stickiness => Focus::Speed, // Loop back
            Focus::Walkers => Focus::Stickiness,
            Focus::Size => Focus::Walkers,
            Focus::Shape => Focus::Size,
            Focus::Bias => Focus::Shape,
            Focus::Force => Focus::Bias,
            Focus::Target => Focus::Force,
            Focus::Spawn => Focus::Target,
            Focus::Cluster => Focus::Spawn,
            Focus::Replenish => Focus::Cluster,
            Focus::PruneAge => Focus::Replenish,
            Focus::MaxAge => Focus::PruneAge,
            Focus::PruneDistance => Focus::MaxAge,
            Focus::MaxDistance => Focus::PruneDistance,
            Focus::Lines => Focus::MaxDistance,
            Focus::Render => Focus::Lines,
            Focus::Speed => Focus::Render,
        }
    }

    /// Get the line index in the parameters box for this focus
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::Stickiness => 0,
            Focus::Walkers => 1,
            Focus::Size => 2,
            Focus::Shape => 3,
            Focus::Bias => 4,
            Focus::Force => 5,
            Focus::Target => 6,
            Focus::Spawn => 7,
            Focus::Cluster => 8,
            Focus::Replenish => 9,
            Focus::PruneAge => 10,
            Focus::MaxAge => 11,
            Focus::PruneDistance => 12,
            Focus::MaxDistance => 13,
            Focus::Lines => 14,
            Focus::Render => 15,
            Focus::Speed => 16,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

/// Main application state
pub struct App {
    pub simulation: DlaSimulation,
    pub render: RenderSettings,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub steps_per_frame: usize,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// One-line feedback shown in the status box (e.g. export result)
    pub status_message: Option<String>,
    pub export_dir: PathBuf,
}

impl App {
    pub fn new(canvas_width: u16, canvas_height: u16, config: AppConfig) -> Self {
        let (sim_width, sim_height) = braille::calculate_simulation_size(canvas_width, canvas_height);
        let mut simulation = DlaSimulation::with_settings(sim_width, sim_height, config.settings);
        simulation.reset();
        Self {
            simulation,
            render: config.render,
            focus: Focus::Controls,
            fullscreen_mode: false,
            steps_per_frame: config.steps_per_frame.clamp(1, 50),
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            status_message: None,
            export_dir: export::default_export_dir(),
        }
    }

    /// Snapshot of the current settings for saving
    pub fn config(&self) -> AppConfig {
        AppConfig {
            settings: self.simulation.settings.clone(),
            render: self.render.clone(),
            steps_per_frame: self.steps_per_frame,
            ..AppConfig::default()
        }
    }

    /// Run simulation steps for current frame
    pub fn tick(&mut self) {
        if !self.simulation.paused {
            for _ in 0..self.steps_per_frame {
                self.simulation.tick();
            }
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        let settings = &mut self.simulation.settings;
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Stickiness => settings.adjust_stick_probability(0.05),
            Focus::Walkers => settings.adjust_max_walkers(100),
            Focus::Size => settings.adjust_particle_size(1.0),
            Focus::Shape => settings.walker_shape = settings.walker_shape.next(),
            Focus::Bias => settings.bias_axis = settings.bias_axis.next(),
            Focus::Force => settings.adjust_bias_force(0.1),
            Focus::Target => settings.use_per_particle_bias = !settings.use_per_particle_bias,
            Focus::Spawn => settings.spawn_region = settings.spawn_region.next(),
            Focus::Cluster => {
                settings.cluster_pattern = settings.cluster_pattern.next();
                self.reset();
            }
            Focus::Replenish => settings.replenish_walkers = !settings.replenish_walkers,
            Focus::PruneAge => settings.prune_by_age = !settings.prune_by_age,
            Focus::MaxAge => settings.adjust_max_age(100),
            Focus::PruneDistance => settings.prune_by_distance = !settings.prune_by_distance,
            Focus::MaxDistance => settings.adjust_max_wander_distance(10.0),
            Focus::Lines => settings.capture_lines = !settings.capture_lines,
            Focus::Render => self.toggle_render_mode(),
            Focus::Speed => self.increase_speed(),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        let settings = &mut self.simulation.settings;
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Stickiness => settings.adjust_stick_probability(-0.05),
            Focus::Walkers => settings.adjust_max_walkers(-100),
            Focus::Size => settings.adjust_particle_size(-1.0),
            Focus::Shape => settings.walker_shape = settings.walker_shape.prev(),
            Focus::Bias => settings.bias_axis = settings.bias_axis.prev(),
            Focus::Force => settings.adjust_bias_force(-0.1),
            Focus::Target => settings.use_per_particle_bias = !settings.use_per_particle_bias,
            Focus::Spawn => settings.spawn_region = settings.spawn_region.prev(),
            Focus::Cluster => {
                settings.cluster_pattern = settings.cluster_pattern.prev();
                self.reset();
            }
            Focus::Replenish => settings.replenish_walkers = !settings.replenish_walkers,
            Focus::PruneAge => settings.prune_by_age = !settings.prune_by_age,
            Focus::MaxAge => settings.adjust_max_age(-100),
            Focus::PruneDistance => settings.prune_by_distance = !settings.prune_by_distance,
            Focus::MaxDistance => settings.adjust_max_wander_distance(-10.0),
            Focus::Lines => settings.capture_lines = !settings.capture_lines,
            Focus::Render => self.toggle_render_mode(),
            Focus::Speed => self.decrease_speed(),
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.simulation.toggle_pause();
    }

    /// Reset simulation
    pub fn reset(&mut self) {
        self.simulation.reset();
        self.status_message = None;
    }

    /// Cycle the bias axis and reseed so the wall follows it
    pub fn cycle_bias_axis(&mut self) {
        let settings = &mut self.simulation.settings;
        settings.bias_axis = settings.bias_axis.next();
        self.reset();
    }

    pub fn toggle_render_mode(&mut self) {
        self.render.mode = self.render.mode.toggle();
    }

    /// Write the current view to a timestamped PNG
    pub fn export(&mut self) {
        let path = export::default_export_path(&self.export_dir);
        match export::export_png(&self.simulation, &self.render, &path, EXPORT_SCALE) {
            Ok(path) => {
                info!(path = %path.display(), "Export complete");
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(err) => {
                warn!(%err, "Export failed");
                self.status_message = Some(format!("Export failed: {}", err));
            }
        }
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Resize simulation bounds to match new canvas size
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        let (sim_width, sim_height) = braille::calculate_simulation_size(canvas_width, canvas_height);
        self.simulation.resize(sim_width, sim_height);
    }

    /// Increase simulation speed
    pub fn increase_speed(&mut self) {
        self.steps_per_frame = (self.steps_per_frame + 1).min(50);
    }

    /// Decrease simulation speed
    pub fn decrease_speed(&mut self) {
        self.steps_per_frame = self.steps_per_frame.saturating_sub(1).max(1);
    }
}
