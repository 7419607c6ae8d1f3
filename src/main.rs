mod app;
mod braille;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::{App, Focus, EXPORT_SCALE};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dla_aggregation::export;
use dla_aggregation::presets::{Preset, PresetManager};
use dla_aggregation::{
    AppConfig, BiasAxis, ClusterPattern, DlaSimulation, RenderMode, ShapeKind, SpawnRegion,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dla-aggregation")]
#[command(about = "Diffusion-Limited Aggregation with biased walkers, in the terminal")]
struct Args {
    // === Sources ===
    /// Start from a named preset (see --list-presets)
    #[arg(long)]
    preset: Option<String>,

    /// Load settings from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// List built-in and user presets, then exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    // === Sticking ===
    /// Probability that a contact sticks (0.0-1.0)
    #[arg(short = 's', long)]
    stickiness: Option<f32>,

    /// Record a line for every sticking event
    #[arg(long)]
    lines: bool,

    // === Population ===
    /// Target number of walkers (100-20000)
    #[arg(short = 'w', long)]
    walkers: Option<usize>,

    /// Do not top the walker population back up
    #[arg(long = "no-replenish")]
    no_replenish: bool,

    /// Spawn region (random, edges, top, bottom, left, right, center)
    #[arg(long)]
    spawn: Option<String>,

    /// Walker shape (point, circle, polygon)
    #[arg(long)]
    shape: Option<String>,

    /// Walker diameter in simulation units (1-20)
    #[arg(long)]
    size: Option<f32>,

    /// Sides of polygon walkers (3-8)
    #[arg(long)]
    sides: Option<u8>,

    // === Motion ===
    /// Bias axis (none, equator, meridian)
    #[arg(short = 'b', long)]
    bias: Option<String>,

    /// Bias magnitude per tick (0.0-10.0)
    #[arg(long = "bias-force")]
    bias_force: Option<f32>,

    /// Steer every walker toward the centre instead of an axis
    #[arg(long = "target-bias")]
    target_bias: bool,

    // === Pruning ===
    /// Remove walkers older than this many ticks
    #[arg(long = "max-age")]
    max_age: Option<u32>,

    /// Remove walkers that wander further than this from their spawn point
    #[arg(long = "max-distance")]
    max_distance: Option<f32>,

    // === Seeding / visuals ===
    /// Initial cluster (wall, center, obstacle, none)
    #[arg(long)]
    cluster: Option<String>,

    /// Render mode (shapes, lines)
    #[arg(long)]
    render: Option<String>,

    /// Draw without the colour palette
    #[arg(long)]
    monochrome: bool,

    /// Simulation speed (ticks per frame, 1-50)
    #[arg(long)]
    speed: Option<usize>,

    // === Persistence ===
    /// Write the resolved settings to a JSON config file
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Save the resolved settings as a user preset with this name
    #[arg(long = "save-preset")]
    save_preset: Option<String>,

    // === Headless ===
    /// Run without a terminal UI
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value = "1000")]
    ticks: u64,

    /// Simulation width in headless mode
    #[arg(long, default_value = "400")]
    width: f32,

    /// Simulation height in headless mode
    #[arg(long, default_value = "300")]
    height: f32,

    /// Random seed for reproducible headless runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write a PNG here when finished (headless mode)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Write logs to this file in interactive mode (filter with RUST_LOG)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn parse_bias_axis(s: &str) -> BiasAxis {
    match s.to_lowercase().as_str() {
        "equator" | "horizontal" | "eq" => BiasAxis::Equator,
        "meridian" | "vertical" | "mer" => BiasAxis::Meridian,
        _ => BiasAxis::None,
    }
}

fn parse_spawn_region(s: &str) -> SpawnRegion {
    match s.to_lowercase().as_str() {
        "edges" | "edge" => SpawnRegion::Edges,
        "top" => SpawnRegion::Top,
        "bottom" => SpawnRegion::Bottom,
        "left" => SpawnRegion::Left,
        "right" => SpawnRegion::Right,
        "center" | "centre" => SpawnRegion::Center,
        _ => SpawnRegion::Random,
    }
}

fn parse_shape(s: &str) -> ShapeKind {
    match s.to_lowercase().as_str() {
        "point" | "pixel" => ShapeKind::Point,
        "polygon" | "poly" => ShapeKind::Polygon,
        _ => ShapeKind::Circle,
    }
}

fn parse_cluster_pattern(s: &str) -> ClusterPattern {
    match s.to_lowercase().as_str() {
        "center" | "centre" | "point" => ClusterPattern::Center,
        "obstacle" | "hexagon" => ClusterPattern::Obstacle,
        "none" | "empty" => ClusterPattern::None,
        _ => ClusterPattern::Wall,
    }
}

fn parse_render_mode(s: &str) -> RenderMode {
    match s.to_lowercase().as_str() {
        "lines" | "line" | "edges" => RenderMode::Lines,
        _ => RenderMode::Shapes,
    }
}

/// Config file, then preset, then explicit flags
fn resolve_config(args: &Args, presets: &PresetManager) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(name) = &args.preset {
        let preset = presets.find(name).ok_or_else(|| {
            anyhow!(
                "unknown preset '{}' (available: {})",
                name,
                presets.preset_names().join(", ")
            )
        })?;
        config.settings = preset.settings.clone();
        config.render = preset.render.clone();
    }

    let settings = &mut config.settings;
    if let Some(p) = args.stickiness {
        settings.stick_probability = p;
    }
    if args.lines {
        settings.capture_lines = true;
    }
    if let Some(n) = args.walkers {
        settings.max_walkers = n;
    }
    if args.no_replenish {
        settings.replenish_walkers = false;
    }
    if let Some(s) = &args.spawn {
        settings.spawn_region = parse_spawn_region(s);
    }
    if let Some(s) = &args.shape {
        settings.walker_shape = parse_shape(s);
    }
    if let Some(size) = args.size {
        settings.particle_size = size;
    }
    if let Some(sides) = args.sides {
        settings.polygon_sides = sides;
    }
    if let Some(s) = &args.bias {
        settings.bias_axis = parse_bias_axis(s);
    }
    if let Some(force) = args.bias_force {
        settings.bias_force = force;
    }
    if args.target_bias {
        settings.use_per_particle_bias = true;
    }
    if let Some(age) = args.max_age {
        settings.prune_by_age = true;
        settings.max_age = age;
    }
    if let Some(distance) = args.max_distance {
        settings.prune_by_distance = true;
        settings.max_wander_distance = distance;
    }
    if let Some(s) = &args.cluster {
        settings.cluster_pattern = parse_cluster_pattern(s);
    }
    settings.sanitize();

    if let Some(s) = &args.render {
        config.render.mode = parse_render_mode(s);
    }
    if args.monochrome {
        config.render.use_colors = false;
    }
    if let Some(speed) = args.speed {
        config.steps_per_frame = speed.clamp(1, 50);
    }

    Ok(config)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Interactive mode owns the terminal, so logs only go to an explicit file
fn init_tracing(args: &Args) -> Result<()> {
    if args.headless {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .try_init();
    } else if let Some(path) = &args.log_file {
        let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let mut presets = PresetManager::new();
    if args.list_presets {
        for preset in presets.all_presets() {
            println!("{:<14} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    let config = resolve_config(&args, &presets)?;

    if let Some(path) = &args.save_config {
        config
            .save_to_file(path)
            .with_context(|| format!("saving config {}", path.display()))?;
        info!(path = %path.display(), "Saved config");
    }
    if let Some(name) = &args.save_preset {
        let preset = Preset::new(name.clone(), "Saved from the command line", config.settings.clone())
            .with_render(config.render.clone());
        let path = presets.save_preset(preset).context("saving preset")?;
        info!(path = %path.display(), "Saved preset");
    }

    if args.headless {
        return run_headless(&args, config);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let frame_rect = ratatui::layout::Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    };
    let (canvas_width, canvas_height) = ui::get_canvas_size(frame_rect, false);
    let mut app = App::new(canvas_width, canvas_height, config);

    // Run the app
    let res = run_app(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_headless(args: &Args, config: AppConfig) -> Result<()> {
    let mut simulation = DlaSimulation::with_settings(args.width, args.height, config.settings);
    if let Some(seed) = args.seed {
        simulation = simulation.with_rng_seed(seed);
    }
    simulation.reset();

    for tick in 1..=args.ticks {
        simulation.tick();
        if tick % 100 == 0 {
            info!(
                tick,
                walkers = simulation.num_walkers(),
                cluster = simulation.cluster_size(),
                lines = simulation.lines().len(),
                "Progress"
            );
        }
    }

    if let Some(path) = &args.export {
        export::export_png(&simulation, &config.render, path, EXPORT_SCALE)
            .with_context(|| format!("exporting {}", path.display()))?;
    }

    println!(
        "ticks={} cluster={} walkers={} lines={}",
        simulation.ticks(),
        simulation.cluster_size(),
        simulation.num_walkers(),
        simulation.lines().len()
    );
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    match key.code {
                        // System controls
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                        KeyCode::Char('e') | KeyCode::Char('E') => app.export(),
                        KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_render_mode(),
                        KeyCode::Char('b') | KeyCode::Char('B') => app.cycle_bias_axis(),
                        KeyCode::Char('v') | KeyCode::Char('V') => {
                            app.toggle_fullscreen();
                            let size = terminal.size()?;
                            let (canvas_width, canvas_height) = ui::get_canvas_size(
                                ratatui::layout::Rect {
                                    x: 0,
                                    y: 0,
                                    width: size.width,
                                    height: size.height,
                                },
                                app.fullscreen_mode,
                            );
                            app.resize(canvas_width, canvas_height);
                        }
                        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                            app.toggle_help()
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => app.increase_speed(),
                        KeyCode::Char('-') | KeyCode::Char('_') => app.decrease_speed(),

                        // Navigation
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => {
                            if app.show_help {
                                app.scroll_help_up();
                            } else if app.focus.is_param() {
                                app.adjust_focused_up();
                            } else {
                                app.scroll_controls_up();
                            }
                        }
                        KeyCode::Down => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            } else if app.focus.is_param() {
                                app.adjust_focused_down();
                            } else {
                                let term_size = terminal.size().unwrap_or_default();
                                let visible = ui::get_controls_visible_lines(term_size.height);
                                app.scroll_controls_down(
                                    ui::CONTROLS_CONTENT_LINES.saturating_sub(visible),
                                );
                            }
                        }
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Resize(width, height) => {
                    let (canvas_width, canvas_height) = ui::get_canvas_size(
                        ratatui::layout::Rect {
                            x: 0,
                            y: 0,
                            width,
                            height,
                        },
                        app.fullscreen_mode,
                    );
                    app.resize(canvas_width, canvas_height);
                }
                _ => {}
            }
        }

        app.tick();
    }
}
