use crate::app::{App, Focus};
use crate::braille;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 50;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 12;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (frame_area.width.saturating_sub(2), frame_area.height.saturating_sub(2))
    } else {
        let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
        let canvas_height = frame_area.height.saturating_sub(2);
        (canvas_width, canvas_height)
    }
}

/// Visible lines inside the controls box for a given terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    terminal_height
        .saturating_sub(STATUS_HEIGHT + PARAMS_HEIGHT)
        .saturating_sub(2)
}

const STATUS_HEIGHT: u16 = 9;
const PARAMS_HEIGHT: u16 = 12;

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(PARAMS_HEIGHT),
            Constraint::Min(6), // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" DLA Aggregation ");
    let sim = &app.simulation;

    let (status_text, status_color) = if sim.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else {
        ("RUNNING", BORDER_COLOR)
    };

    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<8}", label), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let mut content = vec![
        stat("Walkers", format!("{}", sim.num_walkers())),
        stat("Cluster", format!("{}", sim.cluster_size())),
        stat("Lines", format!("{}", sim.lines().len())),
        stat("Shapes", format!("{}", sim.shapes().len())),
        stat("Tick", format!("{}", sim.ticks())),
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
    ];
    if let Some(message) = &app.status_message {
        content.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        )));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn on_off(value: bool) -> String {
    let label = if value { "on" } else { "off" };
    label.to_string()
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.simulation.settings;
    let focus = app.focus;

    let content = vec![
        make_line(
            "Sticky",
            format!("{:.2}", settings.stick_probability),
            focus == Focus::Stickiness,
        ),
        make_line(
            "Walkers",
            format!("{}", settings.max_walkers),
            focus == Focus::Walkers,
        ),
        make_line(
            "Size",
            format!("{:.0}", settings.particle_size),
            focus == Focus::Size,
        ),
        make_line(
            "Shape",
            settings.walker_shape.name().to_string(),
            focus == Focus::Shape,
        ),
        make_line("Bias", settings.bias_axis.name().to_string(), focus == Focus::Bias),
        make_line(
            "Force",
            format!("{:.1}", settings.bias_force),
            focus == Focus::Force,
        ),
        make_line(
            "Target",
            on_off(settings.use_per_particle_bias),
            focus == Focus::Target,
        ),
        make_line(
            "Spawn",
            settings.spawn_region.name().to_string(),
            focus == Focus::Spawn,
        ),
        make_line(
            "Cluster",
            settings.cluster_pattern.name().to_string(),
            focus == Focus::Cluster,
        ),
        make_line(
            "Refill",
            on_off(settings.replenish_walkers),
            focus == Focus::Replenish,
        ),
        make_line(
            "Age cut",
            on_off(settings.prune_by_age),
            focus == Focus::PruneAge,
        ),
        make_line(
            "Max age",
            format!("{}", settings.max_age),
            focus == Focus::MaxAge,
        ),
        make_line(
            "Dist cut",
            on_off(settings.prune_by_distance),
            focus == Focus::PruneDistance,
        ),
        make_line(
            "Max dist",
            format!("{:.0}", settings.max_wander_distance),
            focus == Focus::MaxDistance,
        ),
        make_line("Lines", on_off(settings.capture_lines), focus == Focus::Lines),
        make_line(
            "Render",
            app.render.mode.name().to_string(),
            focus == Focus::Render,
        ),
        make_line(
            "Speed",
            format!("{}", app.steps_per_frame),
            focus == Focus::Speed,
        ),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0
    } else if focus_line >= visible_height {
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Space", "pause/resume".to_string()),
        make_control("H/?", "help".to_string()),
        make_control("R", "reset".to_string()),
        make_control("E", "export PNG".to_string()),
        make_control("L", format!("render: {}", app.render.mode.name())),
        make_control("B", format!("bias: {}", app.simulation.settings.bias_axis.name())),
        make_control("V", "fullscreen".to_string()),
        make_control("Tab", "next param".to_string()),
        make_control("↑/↓", "adjust param".to_string()),
        make_control("+/-", "speed".to_string()),
        make_control("Esc", "controls".to_string()),
        make_control("Q", "quit".to_string()),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let paragraph = Paragraph::new(content)
        .block(styled_block(title))
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_to_braille(&app.simulation, &app.render, inner.width, inner.height);

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color));
            frame.render_widget(Paragraph::new(Line::from(span)), cell_rect);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(40);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(HIGHLIGHT_COLOR)));
    let item = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(TEXT_COLOR)));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "DIFFUSION-LIMITED AGGREGATION",
            Style::default().fg(BORDER_COLOR),
        )),
        Line::from(""),
        Line::from("Walkers drift randomly until they touch the cluster, then stick with the chosen probability. Each contact consumes one walker from the population count."),
        Line::from(""),
        heading("MOTION:"),
        item("Bias"),
        Line::from("None (pure Brownian), Equator (pull toward the horizontal centre line), Meridian (pull toward the vertical centre line)"),
        item("Target"),
        Line::from("Each walker steers toward the centre instead of an axis"),
        Line::from(""),
        heading("CLUSTER PATTERNS:"),
        Line::from("Wall (follows the bias axis), Center (single seed), Obstacle (static hexagon that captures every touch), None"),
        Line::from(""),
        heading("LIFECYCLE:"),
        item("Refill"),
        Line::from("Top the walker count back up every tick"),
        item("Age cut / Dist cut"),
        Line::from("Remove walkers older than Max age or further than Max dist from where they spawned"),
        Line::from(""),
        heading("RENDERING:"),
        Line::from("Shapes draws walkers and cluster bodies; Lines draws the captured aggregation edges (enable Lines capture first)"),
        Line::from(""),
        heading("BASIC CONTROLS:"),
        Line::from("Space=Pause, R=Reset, E=Export PNG, L=Render mode, B=Bias, V=Fullscreen, Tab/Arrows=Adjust, +/-=Speed, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
