use dla_aggregation::color::Palette;
use dla_aggregation::raster::{self, Canvas, Layer};
use dla_aggregation::settings::RenderSettings;
use dla_aggregation::DlaSimulation;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Render the simulation to Braille characters
pub fn render_to_braille(
    simulation: &DlaSimulation,
    render: &RenderSettings,
    canvas_width: u16,
    canvas_height: u16,
) -> Vec<BrailleCell> {
    let dots = raster::rasterize(
        simulation,
        render,
        canvas_width as usize * 2,
        canvas_height as usize * 4,
    );
    let palette = render.use_colors.then(|| Palette::from_settings(render));
    pack_cells(&dots, canvas_width, canvas_height, palette.as_ref())
}

/// Fold a dot grid into braille cells; each cell takes the colour of its topmost layer
fn pack_cells(
    dots: &Canvas,
    canvas_width: u16,
    canvas_height: u16,
    palette: Option<&Palette>,
) -> Vec<BrailleCell> {
    let mut cells = Vec::new();

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let mut pattern: u8 = 0;
            let mut top: Option<Layer> = None;

            let base_bx = cx as usize * 2;
            let base_by = cy as usize * 4;

            for (dx, column) in BRAILLE_DOTS.iter().enumerate() {
                for (dy, bit) in column.iter().enumerate() {
                    if let Some(layer) = dots.get(base_bx + dx, base_by + dy) {
                        pattern |= *bit;
                        top = top.max(Some(layer));
                    }
                }
            }

            // Only emit cells that have at least one dot
            let Some(layer) = top else {
                continue;
            };
            let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
            let color = match palette {
                Some(palette) => layer_color(palette, layer),
                None => Color::White,
            };
            cells.push(BrailleCell {
                x: cx,
                y: cy,
                char: braille_char,
                color,
            });
        }
    }

    cells
}

fn layer_color(palette: &Palette, layer: Layer) -> Color {
    let [r, g, b, _] = match layer {
        Layer::Walker => palette.walker,
        Layer::Shape => palette.shape,
        Layer::Cluster => palette.cluster,
        Layer::Line => palette.line,
    };
    Color::Rgb(r, g, b)
}

/// Calculate simulation bounds for a given canvas size.
/// One simulation unit per braille dot.
pub fn calculate_simulation_size(canvas_width: u16, canvas_height: u16) -> (f32, f32) {
    let width = (canvas_width as usize * 2).max(64);
    let height = (canvas_height as usize * 4).max(64);
    (width as f32, height as f32)
}
