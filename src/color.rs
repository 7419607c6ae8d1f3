use crate::settings::RenderSettings;
use serde::{Deserialize, Serialize};

/// Colour in HSL space with alpha.
/// Hue in degrees (0-360), saturation and lightness in percent (0-100), alpha 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Hsla {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l, a: 1.0 }
    }

    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a.clamp(0.0, 1.0);
        self
    }

    pub fn to_rgb(&self) -> [u8; 3] {
        let h = self.h.rem_euclid(360.0) / 60.0;
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        [to_byte(r), to_byte(g), to_byte(b)]
    }

    pub fn to_rgba(&self) -> [u8; 4] {
        let [r, g, b] = self.to_rgb();
        [r, g, b, (self.a.clamp(0.0, 1.0) * 255.0).round() as u8]
    }
}

/// Resolved RGBA colours for every drawable layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: [u8; 4],
    pub walker: [u8; 4],
    pub cluster: [u8; 4],
    pub shape: [u8; 4],
    pub line: [u8; 4],
}

impl Palette {
    pub fn from_settings(render: &RenderSettings) -> Self {
        if render.use_colors {
            Self {
                background: render.background.to_rgba(),
                walker: render.walker.to_rgba(),
                cluster: render.cluster.to_rgba(),
                shape: render.shape.to_rgba(),
                line: render.line.to_rgba(),
            }
        } else {
            let grey = |v: u8| [v, v, v, 255];
            Self {
                background: grey(255),
                walker: grey(230),
                cluster: grey(120),
                shape: grey(60),
                line: grey(0),
            }
        }
    }
}
