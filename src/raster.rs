//! Rasterisation of simulation state into a layered dot grid.
//!
//! The grid is resolution independent: the braille canvas rasterises at two
//! dots per column and four per row, the PNG export at an arbitrary pixel scale.

use crate::particle::{Geometry, Particle};
use crate::settings::{RenderMode, RenderSettings};
use crate::simulation::{DlaSimulation, Edges};
use crate::spatial::polygon_contains;

/// What covers a dot. Later variants draw over earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Walker,
    Shape,
    Cluster,
    Line,
}

/// Dot grid where each dot remembers the topmost layer drawn on it
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    dots: Vec<Option<Layer>>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Layer> {
        if x < self.width && y < self.height {
            self.dots[y * self.width + x]
        } else {
            None
        }
    }

    /// Number of covered dots
    pub fn filled(&self) -> usize {
        self.dots.iter().filter(|d| d.is_some()).count()
    }

    /// Mark one dot; out-of-range coordinates are clipped
    pub fn plot(&mut self, x: i64, y: i64, layer: Layer) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let slot = &mut self.dots[y as usize * self.width + x as usize];
        *slot = (*slot).max(Some(layer));
    }

    /// Fill an axis-aligned ellipse. Always covers at least the centre dot.
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, layer: Layer) {
        self.plot(cx.floor() as i64, cy.floor() as i64, layer);
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let (x0, x1) = ((cx - rx).floor() as i64, (cx + rx).ceil() as i64);
        let (y0, y1) = ((cy - ry).floor() as i64, (cy + ry).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.plot(x, y, layer);
                }
            }
        }
    }

    /// Fill a polygon by sampling dot centres
    pub fn fill_polygon(&mut self, vertices: &[(f32, f32)], layer: Layer) {
        if vertices.len() < 3 {
            return;
        }
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(x, y) in vertices {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let mut hit = false;
        for y in min_y.floor() as i64..=max_y.ceil() as i64 {
            for x in min_x.floor() as i64..=max_x.ceil() as i64 {
                if polygon_contains(vertices, x as f32 + 0.5, y as f32 + 0.5) {
                    self.plot(x, y, layer);
                    hit = true;
                }
            }
        }
        // Sub-dot polygons still show up
        if !hit {
            let n = vertices.len() as f32;
            let cx = vertices.iter().map(|v| v.0).sum::<f32>() / n;
            let cy = vertices.iter().map(|v| v.1).sum::<f32>() / n;
            self.plot(cx.floor() as i64, cy.floor() as i64, layer);
        }
    }

    /// Bresenham line between two dot positions
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), layer: Layer) {
        let (mut x0, mut y0) = (from.0.floor() as i64, from.1.floor() as i64);
        let (x1, y1) = (to.0.floor() as i64, to.1.floor() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, layer);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Maps simulation coordinates into canvas dots
#[derive(Debug, Clone, Copy)]
struct Transform {
    left: f32,
    top: f32,
    sx: f32,
    sy: f32,
}

impl Transform {
    fn fit(edges: &Edges, width: usize, height: usize) -> Self {
        Self {
            left: edges.left,
            top: edges.top,
            sx: width as f32 / edges.width(),
            sy: height as f32 / edges.height(),
        }
    }

    fn apply(&self, (x, y): (f32, f32)) -> (f32, f32) {
        ((x - self.left) * self.sx, (y - self.top) * self.sy)
    }
}

/// Draw the visible simulation state into a `width` x `height` dot grid
/// stretched over the simulation edges
pub fn rasterize(
    simulation: &DlaSimulation,
    render: &RenderSettings,
    width: usize,
    height: usize,
) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    if width == 0 || height == 0 {
        return canvas;
    }
    let t = Transform::fit(&simulation.edges(), width, height);

    for shape in simulation.shapes() {
        let vertices: Vec<_> = shape.vertices().iter().map(|&v| t.apply(v)).collect();
        canvas.fill_polygon(&vertices, Layer::Shape);
    }

    match render.mode {
        RenderMode::Shapes => {
            for particle in simulation.particles() {
                let layer = if particle.is_stuck() {
                    Layer::Cluster
                } else if render.show_walkers {
                    Layer::Walker
                } else {
                    continue;
                };
                draw_particle(&mut canvas, &t, particle, layer);
            }
        }
        RenderMode::Lines => {
            if render.show_walkers {
                for particle in simulation.particles().iter().filter(|p| !p.is_stuck()) {
                    draw_particle(&mut canvas, &t, particle, Layer::Walker);
                }
            }
            for line in simulation.lines() {
                canvas.draw_line(t.apply(line.from), t.apply(line.to), Layer::Line);
            }
        }
    }

    canvas
}

fn draw_particle(canvas: &mut Canvas, t: &Transform, particle: &Particle, layer: Layer) {
    let (cx, cy) = t.apply(particle.position());
    match particle.geometry() {
        Geometry::Point => canvas.fill_ellipse(cx, cy, 0.5 * t.sx, 0.5 * t.sy, layer),
        Geometry::Circle { radius } => {
            canvas.fill_ellipse(cx, cy, radius * t.sx, radius * t.sy, layer)
        }
        Geometry::Polygon { .. } => {
            let vertices: Vec<_> = particle
                .world_vertices()
                .into_iter()
                .map(|v| t.apply(v))
                .collect();
            canvas.fill_polygon(&vertices, layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleSpec;
    use crate::simulation::tests::quiet_sim;

    #[test]
    fn test_plot_keeps_topmost_layer() {
        let mut canvas = Canvas::new(4, 4);
        canvas.plot(1, 1, Layer::Cluster);
        canvas.plot(1, 1, Layer::Walker);
        assert_eq!(canvas.get(1, 1), Some(Layer::Cluster));
        canvas.plot(1, 1, Layer::Line);
        assert_eq!(canvas.get(1, 1), Some(Layer::Line));

        canvas.plot(-1, 2, Layer::Line);
        canvas.plot(4, 0, Layer::Line);
        assert_eq!(canvas.filled(), 1);
    }

    #[test]
    fn test_line_covers_both_endpoints() {
        let mut canvas = Canvas::new(10, 10);
        canvas.draw_line((1.0, 1.0), (8.0, 5.0), Layer::Line);
        assert_eq!(canvas.get(1, 1), Some(Layer::Line));
        assert_eq!(canvas.get(8, 5), Some(Layer::Line));
        assert_eq!(canvas.filled(), 8);
    }

    #[test]
    fn test_fill_polygon_square() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_polygon(&[(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)], Layer::Shape);
        assert_eq!(canvas.filled(), 16);
        assert_eq!(canvas.get(2, 2), Some(Layer::Shape));
        assert_eq!(canvas.get(6, 6), None);
    }

    #[test]
    fn test_tiny_shapes_still_visible() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_ellipse(3.2, 3.7, 0.1, 0.1, Layer::Walker);
        canvas.fill_polygon(&[(7.1, 7.1), (7.2, 7.1), (7.15, 7.2)], Layer::Walker);
        assert_eq!(canvas.get(3, 3), Some(Layer::Walker));
        assert_eq!(canvas.get(7, 7), Some(Layer::Walker));
    }

    #[test]
    fn test_rasterize_respects_render_mode() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.capture_lines = true;
        sim.create_cluster_particle(ParticleSpec::at(50.0, 50.0).diameter(10.0));
        sim.create_walker(ParticleSpec::at(10.0, 10.0).diameter(4.0));

        let mut render = RenderSettings::default();
        let canvas = rasterize(&sim, &render, 100, 100);
        assert_eq!(canvas.get(50, 50), Some(Layer::Cluster));
        assert_eq!(canvas.get(10, 10), Some(Layer::Walker));

        render.show_walkers = false;
        let canvas = rasterize(&sim, &render, 100, 100);
        assert_eq!(canvas.get(10, 10), None);

        render.mode = RenderMode::Lines;
        let canvas = rasterize(&sim, &render, 100, 100);
        assert_eq!(canvas.filled(), 0);
    }

    #[test]
    fn test_rasterize_scales_to_canvas() {
        let mut sim = quiet_sim(100.0, 50.0);
        sim.create_shape(vec![(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (0.0, 50.0)]);
        let canvas = rasterize(&sim, &RenderSettings::default(), 20, 10);
        // Left half of the canvas
        assert_eq!(canvas.filled(), 100);
        assert_eq!(canvas.get(9, 9), Some(Layer::Shape));
        assert_eq!(canvas.get(10, 0), None);
    }
}
