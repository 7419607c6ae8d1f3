use crate::spatial::BodyId;
use serde::{Deserialize, Serialize};

/// Shape kind of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Lattice-aligned point; collides by adjacency
    Point,
    #[default]
    Circle,
    Polygon,
}

impl ShapeKind {
    pub fn name(&self) -> &str {
        match self {
            ShapeKind::Point => "Point",
            ShapeKind::Circle => "Circle",
            ShapeKind::Polygon => "Polygon",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ShapeKind::Point => ShapeKind::Circle,
            ShapeKind::Circle => ShapeKind::Polygon,
            ShapeKind::Polygon => ShapeKind::Point,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ShapeKind::Point => ShapeKind::Polygon,
            ShapeKind::Circle => ShapeKind::Point,
            ShapeKind::Polygon => ShapeKind::Circle,
        }
    }
}

/// Shape-specific geometry, fixed when the particle is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point,
    Circle {
        radius: f32,
    },
    /// Vertices are relative to the particle position, before rotation
    Polygon {
        vertices: Vec<(f32, f32)>,
        rotation: f32,
    },
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Point => ShapeKind::Point,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
        }
    }
}

/// Vertices of a regular polygon inscribed in a circle of `diameter`
pub fn regular_polygon(sides: u8, diameter: f32) -> Vec<(f32, f32)> {
    let sides = sides.max(3);
    let radius = diameter / 2.0;
    (0..sides)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / sides as f32;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Request to create a particle. Missing coordinates make the request a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSpec {
    pub x: Option<f32>,
    pub y: Option<f32>,
    /// Defaults to [`ShapeKind::Circle`]
    pub kind: Option<ShapeKind>,
    /// Circle diameter, or polygon circumscribed diameter when no vertices are given
    pub diameter: Option<f32>,
    /// Polygon rotation in radians
    pub rotation: Option<f32>,
    pub vertices: Option<Vec<(f32, f32)>>,
    pub sides: Option<u8>,
    pub stuck: bool,
    pub bias_target: Option<(f32, f32)>,
}

impl ParticleSpec {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: ShapeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn diameter(mut self, diameter: f32) -> Self {
        self.diameter = Some(diameter);
        self
    }

    pub fn rotation(mut self, rotation: f32) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn vertices(mut self, vertices: Vec<(f32, f32)>) -> Self {
        self.kind = Some(ShapeKind::Polygon);
        self.vertices = Some(vertices);
        self
    }

    pub fn bias_target(mut self, x: f32, y: f32) -> Self {
        self.bias_target = Some((x, y));
        self
    }

    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    /// Coordinates, if both are present and finite
    pub fn position(&self) -> Option<(f32, f32)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        }
    }

    /// Resolve the requested geometry, filling gaps from the defaults
    pub fn geometry(&self, default_diameter: f32, default_sides: u8) -> Geometry {
        let diameter = self
            .diameter
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(default_diameter);
        match self.kind.unwrap_or_default() {
            ShapeKind::Point => Geometry::Point,
            ShapeKind::Circle => Geometry::Circle {
                radius: diameter / 2.0,
            },
            ShapeKind::Polygon => Geometry::Polygon {
                vertices: self
                    .vertices
                    .clone()
                    .filter(|v| v.len() >= 3)
                    .unwrap_or_else(|| {
                        regular_polygon(self.sides.unwrap_or(default_sides), diameter)
                    }),
                rotation: self.rotation.unwrap_or(0.0),
            },
        }
    }
}

/// A walker or cluster member
#[derive(Debug, Clone)]
pub struct Particle {
    pub(crate) body: BodyId,
    pub(crate) geometry: Geometry,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) origin: (f32, f32),
    pub(crate) age: u32,
    pub(crate) stuck: bool,
    pub(crate) bias_target: Option<(f32, f32)>,
}

impl Particle {
    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Position at creation
    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    /// Ticks survived while free
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck
    }

    pub fn bias_target(&self) -> Option<(f32, f32)> {
        self.bias_target
    }

    /// Straight-line distance from the creation point
    pub fn wander_distance(&self) -> f32 {
        let dx = self.x - self.origin.0;
        let dy = self.y - self.origin.1;
        (dx * dx + dy * dy).sqrt()
    }

    /// World-space polygon vertices (empty for points and circles)
    pub fn world_vertices(&self) -> Vec<(f32, f32)> {
        match &self.geometry {
            Geometry::Polygon { vertices, rotation } => {
                let (sin, cos) = rotation.sin_cos();
                vertices
                    .iter()
                    .map(|&(vx, vy)| (self.x + vx * cos - vy * sin, self.y + vx * sin + vy * cos))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Immovable convex obstacle; walkers touching it always stick
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) body: BodyId,
    pub(crate) vertices: Vec<(f32, f32)>,
}

impl Shape {
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// World-space vertices
    pub fn vertices(&self) -> &[(f32, f32)] {
        &self.vertices
    }
}

/// Aggregation edge captured when a walker sticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Walker position at the moment of sticking
    pub from: (f32, f32),
    /// Cluster particle it joined
    pub to: (f32, f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_requires_finite_coordinates() {
        assert_eq!(ParticleSpec::at(1.0, 2.0).position(), Some((1.0, 2.0)));
        assert_eq!(ParticleSpec::default().position(), None);
        let half = ParticleSpec {
            x: Some(3.0),
            ..ParticleSpec::default()
        };
        assert_eq!(half.position(), None);
        assert_eq!(ParticleSpec::at(f32::NAN, 0.0).position(), None);
    }

    #[test]
    fn test_spec_geometry_defaults_to_circle() {
        let geometry = ParticleSpec::at(0.0, 0.0).geometry(4.0, 3);
        assert_eq!(geometry, Geometry::Circle { radius: 2.0 });

        let sized = ParticleSpec::at(0.0, 0.0).diameter(10.0).geometry(4.0, 3);
        assert_eq!(sized, Geometry::Circle { radius: 5.0 });
    }

    #[test]
    fn test_spec_polygon_falls_back_to_regular_shape() {
        let geometry = ParticleSpec::at(0.0, 0.0)
            .kind(ShapeKind::Polygon)
            .rotation(0.5)
            .geometry(2.0, 5);
        match geometry {
            Geometry::Polygon { vertices, rotation } => {
                assert_eq!(vertices.len(), 5);
                assert_eq!(rotation, 0.5);
            }
            other => panic!("expected polygon, got {:?}", other),
        }

        let degenerate = ParticleSpec::at(0.0, 0.0)
            .vertices(vec![(0.0, 0.0), (1.0, 0.0)])
            .geometry(2.0, 4);
        assert!(matches!(degenerate, Geometry::Polygon { ref vertices, .. } if vertices.len() == 4));
    }

    #[test]
    fn test_regular_polygon_is_inscribed() {
        let vertices = regular_polygon(6, 10.0);
        assert_eq!(vertices.len(), 6);
        for (x, y) in vertices {
            assert!(((x * x + y * y).sqrt() - 5.0).abs() < 1e-4);
        }
        assert_eq!(regular_polygon(1, 2.0).len(), 3);
    }

    #[test]
    fn test_shape_kind_cycles() {
        let kind = ShapeKind::Point;
        assert_eq!(kind.next().next().next(), kind);
        assert_eq!(kind.next().prev(), kind);
        assert_eq!(ShapeKind::default(), ShapeKind::Circle);
    }
}
