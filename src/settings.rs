use crate::color::Hsla;
use crate::particle::ShapeKind;
use serde::{Deserialize, Serialize};

/// Spawn region - where new walkers appear
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SpawnRegion {
    /// Uniformly anywhere within the edges
    #[default]
    Random,
    /// On any of the four edges
    Edges,
    Top,
    Bottom,
    Left,
    Right,
    /// Near the middle of the edges
    Center,
}

impl SpawnRegion {
    pub fn name(&self) -> &str {
        match self {
            SpawnRegion::Random => "Random",
            SpawnRegion::Edges => "Edges",
            SpawnRegion::Top => "Top",
            SpawnRegion::Bottom => "Bottom",
            SpawnRegion::Left => "Left",
            SpawnRegion::Right => "Right",
            SpawnRegion::Center => "Center",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SpawnRegion::Random => SpawnRegion::Edges,
            SpawnRegion::Edges => SpawnRegion::Top,
            SpawnRegion::Top => SpawnRegion::Bottom,
            SpawnRegion::Bottom => SpawnRegion::Left,
            SpawnRegion::Left => SpawnRegion::Right,
            SpawnRegion::Right => SpawnRegion::Center,
            SpawnRegion::Center => SpawnRegion::Random,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SpawnRegion::Random => SpawnRegion::Center,
            SpawnRegion::Edges => SpawnRegion::Random,
            SpawnRegion::Top => SpawnRegion::Edges,
            SpawnRegion::Bottom => SpawnRegion::Top,
            SpawnRegion::Left => SpawnRegion::Bottom,
            SpawnRegion::Right => SpawnRegion::Left,
            SpawnRegion::Center => SpawnRegion::Right,
        }
    }
}

/// Uniform directional bias applied to every walker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BiasAxis {
    /// Pure Brownian motion
    #[default]
    None,
    /// Pull toward the horizontal centre line (acts on y)
    Equator,
    /// Pull toward the vertical centre line (acts on x)
    Meridian,
}

impl BiasAxis {
    pub fn name(&self) -> &str {
        match self {
            BiasAxis::None => "None",
            BiasAxis::Equator => "Equator",
            BiasAxis::Meridian => "Meridian",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            BiasAxis::None => BiasAxis::Equator,
            BiasAxis::Equator => BiasAxis::Meridian,
            BiasAxis::Meridian => BiasAxis::None,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            BiasAxis::None => BiasAxis::Meridian,
            BiasAxis::Equator => BiasAxis::None,
            BiasAxis::Meridian => BiasAxis::Equator,
        }
    }
}

/// Stationary layout created on reset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ClusterPattern {
    /// Straight wall along the bias axis centre line
    #[default]
    Wall,
    /// Single cluster particle in the middle
    Center,
    /// Static hexagonal obstacle in the middle
    Obstacle,
    None,
}

impl ClusterPattern {
    pub fn name(&self) -> &str {
        match self {
            ClusterPattern::Wall => "Wall",
            ClusterPattern::Center => "Center",
            ClusterPattern::Obstacle => "Obstacle",
            ClusterPattern::None => "None",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ClusterPattern::Wall => ClusterPattern::Center,
            ClusterPattern::Center => ClusterPattern::Obstacle,
            ClusterPattern::Obstacle => ClusterPattern::None,
            ClusterPattern::None => ClusterPattern::Wall,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ClusterPattern::Wall => ClusterPattern::None,
            ClusterPattern::Center => ClusterPattern::Wall,
            ClusterPattern::Obstacle => ClusterPattern::Center,
            ClusterPattern::None => ClusterPattern::Obstacle,
        }
    }
}

/// What the renderer draws; never affects the simulation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Particle bodies
    #[default]
    Shapes,
    /// Captured aggregation edges
    Lines,
}

impl RenderMode {
    pub fn name(&self) -> &str {
        match self {
            RenderMode::Shapes => "Shapes",
            RenderMode::Lines => "Lines",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            RenderMode::Shapes => RenderMode::Lines,
            RenderMode::Lines => RenderMode::Shapes,
        }
    }
}

/// All simulation settings consolidated into one struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    // === Sticking ===
    /// Chance that a qualifying contact turns a walker into cluster (0.0-1.0)
    pub stick_probability: f32,
    /// Record a line for every accepted contact
    pub capture_lines: bool,

    // === Population ===
    /// Target number of walkers (100-20000)
    pub max_walkers: usize,
    /// Top walkers back up to `max_walkers` every tick
    pub replenish_walkers: bool,
    /// Where new walkers appear
    pub spawn_region: SpawnRegion,
    /// Shape of newly spawned walkers
    pub walker_shape: ShapeKind,
    /// Circle diameter / polygon size in simulation units (1.0-20.0)
    pub particle_size: f32,
    /// Sides of polygon walkers (3-8)
    pub polygon_sides: u8,

    // === Motion ===
    pub bias_axis: BiasAxis,
    /// Bias magnitude added per tick (0.0-10.0)
    pub bias_force: f32,
    /// Steer walkers toward their own target instead of the axis
    pub use_per_particle_bias: bool,

    // === Pruning ===
    pub prune_by_age: bool,
    /// Ticks a walker may survive (10-100000)
    pub max_age: u32,
    pub prune_by_distance: bool,
    /// Distance from origin a walker may wander (1.0-5000.0)
    pub max_wander_distance: f32,

    // === Seeding ===
    pub cluster_pattern: ClusterPattern,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            stick_probability: 1.0,
            capture_lines: false,

            max_walkers: 2000,
            replenish_walkers: true,
            spawn_region: SpawnRegion::default(),
            walker_shape: ShapeKind::default(),
            particle_size: 2.0,
            polygon_sides: 3,

            bias_axis: BiasAxis::default(),
            bias_force: 1.0,
            use_per_particle_bias: false,

            prune_by_age: false,
            max_age: 2000,
            prune_by_distance: false,
            max_wander_distance: 100.0,

            cluster_pattern: ClusterPattern::default(),
        }
    }
}

impl SimulationSettings {
    /// Adjust stick probability within bounds
    pub fn adjust_stick_probability(&mut self, delta: f32) {
        self.stick_probability = (self.stick_probability + delta).clamp(0.0, 1.0);
    }

    /// Adjust walker population target within bounds
    pub fn adjust_max_walkers(&mut self, delta: i32) {
        let new_val = (self.max_walkers as i64 + delta as i64).clamp(100, 20_000);
        self.max_walkers = new_val as usize;
    }

    /// Adjust bias magnitude within bounds
    pub fn adjust_bias_force(&mut self, delta: f32) {
        self.bias_force = (self.bias_force + delta).clamp(0.0, 10.0);
    }

    /// Adjust particle size within bounds
    pub fn adjust_particle_size(&mut self, delta: f32) {
        self.particle_size = (self.particle_size + delta).clamp(1.0, 20.0);
    }

    /// Adjust maximum walker age within bounds
    pub fn adjust_max_age(&mut self, delta: i64) {
        self.max_age = (self.max_age as i64 + delta).clamp(10, 100_000) as u32;
    }

    /// Adjust maximum wander distance within bounds
    pub fn adjust_max_wander_distance(&mut self, delta: f32) {
        self.max_wander_distance = (self.max_wander_distance + delta).clamp(1.0, 5000.0);
    }

    /// Clamp every numeric field into its documented range
    pub fn sanitize(&mut self) {
        self.adjust_stick_probability(0.0);
        self.adjust_max_walkers(0);
        self.adjust_bias_force(0.0);
        self.adjust_particle_size(0.0);
        self.adjust_max_age(0);
        self.adjust_max_wander_distance(0.0);
        self.polygon_sides = self.polygon_sides.clamp(3, 8);
    }
}

/// Drawing configuration consumed by the braille canvas and PNG export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub mode: RenderMode,
    /// Use the HSLA palette; otherwise draw in greyscale
    pub use_colors: bool,
    pub show_walkers: bool,
    pub background: Hsla,
    pub walker: Hsla,
    pub cluster: Hsla,
    pub shape: Hsla,
    pub line: Hsla,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            use_colors: true,
            show_walkers: true,
            background: Hsla::new(0.0, 0.0, 8.0),
            walker: Hsla::new(210.0, 30.0, 45.0),
            cluster: Hsla::new(190.0, 80.0, 60.0),
            shape: Hsla::new(40.0, 90.0, 55.0),
            line: Hsla::new(320.0, 70.0, 65.0),
        }
    }
}
