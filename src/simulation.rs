mod aggregation;
mod lifecycle;
mod motion;
mod seeder;

pub use seeder::WallAxis;

use crate::particle::{Geometry, Line, Particle, ParticleSpec, Shape};
use crate::settings::SimulationSettings;
use crate::spatial::{BodyId, SpatialIndex, DEFAULT_CELL_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::{info, trace, warn};

/// Extra per-tick displacement applied to every free particle
pub type CustomForce = Box<dyn Fn(&Particle) -> (f32, f32)>;

/// Rectangular simulation bounds. Only constrains where walkers spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Edges {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: width.max(1.0),
            bottom: height.max(1.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }
}

/// Broad-phase grid sized so a default particle spans at most two cells per axis
fn spatial_index(particle_size: f32) -> SpatialIndex {
    let cell_size = (particle_size * 2.0).max(DEFAULT_CELL_SIZE);
    SpatialIndex::new(cell_size).unwrap_or_else(|err| {
        warn!(%err, particle_size, "Falling back to default cell size");
        SpatialIndex::default()
    })
}

/// DLA simulation state
pub struct DlaSimulation {
    pub settings: SimulationSettings,
    pub paused: bool,
    edges: Edges,
    index: SpatialIndex,
    /// Live particles in creation order
    particles: Vec<Particle>,
    /// Body handle -> position in `particles`
    lookup: HashMap<BodyId, usize>,
    shapes: Vec<Shape>,
    lines: Vec<Line>,
    num_walkers: usize,
    ticks: u64,
    custom_force: Option<CustomForce>,
    rng: StdRng,
}

impl DlaSimulation {
    /// Create a simulation with default settings, seeded with walkers and clusters
    pub fn new(width: f32, height: f32) -> Self {
        let mut sim = Self::with_settings(width, height, SimulationSettings::default());
        sim.reset();
        sim
    }

    /// Create an empty simulation; nothing is seeded until [`reset`](Self::reset)
    pub fn with_settings(width: f32, height: f32, settings: SimulationSettings) -> Self {
        let index = spatial_index(settings.particle_size);
        Self {
            settings,
            paused: false,
            edges: Edges::new(width, height),
            index,
            particles: Vec::new(),
            lookup: HashMap::new(),
            shapes: Vec::new(),
            lines: Vec::new(),
            num_walkers: 0,
            ticks: 0,
            custom_force: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random generator with a seeded one
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Install a force added to every walker's displacement
    pub fn set_custom_force(&mut self, force: Option<CustomForce>) {
        self.custom_force = force;
    }

    // === Read-only state ===

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn edges(&self) -> Edges {
        self.edges
    }

    /// Tracked walker population
    pub fn num_walkers(&self) -> usize {
        self.num_walkers
    }

    /// Number of stuck particles
    pub fn cluster_size(&self) -> usize {
        self.particles.iter().filter(|p| p.stuck).count()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    // === Particle store ===

    /// Build a particle from `spec` and register it with the spatial index.
    /// Returns `None` (and changes nothing) when the spec has no usable coordinates.
    pub fn create_particle(&mut self, spec: ParticleSpec) -> Option<BodyId> {
        let (mut x, mut y) = spec.position()?;
        let geometry = spec.geometry(self.settings.particle_size, self.settings.polygon_sides);

        let body = match &geometry {
            Geometry::Point => {
                // Points live on the integer lattice
                x = x.round();
                y = y.round();
                self.index.create_point(x, y)
            }
            Geometry::Circle { radius } => self.index.create_circle(x, y, *radius),
            Geometry::Polygon { vertices, rotation } => {
                self.index.create_polygon(x, y, vertices, *rotation)
            }
        };

        self.lookup.insert(body, self.particles.len());
        self.particles.push(Particle {
            body,
            geometry,
            x,
            y,
            origin: (x, y),
            age: 0,
            stuck: spec.stuck,
            bias_target: spec.bias_target,
        });
        Some(body)
    }

    /// Create a free particle and count it as a walker
    pub fn create_walker(&mut self, mut spec: ParticleSpec) -> Option<BodyId> {
        spec.stuck = false;
        let body = self.create_particle(spec)?;
        self.num_walkers += 1;
        Some(body)
    }

    /// Create a particle that is already part of the cluster
    pub fn create_cluster_particle(&mut self, spec: ParticleSpec) -> Option<BodyId> {
        self.create_particle(ParticleSpec { stuck: true, ..spec })
    }

    /// Create a cluster particle for every spec in the list
    pub fn create_cluster_from_specs(&mut self, specs: Vec<ParticleSpec>) {
        for spec in specs {
            self.create_cluster_particle(spec);
        }
    }

    /// Create a particle from loosely-typed input. Anything other than an
    /// object with numeric `x` and `y` is ignored.
    pub fn create_particle_from_json(&mut self, value: &serde_json::Value) -> Option<BodyId> {
        if !value.is_object() {
            return None;
        }
        let spec: ParticleSpec = serde_json::from_value(value.clone()).ok()?;
        if spec.stuck {
            self.create_cluster_particle(spec)
        } else {
            self.create_walker(spec)
        }
    }

    /// Add a static convex obstacle from world-space vertices
    pub fn create_shape(&mut self, vertices: Vec<(f32, f32)>) -> Option<BodyId> {
        if vertices.len() < 3 || vertices.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return None;
        }
        let body = self.index.create_polygon(0.0, 0.0, &vertices, 0.0);
        self.shapes.push(Shape { body, vertices });
        Some(body)
    }

    /// Clear every particle, shape and line and zero the counters
    pub fn remove_all(&mut self) {
        self.index = spatial_index(self.settings.particle_size);
        self.particles.clear();
        self.lookup.clear();
        self.shapes.clear();
        self.lines.clear();
        self.num_walkers = 0;
        self.ticks = 0;
    }

    /// Restore the tick-0 state: clear, then seed default walkers and clusters
    pub fn reset(&mut self) {
        self.remove_all();
        self.create_default_walkers(self.settings.max_walkers);
        self.create_default_clusters();
        self.paused = false;
        info!(
            walkers = self.num_walkers,
            cluster = self.cluster_size(),
            shapes = self.shapes.len(),
            pattern = self.settings.cluster_pattern.name(),
            "Simulation reset"
        );
    }

    /// Recompute the edges for a new viewport. Existing particles are kept.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.edges = Edges::new(width, height);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advance the simulation by one tick
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }

        self.replenish_walkers();
        self.move_walkers();
        self.rebuild_index();
        self.handle_shape_collisions();
        self.handle_particle_collisions();
        self.prune_walkers();
        self.ticks += 1;

        trace!(
            tick = self.ticks,
            walkers = self.num_walkers,
            particles = self.particles.len(),
            lines = self.lines.len(),
            "Tick complete"
        );
    }

    /// Push particle positions into the index and rebuild the broad phase
    fn rebuild_index(&mut self) {
        for particle in self.particles.iter().filter(|p| !p.stuck) {
            self.index.set_position(particle.body, particle.x, particle.y);
        }
        self.index.update();
    }

    fn rebuild_lookup(&mut self) {
        self.lookup.clear();
        self.lookup.extend(
            self.particles
                .iter()
                .enumerate()
                .map(|(idx, particle)| (particle.body, idx)),
        );
    }
}
