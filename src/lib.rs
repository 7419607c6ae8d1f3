//! Diffusion-limited aggregation engine.
//!
//! Free walkers take biased random steps until they touch the stationary
//! cluster, at which point they join it with a configurable probability.
//! [`DlaSimulation`] owns all state; renderers only read it.

pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod particle;
pub mod presets;
pub mod raster;
pub mod settings;
pub mod simulation;
pub mod spatial;

pub use config::AppConfig;
pub use error::{ConfigError, ExportError, IndexError};
pub use particle::{Geometry, Line, Particle, ParticleSpec, Shape, ShapeKind};
pub use settings::{
    BiasAxis, ClusterPattern, RenderMode, RenderSettings, SimulationSettings, SpawnRegion,
};
pub use simulation::{CustomForce, DlaSimulation, Edges, WallAxis};
pub use spatial::{BodyId, SpatialIndex};
