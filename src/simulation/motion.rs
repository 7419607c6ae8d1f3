//! Per-tick displacement of free particles.

use super::{DlaSimulation, Edges};
use crate::particle::{Geometry, Particle};
use crate::settings::{BiasAxis, SimulationSettings};
use rand::Rng;

impl DlaSimulation {
    /// Move every walker one step: Brownian jitter, one bias source, then the custom force
    pub(crate) fn move_walkers(&mut self) {
        let settings = &self.settings;
        let edges = self.edges;

        for particle in self.particles.iter_mut().filter(|p| !p.stuck) {
            let mut dx: f32 = self.rng.gen_range(-1.0..=1.0);
            let mut dy: f32 = self.rng.gen_range(-1.0..=1.0);

            let (bx, by) = bias_displacement(settings, &edges, particle);
            dx += bx;
            dy += by;

            if let Some(force) = &self.custom_force {
                let (fx, fy) = force(particle);
                dx += fx;
                dy += fy;
            }

            if matches!(particle.geometry, Geometry::Point) {
                dx = dx.round();
                dy = dy.round();
            }

            particle.x += dx;
            particle.y += dy;
            particle.age += 1;
        }
    }
}

/// Bias for one particle. A per-particle target wins over the axis bias.
fn bias_displacement(settings: &SimulationSettings, edges: &Edges, particle: &Particle) -> (f32, f32) {
    let force = settings.bias_force;

    if settings.use_per_particle_bias {
        if let Some((tx, ty)) = particle.bias_target {
            let angle = (ty - particle.y).atan2(tx - particle.x);
            return (force * angle.cos(), force * angle.sin());
        }
    }

    let (center_x, center_y) = edges.center();
    match settings.bias_axis {
        BiasAxis::None => (0.0, 0.0),
        BiasAxis::Equator => (0.0, if particle.y < center_y { force } else { -force }),
        BiasAxis::Meridian => (if particle.x < center_x { force } else { -force }, 0.0),
    }
}
