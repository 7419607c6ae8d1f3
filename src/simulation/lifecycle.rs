//! Walker replenishment and pruning.

use super::DlaSimulation;
use crate::particle::ParticleSpec;
use crate::settings::SpawnRegion;
use rand::Rng;
use tracing::debug;

/// Fraction of the smaller edge used as the radius of the centre spawn region
const CENTER_SPAWN_FRACTION: f32 = 0.1;

impl DlaSimulation {
    /// Top the walker population back up to the target
    pub(crate) fn replenish_walkers(&mut self) {
        if !self.settings.replenish_walkers {
            return;
        }
        let target = self.settings.max_walkers;
        if self.num_walkers < target {
            self.create_default_walkers(target - self.num_walkers);
        }
    }

    /// Spawn `count` walkers in the configured spawn region
    pub fn create_default_walkers(&mut self, count: usize) {
        for _ in 0..count {
            let (x, y) = self.spawn_position();
            let spec = self.default_walker_spec(x, y);
            self.create_walker(spec);
        }
    }

    fn default_walker_spec(&mut self, x: f32, y: f32) -> ParticleSpec {
        let mut spec = ParticleSpec::at(x, y)
            .kind(self.settings.walker_shape)
            .diameter(self.settings.particle_size)
            .rotation(self.rng.gen_range(0.0..std::f32::consts::TAU));
        spec.sides = Some(self.settings.polygon_sides);
        if self.settings.use_per_particle_bias {
            let (cx, cy) = self.edges.center();
            spec = spec.bias_target(cx, cy);
        }
        spec
    }

    /// Random position within the configured spawn region
    fn spawn_position(&mut self) -> (f32, f32) {
        let e = self.edges;
        let rng = &mut self.rng;

        match self.settings.spawn_region {
            SpawnRegion::Random => (
                rng.gen_range(e.left..=e.right),
                rng.gen_range(e.top..=e.bottom),
            ),
            SpawnRegion::Edges => match rng.gen_range(0..4) {
                0 => (rng.gen_range(e.left..=e.right), e.top),
                1 => (rng.gen_range(e.left..=e.right), e.bottom),
                2 => (e.left, rng.gen_range(e.top..=e.bottom)),
                _ => (e.right, rng.gen_range(e.top..=e.bottom)),
            },
            SpawnRegion::Top => (rng.gen_range(e.left..=e.right), e.top),
            SpawnRegion::Bottom => (rng.gen_range(e.left..=e.right), e.bottom),
            SpawnRegion::Left => (e.left, rng.gen_range(e.top..=e.bottom)),
            SpawnRegion::Right => (e.right, rng.gen_range(e.top..=e.bottom)),
            SpawnRegion::Center => {
                let (cx, cy) = e.center();
                let radius = e.width().min(e.height()) * CENTER_SPAWN_FRACTION;
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let r = radius * rng.gen::<f32>().sqrt();
                (cx + r * angle.cos(), cy + r * angle.sin())
            }
        }
    }

    /// Drop walkers that are too old or have wandered too far from their origin
    pub(crate) fn prune_walkers(&mut self) {
        let max_age = self.settings.prune_by_age.then_some(self.settings.max_age);
        let max_distance = self
            .settings
            .prune_by_distance
            .then_some(self.settings.max_wander_distance);
        if max_age.is_none() && max_distance.is_none() {
            return;
        }

        let index = &mut self.index;
        let mut removed = 0usize;
        self.particles.retain(|particle| {
            if particle.stuck {
                return true;
            }
            let too_old = max_age.is_some_and(|max| particle.age > max);
            let too_far = max_distance.is_some_and(|max| particle.wander_distance() > max);
            if too_old || too_far {
                index.remove(particle.body);
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.num_walkers = self.num_walkers.saturating_sub(removed);
            self.rebuild_lookup();
            debug!(removed, walkers = self.num_walkers, "Pruned stale walkers");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::particle::{ParticleSpec, ShapeKind};
    use crate::settings::{SimulationSettings, SpawnRegion};
    use crate::simulation::tests::{free_count, quiet_settings, quiet_sim};
    use crate::simulation::DlaSimulation;

    #[test]
    fn test_replenish_fills_population_in_one_tick() {
        let settings = SimulationSettings {
            replenish_walkers: true,
            max_walkers: 5,
            ..quiet_settings()
        };
        let mut sim = DlaSimulation::with_settings(1000.0, 1000.0, settings).with_rng_seed(5);
        // Cluster particle outside the spawn bounds so nothing can touch it
        sim.create_cluster_particle(ParticleSpec::at(-500.0, -500.0));
        assert_eq!(sim.num_walkers(), 0);

        sim.tick();
        assert_eq!(sim.num_walkers(), 5);
        assert_eq!(free_count(&sim), 5);
        assert_eq!(sim.cluster_size(), 1);

        sim.tick();
        assert_eq!(sim.num_walkers(), 5);
        assert_eq!(sim.particles().len(), 6);
    }

    #[test]
    fn test_replenish_disabled_spawns_nothing() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.max_walkers = 50;
        sim.tick();
        assert!(sim.particles().is_empty());
    }

    #[test]
    fn test_default_walkers_follow_settings() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.walker_shape = ShapeKind::Polygon;
        sim.settings.polygon_sides = 5;
        sim.settings.use_per_particle_bias = true;
        sim.create_default_walkers(3);

        assert_eq!(sim.num_walkers(), 3);
        for particle in sim.particles() {
            assert_eq!(particle.kind(), ShapeKind::Polygon);
            assert_eq!(particle.world_vertices().len(), 5);
            assert_eq!(particle.bias_target(), Some((50.0, 50.0)));
        }
    }

    #[test]
    fn test_spawn_regions_stay_in_bounds() {
        let regions = [
            SpawnRegion::Random,
            SpawnRegion::Edges,
            SpawnRegion::Top,
            SpawnRegion::Bottom,
            SpawnRegion::Left,
            SpawnRegion::Right,
            SpawnRegion::Center,
        ];
        for region in regions {
            let mut sim = quiet_sim(300.0, 200.0);
            sim.settings.spawn_region = region;
            sim.create_default_walkers(100);
            for particle in sim.particles() {
                let (x, y) = particle.position();
                assert!((0.0..=300.0).contains(&x), "{:?} x = {}", region, x);
                assert!((0.0..=200.0).contains(&y), "{:?} y = {}", region, y);
                match region {
                    SpawnRegion::Top => assert_eq!(y, 0.0),
                    SpawnRegion::Bottom => assert_eq!(y, 200.0),
                    SpawnRegion::Left => assert_eq!(x, 0.0),
                    SpawnRegion::Right => assert_eq!(x, 300.0),
                    SpawnRegion::Edges => assert!(x == 0.0 || x == 300.0 || y == 0.0 || y == 200.0),
                    SpawnRegion::Center => {
                        let d = ((x - 150.0).powi(2) + (y - 100.0).powi(2)).sqrt();
                        assert!(d <= 20.0 + 1e-3);
                    }
                    SpawnRegion::Random => {}
                }
            }
        }
    }

    #[test]
    fn test_aged_walker_is_pruned_without_trace() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.prune_by_age = true;
        sim.settings.max_age = 10;
        sim.settings.capture_lines = true;
        sim.create_walker(ParticleSpec::at(20.0, 20.0));
        sim.create_walker(ParticleSpec::at(80.0, 80.0));
        let old_body = sim.particles()[0].body();
        sim.particles[0].age = 11;

        sim.tick();

        assert_eq!(sim.particles().len(), 1);
        assert!(sim.particles().iter().all(|p| p.body() != old_body));
        assert!(!sim.index().contains(old_body));
        assert!(sim.lines().is_empty());
        assert_eq!(sim.cluster_size(), 0);
        assert_eq!(sim.num_walkers(), 1);
    }

    #[test]
    fn test_wandering_walker_is_pruned() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.prune_by_distance = true;
        sim.settings.max_wander_distance = 5.0;
        sim.create_walker(ParticleSpec::at(50.0, 50.0));
        sim.create_walker(ParticleSpec::at(10.0, 10.0));
        sim.particles[0].x = 60.0;

        sim.tick();
        assert_eq!(sim.particles().len(), 1);
        assert_eq!(sim.particles()[0].origin(), (10.0, 10.0));
        assert_eq!(sim.num_walkers(), 1);
    }

    #[test]
    fn test_pruning_never_touches_cluster() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.prune_by_age = true;
        sim.settings.max_age = 10;
        sim.create_cluster_particle(ParticleSpec::at(50.0, 50.0));
        sim.particles[0].age = 500;
        sim.tick();
        assert_eq!(sim.cluster_size(), 1);
    }

    #[test]
    fn test_lookup_survives_pruning() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.prune_by_age = true;
        sim.settings.max_age = 10;
        sim.create_walker(ParticleSpec::at(5.0, 5.0));
        sim.create_cluster_particle(ParticleSpec::at(50.0, 50.0).diameter(10.0));
        sim.create_walker(ParticleSpec::at(90.0, 90.0));
        sim.particles[0].age = 50;
        sim.tick();
        assert_eq!(sim.particles().len(), 2);

        // The surviving walker must still resolve against the shifted cluster entry
        sim.particles[1].x = 53.0;
        sim.particles[1].y = 50.0;
        sim.tick();
        assert_eq!(sim.cluster_size(), 2);
    }
}
