//! Collision resolution: walkers touching obstacles or cluster particles join the cluster.

use super::DlaSimulation;
use crate::particle::{Geometry, Line};
use rand::Rng;
use tracing::debug;

impl DlaSimulation {
    /// Walkers overlapping a static shape stick unconditionally
    pub(crate) fn handle_shape_collisions(&mut self) {
        let mut stuck = 0usize;

        for shape in &self.shapes {
            for candidate in self.index.potentials(shape.body) {
                let Some(&idx) = self.lookup.get(&candidate) else {
                    continue;
                };
                let particle = &mut self.particles[idx];
                if particle.stuck || !self.index.collides(shape.body, candidate) {
                    continue;
                }
                particle.stuck = true;
                self.num_walkers = self.num_walkers.saturating_sub(1);
                stuck += 1;
            }
        }

        if stuck > 0 {
            debug!(stuck, "Walkers stuck to shapes");
        }
    }

    /// Walkers touching a cluster particle get one sticking chance per contact.
    ///
    /// Every qualifying contact consumes one walker from the counter, even when
    /// the draw rejects it and the particle stays free. A walker stops testing
    /// further candidates once it has stuck.
    pub(crate) fn handle_particle_collisions(&mut self) {
        let p = self.settings.stick_probability;
        let capture = self.settings.capture_lines;

        for idx in 0..self.particles.len() {
            if self.particles[idx].stuck {
                continue;
            }
            let body = self.particles[idx].body;
            let is_point = matches!(self.particles[idx].geometry, Geometry::Point);

            for candidate in self.index.potentials(body) {
                let Some(&other) = self.lookup.get(&candidate) else {
                    continue;
                };
                if !self.particles[other].stuck {
                    continue;
                }
                // Points are lattice aligned, so broad-phase adjacency is contact
                if !is_point && !self.index.collides(body, candidate) {
                    continue;
                }

                self.num_walkers = self.num_walkers.saturating_sub(1);

                if self.rng.gen::<f32>() <= p {
                    let walker = &mut self.particles[idx];
                    walker.stuck = true;
                    let from = (walker.x, walker.y);
                    if capture {
                        let cluster = &self.particles[other];
                        self.lines.push(Line {
                            from,
                            to: (cluster.x, cluster.y),
                        });
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::particle::{ParticleSpec, ShapeKind};
    use crate::settings::{BiasAxis, ClusterPattern, SimulationSettings};
    use crate::simulation::tests::{free_count, quiet_settings, quiet_sim};
    use crate::simulation::DlaSimulation;

    #[test]
    fn test_walker_biased_into_wall_sticks_within_three_ticks() {
        let settings = SimulationSettings {
            stick_probability: 1.0,
            bias_axis: BiasAxis::Meridian,
            bias_force: 5.0,
            particle_size: 10.0,
            cluster_pattern: ClusterPattern::Wall,
            ..quiet_settings()
        };
        // Meridian wall lands at x = 100 spanning y = 0..=90
        let mut sim = DlaSimulation::with_settings(200.0, 90.0, settings).with_rng_seed(11);
        sim.create_default_clusters();
        assert_eq!(sim.cluster_size(), 10);
        assert!(sim.particles().iter().all(|p| p.position().0 == 100.0));

        sim.create_walker(ParticleSpec::at(90.0, 45.0).diameter(10.0));
        let before = sim.num_walkers();

        for _ in 0..3 {
            sim.tick();
            if sim.cluster_size() == 11 {
                break;
            }
        }

        assert_eq!(sim.cluster_size(), 11);
        assert_eq!(sim.num_walkers(), before - 1);
        assert_eq!(free_count(&sim), 0);
    }

    #[test]
    fn test_certain_sticking_grows_deterministically() {
        let mut sim = quiet_sim(200.0, 200.0);
        sim.settings.stick_probability = 1.0;
        sim.create_cluster_particle(ParticleSpec::at(100.0, 100.0).diameter(10.0));
        for i in 0..6 {
            let angle = i as f32 * std::f32::consts::TAU / 6.0;
            sim.create_walker(
                ParticleSpec::at(100.0 + 8.0 * angle.cos(), 100.0 + 8.0 * angle.sin()).diameter(10.0),
            );
        }
        sim.tick();
        assert_eq!(sim.cluster_size(), 7);
        assert_eq!(sim.num_walkers(), 0);
    }

    #[test]
    fn test_zero_probability_never_sticks_but_consumes_walkers() {
        let mut sim = quiet_sim(200.0, 200.0);
        sim.settings.stick_probability = 0.0;
        sim.create_cluster_particle(ParticleSpec::at(100.0, 100.0).diameter(10.0));
        // Overlaps the cluster particle no matter how it jitters
        sim.create_walker(ParticleSpec::at(100.0, 100.0).diameter(10.0));
        sim.create_walker(ParticleSpec::at(10.0, 10.0).diameter(2.0));
        sim.create_walker(ParticleSpec::at(190.0, 190.0).diameter(2.0));

        sim.tick();
        assert_eq!(sim.cluster_size(), 1);
        assert_eq!(free_count(&sim), 3);
        assert_eq!(sim.num_walkers(), 2);

        sim.tick();
        assert_eq!(sim.cluster_size(), 1);
        assert_eq!(sim.num_walkers(), 1);
    }

    #[test]
    fn test_point_walkers_stick_on_adjacency() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.create_cluster_particle(ParticleSpec::at(50.0, 50.0).kind(ShapeKind::Point));
        // Far from lattice contact even after one step
        sim.create_walker(ParticleSpec::at(10.0, 10.0).kind(ShapeKind::Point));
        sim.rebuild_index();
        sim.handle_particle_collisions();
        assert_eq!(sim.cluster_size(), 1);

        sim.create_walker(ParticleSpec::at(51.0, 51.0).kind(ShapeKind::Point));
        sim.rebuild_index();
        sim.handle_particle_collisions();
        assert_eq!(sim.cluster_size(), 2);
        assert_eq!(sim.num_walkers(), 1);
    }

    #[test]
    fn test_circles_need_exact_overlap() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.create_cluster_particle(ParticleSpec::at(50.0, 50.0).diameter(10.0));
        // Bounding boxes touch at the corner, circles do not
        sim.create_walker(ParticleSpec::at(59.0, 59.0).diameter(10.0));
        sim.rebuild_index();
        sim.handle_particle_collisions();
        assert_eq!(sim.cluster_size(), 1);
        assert_eq!(sim.num_walkers(), 1);
    }

    #[test]
    fn test_polygon_walkers_stick_to_cluster() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.create_cluster_particle(ParticleSpec::at(50.0, 50.0).diameter(10.0));
        sim.create_walker(
            ParticleSpec::at(55.0, 50.0)
                .kind(ShapeKind::Polygon)
                .diameter(6.0)
                .rotation(0.3),
        );
        sim.rebuild_index();
        sim.handle_particle_collisions();
        assert_eq!(sim.cluster_size(), 2);
    }

    #[test]
    fn test_free_neighbours_do_not_count() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.create_walker(ParticleSpec::at(50.0, 50.0).diameter(10.0));
        sim.create_walker(ParticleSpec::at(52.0, 50.0).diameter(10.0));
        sim.rebuild_index();
        sim.handle_particle_collisions();
        assert_eq!(sim.cluster_size(), 0);
        assert_eq!(sim.num_walkers(), 2);
    }

    #[test]
    fn test_lines_captured_only_when_enabled() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.create_cluster_particle(ParticleSpec::at(50.0, 50.0).diameter(10.0));
        sim.create_walker(ParticleSpec::at(56.0, 50.0).diameter(10.0));
        sim.rebuild_index();
        sim.handle_particle_collisions();
        assert_eq!(sim.cluster_size(), 2);
        assert!(sim.lines().is_empty());

        sim.settings.capture_lines = true;
        sim.create_walker(ParticleSpec::at(44.0, 50.0).diameter(10.0));
        sim.rebuild_index();
        sim.handle_particle_collisions();
        assert_eq!(sim.lines().len(), 1);
        let line = sim.lines()[0];
        assert_eq!(line.from, (44.0, 50.0));
        assert_eq!(line.to, (50.0, 50.0));
    }

    #[test]
    fn test_shapes_capture_walkers_unconditionally() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.stick_probability = 0.0;
        sim.create_shape(vec![(40.0, 40.0), (60.0, 40.0), (60.0, 60.0), (40.0, 60.0)]);
        sim.create_walker(ParticleSpec::at(50.0, 50.0).diameter(2.0));
        sim.create_walker(ParticleSpec::at(61.0, 50.0).diameter(2.0));
        sim.create_walker(ParticleSpec::at(90.0, 90.0).diameter(2.0));
        sim.rebuild_index();
        sim.handle_shape_collisions();

        assert_eq!(sim.cluster_size(), 2);
        assert_eq!(sim.num_walkers(), 1);
        assert!(sim.lines().is_empty());
    }

    #[test]
    fn test_shapes_capture_point_walkers_on_every_edge() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.stick_probability = 0.0;
        sim.create_shape(vec![(40.0, 40.0), (60.0, 40.0), (60.0, 60.0), (40.0, 60.0)]);
        for (x, y) in [(60.0, 50.0), (40.0, 50.0), (50.0, 40.0), (50.0, 60.0)] {
            sim.create_walker(ParticleSpec::at(x, y).kind(ShapeKind::Point));
        }
        sim.create_walker(ParticleSpec::at(61.0, 50.0).kind(ShapeKind::Point));
        sim.rebuild_index();
        sim.handle_shape_collisions();

        assert_eq!(sim.cluster_size(), 4);
        assert_eq!(sim.num_walkers(), 1);
        let free: Vec<_> = sim
            .particles()
            .iter()
            .filter(|p| !p.is_stuck())
            .map(|p| p.position())
            .collect();
        assert_eq!(free, vec![(61.0, 50.0)]);
    }
}
