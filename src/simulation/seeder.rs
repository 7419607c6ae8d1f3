//! Default stationary layouts created on reset.

use super::DlaSimulation;
use crate::particle::{regular_polygon, ParticleSpec, ShapeKind};
use crate::settings::{BiasAxis, ClusterPattern};
use tracing::debug;

/// Orientation of a seeded wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallAxis {
    /// Along the horizontal centre line
    Horizontal,
    /// Along the vertical centre line
    Vertical,
}

impl WallAxis {
    /// Wall that meets walkers pulled by `axis`
    pub fn for_bias(axis: BiasAxis) -> Self {
        match axis {
            BiasAxis::Equator => WallAxis::Horizontal,
            BiasAxis::Meridian | BiasAxis::None => WallAxis::Vertical,
        }
    }
}

impl DlaSimulation {
    /// Specs for a wall of tangent circles spanning the edges along `axis`
    pub fn wall_specs(&self, axis: WallAxis) -> Vec<ParticleSpec> {
        let d = self.settings.particle_size.max(f32::EPSILON);
        let e = self.edges;
        let (cx, cy) = e.center();
        let span = match axis {
            WallAxis::Horizontal => e.width(),
            WallAxis::Vertical => e.height(),
        };
        let count = (span / d).ceil() as usize + 1;

        (0..count)
            .map(|i| {
                let offset = i as f32 * d;
                let (x, y) = match axis {
                    WallAxis::Horizontal => (e.left + offset, cy),
                    WallAxis::Vertical => (cx, e.top + offset),
                };
                ParticleSpec::at(x, y).kind(ShapeKind::Circle).diameter(d)
            })
            .collect()
    }

    /// Seed the layout selected by `cluster_pattern`
    pub fn create_default_clusters(&mut self) {
        match self.settings.cluster_pattern {
            ClusterPattern::Wall => {
                let axis = WallAxis::for_bias(self.settings.bias_axis);
                let specs = self.wall_specs(axis);
                debug!(?axis, count = specs.len(), "Seeding wall");
                self.create_cluster_from_specs(specs);
            }
            ClusterPattern::Center => {
                let (cx, cy) = self.edges.center();
                let spec = ParticleSpec::at(cx, cy).diameter(self.settings.particle_size);
                self.create_cluster_particle(spec);
            }
            ClusterPattern::Obstacle => {
                let (cx, cy) = self.edges.center();
                let radius = self.edges.width().min(self.edges.height()) / 8.0;
                let vertices = regular_polygon(6, radius * 2.0)
                    .into_iter()
                    .map(|(x, y)| (cx + x, cy + y))
                    .collect();
                self.create_shape(vertices);
            }
            ClusterPattern::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::tests::quiet_sim;

    #[test]
    fn test_wall_axis_follows_bias() {
        assert_eq!(WallAxis::for_bias(BiasAxis::Equator), WallAxis::Horizontal);
        assert_eq!(WallAxis::for_bias(BiasAxis::Meridian), WallAxis::Vertical);
        assert_eq!(WallAxis::for_bias(BiasAxis::None), WallAxis::Vertical);
    }

    #[test]
    fn test_wall_count_covers_span() {
        let mut sim = quiet_sim(200.0, 100.0);
        sim.settings.particle_size = 10.0;

        let vertical = sim.wall_specs(WallAxis::Vertical);
        assert_eq!(vertical.len(), 11);
        assert!(vertical.iter().all(|s| s.x == Some(100.0)));
        assert_eq!(vertical.last().and_then(|s| s.y), Some(100.0));

        let horizontal = sim.wall_specs(WallAxis::Horizontal);
        assert_eq!(horizontal.len(), 21);
        assert!(horizontal.iter().all(|s| s.y == Some(50.0)));

        sim.settings.particle_size = 3.0;
        // ceil(100 / 3) + 1
        assert_eq!(sim.wall_specs(WallAxis::Vertical).len(), 35);
    }

    #[test]
    fn test_wall_particles_are_tangent() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.settings.particle_size = 4.0;
        let specs = sim.wall_specs(WallAxis::Horizontal);
        for pair in specs.windows(2) {
            let gap = pair[1].x.unwrap_or_default() - pair[0].x.unwrap_or_default();
            assert!((gap - 4.0).abs() < 1e-4);
        }
        assert!(specs.iter().all(|s| s.diameter == Some(4.0)));
    }

    #[test]
    fn test_equator_wall_is_horizontal() {
        let mut sim = quiet_sim(120.0, 60.0);
        sim.settings.cluster_pattern = ClusterPattern::Wall;
        sim.settings.bias_axis = BiasAxis::Equator;
        sim.settings.particle_size = 6.0;
        sim.create_default_clusters();

        assert_eq!(sim.cluster_size(), 21);
        assert!(sim.particles().iter().all(|p| p.position().1 == 30.0));
        assert_eq!(sim.num_walkers(), 0);
    }

    #[test]
    fn test_center_and_obstacle_patterns() {
        let mut sim = quiet_sim(160.0, 80.0);
        sim.settings.cluster_pattern = ClusterPattern::Center;
        sim.create_default_clusters();
        assert_eq!(sim.cluster_size(), 1);
        assert_eq!(sim.particles()[0].position(), (80.0, 40.0));

        sim.remove_all();
        sim.settings.cluster_pattern = ClusterPattern::Obstacle;
        sim.create_default_clusters();
        assert!(sim.particles().is_empty());
        assert_eq!(sim.shapes().len(), 1);
        let vertices = sim.shapes()[0].vertices();
        assert_eq!(vertices.len(), 6);
        for &(x, y) in vertices {
            let r = ((x - 80.0).powi(2) + (y - 40.0).powi(2)).sqrt();
            assert!((r - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_none_pattern_seeds_nothing() {
        let mut sim = quiet_sim(100.0, 100.0);
        sim.create_default_clusters();
        assert!(sim.particles().is_empty());
        assert!(sim.shapes().is_empty());
    }
}
