//! Broad-phase collision index for points, circles and convex polygons.
//!
//! Bodies are bucketed into a uniform grid of square cells on every
//! [`SpatialIndex::update`]. [`SpatialIndex::potentials`] returns the bodies
//! whose bounding boxes touch the queried body's box, and
//! [`SpatialIndex::collides`] runs the exact narrow-phase test.

use std::collections::HashMap;
use thiserror::Error;

/// Default edge length of a grid cell in simulation units.
pub const DEFAULT_CELL_SIZE: f32 = 16.0;

/// Half extent of a point body's bounding box. Two lattice points are
/// broad-phase neighbours when they are orthogonally or diagonally adjacent.
const POINT_HALF_EXTENT: f32 = 0.5;

/// Errors emitted by the spatial index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Configuration values that cannot be used (e.g. non-positive cell size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Opaque handle to a body stored in a [`SpatialIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

/// Collision geometry of a body, relative to its position.
#[derive(Debug, Clone)]
enum Collider {
    Point,
    Circle {
        radius: f32,
    },
    Polygon {
        local: Vec<(f32, f32)>,
        rotation: f32,
        /// World-space vertices, refreshed on `update`
        world: Vec<(f32, f32)>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Aabb {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Aabb {
    fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

#[derive(Debug, Clone)]
struct Body {
    x: f32,
    y: f32,
    collider: Collider,
    aabb: Aabb,
}

impl Body {
    fn new(x: f32, y: f32, collider: Collider) -> Self {
        let mut body = Self {
            x,
            y,
            collider,
            aabb: Aabb {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            },
        };
        body.refresh();
        body
    }

    /// Recompute world vertices and the bounding box from the position
    fn refresh(&mut self) {
        let (x, y) = (self.x, self.y);
        self.aabb = match &mut self.collider {
            Collider::Point => Aabb {
                min_x: x - POINT_HALF_EXTENT,
                min_y: y - POINT_HALF_EXTENT,
                max_x: x + POINT_HALF_EXTENT,
                max_y: y + POINT_HALF_EXTENT,
            },
            Collider::Circle { radius } => Aabb {
                min_x: x - *radius,
                min_y: y - *radius,
                max_x: x + *radius,
                max_y: y + *radius,
            },
            Collider::Polygon {
                local,
                rotation,
                world,
            } => {
                let (sin, cos) = rotation.sin_cos();
                world.clear();
                world.extend(
                    local
                        .iter()
                        .map(|&(vx, vy)| (x + vx * cos - vy * sin, y + vx * sin + vy * cos)),
                );
                let mut aabb = Aabb {
                    min_x: f32::INFINITY,
                    min_y: f32::INFINITY,
                    max_x: f32::NEG_INFINITY,
                    max_y: f32::NEG_INFINITY,
                };
                for &(wx, wy) in world.iter() {
                    aabb.min_x = aabb.min_x.min(wx);
                    aabb.min_y = aabb.min_y.min(wy);
                    aabb.max_x = aabb.max_x.max(wx);
                    aabb.max_y = aabb.max_y.max(wy);
                }
                aabb
            }
        };
    }
}

/// Finite, single-use sequence of broad-phase candidates.
#[derive(Debug)]
pub struct Potentials {
    inner: std::vec::IntoIter<BodyId>,
}

impl Iterator for Potentials {
    type Item = BodyId;

    fn next(&mut self) -> Option<BodyId> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Uniform-grid broad phase with exact narrow-phase tests
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    bodies: Vec<Option<Body>>,
    free: Vec<u32>,
    cells: HashMap<(i32, i32), Vec<BodyId>>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            bodies: Vec::new(),
            free: Vec::new(),
            cells: HashMap::new(),
        }
    }
}

impl SpatialIndex {
    /// Create an empty index with the provided cell size.
    pub fn new(cell_size: f32) -> Result<Self, IndexError> {
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(IndexError::InvalidConfig("cell_size must be positive"));
        }
        Ok(Self {
            cell_size,
            ..Self::default()
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create_point(&mut self, x: f32, y: f32) -> BodyId {
        self.insert(Body::new(x, y, Collider::Point))
    }

    pub fn create_circle(&mut self, x: f32, y: f32, radius: f32) -> BodyId {
        self.insert(Body::new(x, y, Collider::Circle { radius: radius.abs() }))
    }

    /// Insert a convex polygon; `vertices` are relative to `(x, y)` and are
    /// rotated by `rotation` radians about that point.
    pub fn create_polygon(
        &mut self,
        x: f32,
        y: f32,
        vertices: &[(f32, f32)],
        rotation: f32,
    ) -> BodyId {
        let collider = Collider::Polygon {
            local: vertices.to_vec(),
            rotation,
            world: Vec::with_capacity(vertices.len()),
        };
        self.insert(Body::new(x, y, collider))
    }

    fn insert(&mut self, body: Body) -> BodyId {
        match self.free.pop() {
            Some(slot) => {
                self.bodies[slot as usize] = Some(body);
                BodyId(slot)
            }
            None => {
                self.bodies.push(Some(body));
                BodyId((self.bodies.len() - 1) as u32)
            }
        }
    }

    /// Evict a body. Returns false if the handle was already gone.
    ///
    /// The body disappears from subsequent `potentials` results immediately,
    /// but grid buckets are only compacted on the next `update`.
    pub fn remove(&mut self, id: BodyId) -> bool {
        match self.bodies.get_mut(id.0 as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.free.push(id.0);
                true
            }
            _ => false,
        }
    }

    /// Drop every body and bucket
    pub fn contains(&self, id: BodyId) -> bool {
        self.body(id).is_some()
    }

    pub fn position(&self, id: BodyId) -> Option<(f32, f32)> {
        self.body(id).map(|b| (b.x, b.y))
    }

    /// Move a body. Bounds and buckets catch up on the next `update`.
    pub fn set_position(&mut self, id: BodyId, x: f32, y: f32) {
        if let Some(Some(body)) = self.bodies.get_mut(id.0 as usize) {
            body.x = x;
            body.y = y;
        }
    }

    /// Rebuild the broad-phase grid from current body positions
    pub fn update(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }

        let inv = 1.0 / self.cell_size;
        for (slot, body) in self.bodies.iter_mut().enumerate() {
            let Some(body) = body else { continue };
            body.refresh();
            let (cx0, cy0, cx1, cy1) = cell_range(&body.aabb, inv);
            for cy in cy0..=cy1 {
                for cx in cx0..=cx1 {
                    self.cells
                        .entry((cx, cy))
                        .or_default()
                        .push(BodyId(slot as u32));
                }
            }
        }

        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    /// Bodies whose bounding boxes touch `id`'s box, in ascending handle order.
    /// Does not include `id` itself.
    pub fn potentials(&self, id: BodyId) -> Potentials {
        let mut found = Vec::new();
        if let Some(body) = self.body(id) {
            let (cx0, cy0, cx1, cy1) = cell_range(&body.aabb, 1.0 / self.cell_size);
            for cy in cy0..=cy1 {
                for cx in cx0..=cx1 {
                    let Some(bucket) = self.cells.get(&(cx, cy)) else {
                        continue;
                    };
                    for &other in bucket {
                        if other == id {
                            continue;
                        }
                        if let Some(candidate) = self.body(other) {
                            if body.aabb.overlaps(&candidate.aabb) {
                                found.push(other);
                            }
                        }
                    }
                }
            }
            found.sort_unstable();
            found.dedup();
        }
        Potentials {
            inner: found.into_iter(),
        }
    }

    /// Exact overlap test between two bodies; touching counts as overlap
    pub fn collides(&self, a: BodyId, b: BodyId) -> bool {
        match (self.body(a), self.body(b)) {
            (Some(a), Some(b)) => bodies_overlap(a, b),
            _ => false,
        }
    }

    fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0 as usize).and_then(Option::as_ref)
    }
}

fn cell_range(aabb: &Aabb, inv_cell: f32) -> (i32, i32, i32, i32) {
    (
        (aabb.min_x * inv_cell).floor() as i32,
        (aabb.min_y * inv_cell).floor() as i32,
        (aabb.max_x * inv_cell).floor() as i32,
        (aabb.max_y * inv_cell).floor() as i32,
    )
}

fn bodies_overlap(a: &Body, b: &Body) -> bool {
    use Collider::*;
    match (&a.collider, &b.collider) {
        (Point, Point) => a.x == b.x && a.y == b.y,
        (Point, Circle { radius }) => within(a.x, a.y, b.x, b.y, *radius),
        (Circle { radius }, Point) => within(a.x, a.y, b.x, b.y, *radius),
        (Circle { radius: ra }, Circle { radius: rb }) => within(a.x, a.y, b.x, b.y, ra + rb),
        (Point, Polygon { world, .. }) => polygon_contains(world, a.x, a.y),
        (Polygon { world, .. }, Point) => polygon_contains(world, b.x, b.y),
        (Circle { radius }, Polygon { world, .. }) => circle_polygon(a.x, a.y, *radius, world),
        (Polygon { world, .. }, Circle { radius }) => circle_polygon(b.x, b.y, *radius, world),
        (Polygon { world: wa, .. }, Polygon { world: wb, .. }) => polygons_overlap(wa, wb),
    }
}

fn within(ax: f32, ay: f32, bx: f32, by: f32, dist: f32) -> bool {
    let dx = bx - ax;
    let dy = by - ay;
    dx * dx + dy * dy <= dist * dist
}

/// Whether `(px, py)` lies inside `poly` or on its boundary
pub fn polygon_contains(poly: &[(f32, f32)], px: f32, py: f32) -> bool {
    if poly.len() < 3 {
        return false;
    }
    point_in_polygon(px, py, poly)
        || (0..poly.len())
            .any(|i| segment_distance_sq(px, py, poly[i], poly[(i + 1) % poly.len()]) <= f32::EPSILON)
}

/// Even-odd ray cast; edges on the right and top fall outside
fn point_in_polygon(px: f32, py: f32, poly: &[(f32, f32)]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn segment_distance_sq(px: f32, py: f32, (ax, ay): (f32, f32), (bx, by): (f32, f32)) -> f32 {
    let (ex, ey) = (bx - ax, by - ay);
    let len_sq = ex * ex + ey * ey;
    let t = if len_sq > 0.0 {
        (((px - ax) * ex + (py - ay) * ey) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (ax + t * ex, ay + t * ey);
    (px - cx) * (px - cx) + (py - cy) * (py - cy)
}

fn circle_polygon(cx: f32, cy: f32, radius: f32, poly: &[(f32, f32)]) -> bool {
    if poly.is_empty() {
        return false;
    }
    if point_in_polygon(cx, cy, poly) {
        return true;
    }
    let r_sq = radius * radius;
    (0..poly.len()).any(|i| segment_distance_sq(cx, cy, poly[i], poly[(i + 1) % poly.len()]) <= r_sq)
}

/// Separating axis test for convex polygons
fn polygons_overlap(a: &[(f32, f32)], b: &[(f32, f32)]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    for poly in [a, b] {
        for i in 0..poly.len() {
            let (x1, y1) = poly[i];
            let (x2, y2) = poly[(i + 1) % poly.len()];
            let axis = (y1 - y2, x2 - x1);
            if axis.0 == 0.0 && axis.1 == 0.0 {
                continue;
            }
            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
    }
    true
}

fn project(poly: &[(f32, f32)], (ax, ay): (f32, f32)) -> (f32, f32) {
    poly.iter()
        .map(|&(x, y)| x * ax + y * ay)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(half: f32) -> Vec<(f32, f32)> {
        vec![(-half, -half), (half, -half), (half, half), (-half, half)]
    }

    #[test]
    fn test_rejects_non_positive_cell_size() {
        assert!(SpatialIndex::new(0.0).is_err());
        assert!(SpatialIndex::new(-4.0).is_err());
        assert!(SpatialIndex::new(f32::NAN).is_err());
        assert_eq!(SpatialIndex::new(8.0).unwrap().cell_size(), 8.0);
    }

    #[test]
    fn test_potentials_find_nearby_bodies_only() {
        let mut index = SpatialIndex::default();
        let a = index.create_circle(10.0, 10.0, 5.0);
        let b = index.create_circle(18.0, 10.0, 5.0);
        let far = index.create_circle(200.0, 200.0, 5.0);
        index.update();

        let found: Vec<BodyId> = index.potentials(a).collect();
        assert_eq!(found, vec![b]);
        assert!(index.potentials(far).next().is_none());
    }

    #[test]
    fn test_potentials_span_cell_borders() {
        let mut index = SpatialIndex::new(10.0).unwrap();
        let a = index.create_circle(9.0, 9.0, 2.0);
        let b = index.create_circle(12.0, 12.0, 2.0);
        index.update();
        assert_eq!(index.potentials(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(index.potentials(b).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_lattice_points_are_adjacent_candidates() {
        let mut index = SpatialIndex::default();
        let centre = index.create_point(5.0, 5.0);
        let side = index.create_point(6.0, 5.0);
        let diagonal = index.create_point(4.0, 4.0);
        let two_away = index.create_point(7.0, 5.0);
        index.update();

        let found: Vec<BodyId> = index.potentials(centre).collect();
        assert!(found.contains(&side));
        assert!(found.contains(&diagonal));
        assert!(!found.contains(&two_away));
    }

    #[test]
    fn test_update_follows_moved_bodies() {
        let mut index = SpatialIndex::default();
        let a = index.create_circle(0.0, 0.0, 1.0);
        let b = index.create_circle(100.0, 0.0, 1.0);
        index.update();
        assert!(index.potentials(a).next().is_none());

        index.set_position(b, 1.5, 0.0);
        index.update();
        assert_eq!(index.potentials(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(index.position(b), Some((1.5, 0.0)));
    }

    #[test]
    fn test_removed_bodies_vanish_and_slots_are_reused() {
        let mut index = SpatialIndex::default();
        let a = index.create_circle(0.0, 0.0, 2.0);
        let b = index.create_circle(1.0, 0.0, 2.0);
        index.update();

        assert!(index.remove(b));
        assert!(!index.remove(b));
        assert!(index.potentials(a).next().is_none());
        assert!(!index.collides(a, b));
        assert_eq!(index.len(), 1);

        let c = index.create_point(3.0, 3.0);
        assert_eq!(c, b);
        assert!(index.contains(c));

        assert!(index.remove(a));
        assert!(index.remove(c));
        assert!(index.is_empty());
    }

    #[test]
    fn test_circle_narrow_phase() {
        let mut index = SpatialIndex::default();
        let a = index.create_circle(0.0, 0.0, 5.0);
        let touching = index.create_circle(10.0, 0.0, 5.0);
        let apart = index.create_circle(10.5, 0.0, 5.0);
        index.update();
        assert!(index.collides(a, touching));
        assert!(!index.collides(a, apart));
    }

    #[test]
    fn test_point_narrow_phase() {
        let mut index = SpatialIndex::default();
        let p = index.create_point(3.0, 4.0);
        let same = index.create_point(3.0, 4.0);
        let other = index.create_point(4.0, 4.0);
        let circle = index.create_circle(0.0, 0.0, 5.0);
        let poly = index.create_polygon(3.0, 3.0, &square(2.0), 0.0);
        index.update();
        assert!(index.collides(p, same));
        assert!(!index.collides(p, other));
        assert!(index.collides(p, circle));
        assert!(index.collides(circle, p));
        assert!(index.collides(p, poly));
        assert!(!index.collides(other, circle));
    }

    #[test]
    fn test_points_on_polygon_boundary_collide() {
        let mut index = SpatialIndex::default();
        let poly = index.create_polygon(50.0, 50.0, &square(10.0), 0.0);
        let edges = [(60.0, 50.0), (40.0, 50.0), (50.0, 40.0), (50.0, 60.0), (60.0, 60.0)];
        let on_edge: Vec<BodyId> = edges.iter().map(|&(x, y)| index.create_point(x, y)).collect();
        let outside = index.create_point(61.0, 50.0);
        index.update();

        for (point, at) in on_edge.iter().zip(edges) {
            assert!(index.collides(*point, poly), "point at {:?}", at);
            assert!(index.collides(poly, *point), "point at {:?}", at);
        }
        assert!(!index.collides(outside, poly));
    }

    #[test]
    fn test_polygon_contains_includes_boundary() {
        let poly = square(1.0);
        assert!(polygon_contains(&poly, 0.0, 0.0));
        assert!(polygon_contains(&poly, 1.0, 0.0));
        assert!(polygon_contains(&poly, 0.0, 1.0));
        assert!(polygon_contains(&poly, -1.0, -1.0));
        assert!(!polygon_contains(&poly, 1.5, 0.0));
        assert!(!polygon_contains(&poly[..2], 0.0, -1.0));
    }

    #[test]
    fn test_polygon_narrow_phase_respects_rotation() {
        let mut index = SpatialIndex::default();
        let a = index.create_polygon(0.0, 0.0, &square(1.0), 0.0);
        // Axis-aligned square at x = 2.2 misses, rotated 45 degrees its corner reaches x ~ 0.79
        let aligned = index.create_polygon(2.2, 0.0, &square(1.0), 0.0);
        let rotated = index.create_polygon(2.2, 0.0, &square(1.0), std::f32::consts::FRAC_PI_4);
        index.update();
        assert!(!index.collides(a, aligned));
        assert!(index.collides(a, rotated));
    }

    #[test]
    fn test_circle_polygon_narrow_phase() {
        let mut index = SpatialIndex::default();
        let poly = index.create_polygon(0.0, 0.0, &square(2.0), 0.0);
        let inside = index.create_circle(0.0, 0.0, 0.5);
        let edge = index.create_circle(3.0, 0.0, 1.0);
        let corner_miss = index.create_circle(3.0, 3.0, 1.0);
        index.update();
        assert!(index.collides(poly, inside));
        assert!(index.collides(edge, poly));
        assert!(!index.collides(poly, corner_miss));
    }
}
