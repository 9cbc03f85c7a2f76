//! Delaunay triangulation of scattered well locations
//!
//! Built incrementally with the Bowyer-Watson algorithm. Field maps hold at
//! most a few hundred wells, so triangle location is a linear scan.

use serde::{Deserialize, Serialize};

/// How far the enclosing super-triangle reaches beyond the data extent
const SUPER_SCALE: f64 = 100.0;

/// Barycentric tolerance for points lying on a triangle edge
const EDGE_TOLERANCE: f64 = -1e-10;

/// A scattered sample: planar location plus the value carried there
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl ScatterPoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Euclidean distance to a location
    #[inline]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}

/// A triangle given by three indices into the triangulated point set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [usize; 3],
}

impl Triangle {
    fn has_edge(&self, a: usize, b: usize) -> bool {
        let [v0, v1, v2] = self.vertices;
        [(v0, v1), (v1, v2), (v2, v0)]
            .iter()
            .any(|&(p, q)| (p == a && q == b) || (p == b && q == a))
    }
}

#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

impl Circumcircle {
    fn of(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<Self> {
        let (ax, ay) = a;
        let (bx, by) = b;
        let (cx, cy) = c;

        let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
        if d.abs() < 1e-12 {
            return None;
        }

        let a_sq = ax * ax + ay * ay;
        let b_sq = bx * bx + by * by;
        let c_sq = cx * cx + cy * cy;
        let ux = (a_sq * (by - cy) + b_sq * (cy - ay) + c_sq * (ay - by)) / d;
        let uy = (a_sq * (cx - bx) + b_sq * (ax - cx) + c_sq * (bx - ax)) / d;

        Some(Self {
            cx: ux,
            cy: uy,
            radius_sq: (ax - ux).powi(2) + (ay - uy).powi(2),
        })
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.cx).powi(2) + (y - self.cy).powi(2) <= self.radius_sq
    }
}

/// Delaunay triangulation over a set of scattered points
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<ScatterPoint>,
    triangles: Vec<Triangle>,
}

impl Triangulation {
    /// Triangulate the given points.
    ///
    /// Fewer than three distinct points, or all points on one line, give an
    /// empty triangulation. Coincident points after the first are ignored.
    pub fn delaunay(points: &[ScatterPoint]) -> Self {
        let triangles = bowyer_watson(points);
        Self {
            points: points.to_vec(),
            triangles,
        }
    }

    /// Points the triangulation was built from
    pub fn points(&self) -> &[ScatterPoint] {
        &self.points
    }

    /// Triangles of the triangulation
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Whether no triangle could be formed
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Find the triangle containing `(x, y)` and its barycentric coordinates
    pub fn locate(&self, x: f64, y: f64) -> Option<(&Triangle, [f64; 3])> {
        self.triangles.iter().find_map(|tri| {
            let weights = self.barycentric(tri, x, y);
            weights
                .iter()
                .all(|w| *w >= EDGE_TOLERANCE)
                .then_some((tri, weights))
        })
    }

    /// Indices of the vertices sharing an edge with `vertex`
    pub fn neighbors(&self, vertex: usize) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .triangles
            .iter()
            .filter(|tri| tri.vertices.contains(&vertex))
            .flat_map(|tri| tri.vertices)
            .filter(|&v| v != vertex)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Barycentric coordinates of `(x, y)` with respect to `tri`
    pub fn barycentric(&self, tri: &Triangle, x: f64, y: f64) -> [f64; 3] {
        let [i0, i1, i2] = tri.vertices;
        let p0 = &self.points[i0];
        let p1 = &self.points[i1];
        let p2 = &self.points[i2];

        let e1x = p1.x - p0.x;
        let e1y = p1.y - p0.y;
        let e2x = p2.x - p0.x;
        let e2y = p2.y - p0.y;
        let qx = x - p0.x;
        let qy = y - p0.y;

        let dot11 = e1x * e1x + e1y * e1y;
        let dot12 = e1x * e2x + e1y * e2y;
        let dot1q = e1x * qx + e1y * qy;
        let dot22 = e2x * e2x + e2y * e2y;
        let dot2q = e2x * qx + e2y * qy;

        let inv_denom = 1.0 / (dot11 * dot22 - dot12 * dot12);
        let v = (dot22 * dot1q - dot12 * dot2q) * inv_denom;
        let w = (dot11 * dot2q - dot12 * dot1q) * inv_denom;

        [1.0 - v - w, v, w]
    }
}

fn bowyer_watson(points: &[ScatterPoint]) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta = dx.max(dy).max(1.0);

    // Working vertices: three super-triangle corners followed by inserted points
    let mut coords: Vec<(f64, f64)> = vec![
        (min_x - SUPER_SCALE * delta, min_y - delta),
        (min_x + 0.5 * dx, max_y + SUPER_SCALE * delta),
        (max_x + SUPER_SCALE * delta, min_y - delta),
    ];
    // Original index of each inserted point
    let mut origin: Vec<usize> = Vec::with_capacity(points.len());
    let mut triangles = vec![Triangle {
        vertices: [0, 1, 2],
    }];

    let duplicate_tolerance = delta * 1e-12;

    for (index, point) in points.iter().enumerate() {
        let coincident = coords[3..]
            .iter()
            .any(|&(x, y)| (x - point.x).hypot(y - point.y) <= duplicate_tolerance);
        if coincident || !point.x.is_finite() || !point.y.is_finite() {
            continue;
        }

        let new_vertex = coords.len();
        coords.push((point.x, point.y));
        origin.push(index);

        let bad: Vec<usize> = triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| {
                let [a, b, c] = tri.vertices;
                Circumcircle::of(coords[a], coords[b], coords[c])
                    .map(|cc| cc.contains(point.x, point.y))
                    .unwrap_or(false)
            })
            .map(|(i, _)| i)
            .collect();

        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for &bi in &bad {
            let [v0, v1, v2] = triangles[bi].vertices;
            for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
                let shared = bad
                    .iter()
                    .any(|&other| other != bi && triangles[other].has_edge(a, b));
                if !shared {
                    boundary.push((a, b));
                }
            }
        }

        let mut bad_sorted = bad;
        bad_sorted.sort_unstable_by(|a, b| b.cmp(a));
        for bi in bad_sorted {
            triangles.swap_remove(bi);
        }

        for (a, b) in boundary {
            triangles.push(Triangle {
                vertices: [a, b, new_vertex],
            });
        }
    }

    triangles
        .into_iter()
        .filter(|tri| tri.vertices.iter().all(|&v| v >= 3))
        .filter(|tri| {
            let [a, b, c] = tri.vertices;
            let (ax, ay) = coords[a];
            let (bx, by) = coords[b];
            let (cx, cy) = coords[c];
            let doubled_area = ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)).abs();
            doubled_area > 1e-12 * delta * delta
        })
        .map(|tri| Triangle {
            vertices: tri.vertices.map(|v| origin[v - 3]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<ScatterPoint> {
        vec![
            ScatterPoint::new(0.0, 0.0, 1.0),
            ScatterPoint::new(10.0, 0.0, 2.0),
            ScatterPoint::new(10.0, 10.0, 3.0),
            ScatterPoint::new(0.0, 10.0, 4.0),
        ]
    }

    #[test]
    fn test_square_gives_two_triangles() {
        let tin = Triangulation::delaunay(&square());
        assert_eq!(tin.triangles().len(), 2);
    }

    #[test]
    fn test_scattered_points_cover_hull() {
        let points = vec![
            ScatterPoint::new(0.0, 0.0, 0.0),
            ScatterPoint::new(7.0, 1.0, 0.0),
            ScatterPoint::new(3.0, 6.0, 0.0),
            ScatterPoint::new(9.0, 8.0, 0.0),
            ScatterPoint::new(4.2, 2.9, 0.0),
        ];
        let tin = Triangulation::delaunay(&points);

        // Euler: 2n - 2 - h triangles for n points with h on the hull
        assert_eq!(tin.triangles().len(), 2 * 5 - 2 - 4);
        assert!(tin.locate(4.0, 3.0).is_some());
        assert!(tin.locate(-1.0, -1.0).is_none());
    }

    #[test]
    fn test_barycentric_weights_sum_to_one() {
        let tin = Triangulation::delaunay(&square());
        let (_, weights) = tin.locate(2.5, 6.0).unwrap();

        assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(weights.iter().all(|w| *w >= -1e-10));
    }

    #[test]
    fn test_degenerate_inputs() {
        let collinear = vec![
            ScatterPoint::new(0.0, 0.0, 1.0),
            ScatterPoint::new(1.0, 1.0, 1.0),
            ScatterPoint::new(2.0, 2.0, 1.0),
        ];
        assert!(Triangulation::delaunay(&collinear).is_empty());
        assert!(Triangulation::delaunay(&square()[..2]).is_empty());
    }

    #[test]
    fn test_coincident_points_are_skipped() {
        let mut points = square();
        points.push(ScatterPoint::new(10.0, 10.0, 99.0));
        let tin = Triangulation::delaunay(&points);

        assert_eq!(tin.triangles().len(), 2);
        assert!(tin
            .triangles()
            .iter()
            .all(|tri| !tri.vertices.contains(&4)));
    }

    #[test]
    fn test_neighbors() {
        let tin = Triangulation::delaunay(&square());
        let neighbors = tin.neighbors(0);

        assert!(neighbors.contains(&1));
        assert!(neighbors.contains(&3));
        assert!(!neighbors.contains(&0));
    }
}
