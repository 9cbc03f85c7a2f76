//! Scattered-data interpolation over irregular well locations
//!
//! Three interpolants are provided:
//! - `LinearTinInterpolator`: piecewise-linear over the Delaunay triangulation
//! - `CubicTinInterpolator`: cubic Bézier patches over the same triangulation,
//!   shaped by gradients estimated at each vertex
//! - `BicubicSurface`: a least-squares tensor-product bicubic polynomial
//!
//! The triangulated interpolants return NaN outside the convex hull of the
//! data. The bicubic surface is defined everywhere.

use crate::linalg::{gauss_solve, least_squares};
use crate::statistics::mean;
use crate::triangulation::{ScatterPoint, Triangle, Triangulation};
use crate::{MathError, Result};

/// Number of coefficients of a tensor-product bicubic polynomial
pub const BICUBIC_TERMS: usize = 16;

/// Piecewise-linear interpolation over a Delaunay triangulation
#[derive(Debug, Clone)]
pub struct LinearTinInterpolator {
    tin: Triangulation,
}

impl LinearTinInterpolator {
    /// Triangulate the points
    pub fn new(points: &[ScatterPoint]) -> Self {
        Self {
            tin: Triangulation::delaunay(points),
        }
    }

    /// Interpolated value at `(x, y)`, NaN outside the convex hull
    pub fn interpolate(&self, x: f64, y: f64) -> f64 {
        let points = self.tin.points();
        match self.tin.locate(x, y) {
            Some((tri, weights)) => tri
                .vertices
                .iter()
                .zip(weights.iter())
                .map(|(&v, w)| w * points[v].value)
                .sum(),
            None => f64::NAN,
        }
    }
}

/// Cubic interpolation over a Delaunay triangulation.
///
/// Each triangle carries a cubic Bézier patch whose boundary control points
/// come from the vertex values and estimated vertex gradients. The interior
/// control point follows the quadratic-precision rule, so any linear field
/// is reproduced exactly.
#[derive(Debug, Clone)]
pub struct CubicTinInterpolator {
    tin: Triangulation,
    gradients: Vec<(f64, f64)>,
}

impl CubicTinInterpolator {
    /// Triangulate the points and estimate a gradient at every vertex
    pub fn new(points: &[ScatterPoint]) -> Self {
        let tin = Triangulation::delaunay(points);
        let gradients = (0..points.len())
            .map(|vertex| estimate_gradient(&tin, vertex))
            .collect();

        Self { tin, gradients }
    }

    /// Estimated gradient at a vertex
    pub fn gradient(&self, vertex: usize) -> Option<(f64, f64)> {
        self.gradients.get(vertex).copied()
    }

    /// Interpolated value at `(x, y)`, NaN outside the convex hull
    pub fn interpolate(&self, x: f64, y: f64) -> f64 {
        match self.tin.locate(x, y) {
            Some((tri, weights)) => self.evaluate_patch(tri, weights),
            None => f64::NAN,
        }
    }

    fn evaluate_patch(&self, tri: &Triangle, weights: [f64; 3]) -> f64 {
        let points = self.tin.points();
        let [i0, i1, i2] = tri.vertices;
        let (p0, p1, p2) = (&points[i0], &points[i1], &points[i2]);

        // Control point one third of the way from `from` towards `to`
        let edge = |from: &ScatterPoint, vertex: usize, to: &ScatterPoint| {
            let (gx, gy) = self.gradients[vertex];
            from.value + (gx * (to.x - from.x) + gy * (to.y - from.y)) / 3.0
        };

        let b300 = p0.value;
        let b030 = p1.value;
        let b003 = p2.value;
        let b210 = edge(p0, i0, p1);
        let b201 = edge(p0, i0, p2);
        let b120 = edge(p1, i1, p0);
        let b021 = edge(p1, i1, p2);
        let b102 = edge(p2, i2, p0);
        let b012 = edge(p2, i2, p1);

        let edge_mean = (b210 + b201 + b120 + b021 + b102 + b012) / 6.0;
        let vertex_mean = (b300 + b030 + b003) / 3.0;
        let b111 = edge_mean + (edge_mean - vertex_mean) / 2.0;

        let [u, v, w] = weights;
        b300 * u.powi(3)
            + b030 * v.powi(3)
            + b003 * w.powi(3)
            + 3.0 * b210 * u * u * v
            + 3.0 * b201 * u * u * w
            + 3.0 * b120 * v * v * u
            + 3.0 * b021 * v * v * w
            + 3.0 * b102 * w * w * u
            + 3.0 * b012 * w * w * v
            + 6.0 * b111 * u * v * w
    }
}

/// Inverse-square-distance weighted least-squares plane through a vertex and
/// its Delaunay neighbors. Vertices without enough spread get a flat gradient.
fn estimate_gradient(tin: &Triangulation, vertex: usize) -> (f64, f64) {
    let points = tin.points();
    let origin = &points[vertex];

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    let mut sxf = 0.0;
    let mut syf = 0.0;

    for neighbor in tin.neighbors(vertex) {
        let p = &points[neighbor];
        let dx = p.x - origin.x;
        let dy = p.y - origin.y;
        let df = p.value - origin.value;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq == 0.0 {
            continue;
        }
        let weight = 1.0 / dist_sq;

        sxx += weight * dx * dx;
        sxy += weight * dx * dy;
        syy += weight * dy * dy;
        sxf += weight * dx * df;
        syf += weight * dy * df;
    }

    match gauss_solve(2, vec![sxx, sxy, sxy, syy], vec![sxf, syf]) {
        Ok(g) if g.iter().all(|c| c.is_finite()) => (g[0], g[1]),
        _ => (0.0, 0.0),
    }
}

/// Least-squares tensor-product bicubic polynomial surface
#[derive(Debug, Clone)]
pub struct BicubicSurface {
    coefficients: Vec<f64>,
    center: (f64, f64),
    scale: (f64, f64),
}

impl BicubicSurface {
    /// Fit the surface to at least sixteen scattered points
    pub fn fit(points: &[ScatterPoint]) -> Result<Self> {
        if points.len() < BICUBIC_TERMS {
            return Err(MathError::InsufficientData(format!(
                "A bicubic surface needs at least {BICUBIC_TERMS} points, got {}",
                points.len()
            )));
        }

        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let center = (mean(&xs), mean(&ys));
        let scale = (spread(&xs, center.0), spread(&ys, center.1));

        let mut surface = Self {
            coefficients: Vec::new(),
            center,
            scale,
        };

        let rows: Vec<Vec<f64>> = points.iter().map(|p| surface.terms(p.x, p.y)).collect();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        surface.coefficients = least_squares(&rows, &values)?;

        Ok(surface)
    }

    /// Surface value at `(x, y)`
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.terms(x, y)
            .iter()
            .zip(self.coefficients.iter())
            .map(|(t, c)| t * c)
            .sum()
    }

    fn terms(&self, x: f64, y: f64) -> Vec<f64> {
        let u = (x - self.center.0) / self.scale.0;
        let v = (y - self.center.1) / self.scale.1;

        let mut terms = Vec::with_capacity(BICUBIC_TERMS);
        for i in 0..4 {
            for j in 0..4 {
                terms.push(u.powi(i) * v.powi(j));
            }
        }
        terms
    }
}

fn spread(values: &[f64], center: f64) -> f64 {
    let max_dev = values
        .iter()
        .fold(0.0_f64, |acc, v| acc.max((v - center).abs()));
    if max_dev > 0.0 && max_dev.is_finite() {
        max_dev
    } else {
        1.0
    }
}
