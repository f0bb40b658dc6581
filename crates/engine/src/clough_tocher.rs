//! Piecewise cubic, C¹ scattered-data interpolation (Clough–Tocher).
//!
//! Each Delaunay triangle is split at its centroid into three cubic Bézier
//! patches. Vertex gradients come from a global iteration that minimizes the
//! approximate curvature of the surface along every triangulation edge.
//! Outside the convex hull the interpolant is NaN.

use crate::error::AnalysisError;
use crate::triangulation::Triangulation;

const GRADIENT_TOL: f64 = 1e-6;
const GRADIENT_MAX_ITER: usize = 400;

#[derive(Debug, Clone)]
pub struct CloughTocher {
    tri: Triangulation,
    values: Vec<f64>,
    gradients: Vec<[f64; 2]>,
}

impl CloughTocher {
    /// Build the interpolant. `points` must be distinct and `values` aligned with them.
    pub fn new(points: Vec<(f64, f64)>, values: Vec<f64>) -> Result<Self, AnalysisError> {
        if points.len() != values.len() {
            return Err(AnalysisError::InterpolationFailure(format!(
                "{} points but {} values",
                points.len(),
                values.len()
            )));
        }
        let tri = Triangulation::new(points)?;
        let gradients = estimate_gradients(&tri, &values);
        Ok(Self { tri, values, gradients })
    }

    /// Interpolated value at `(x, y)`, NaN outside the convex hull.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        match self.tri.locate(x, y) {
            Some((t, b)) => self.eval_in(t, b),
            None => f64::NAN,
        }
    }

    fn eval_in(&self, t: usize, b: [f64; 3]) -> f64 {
        let v = self.tri.triangles()[t];
        let p = self.tri.points();
        let (p1, p2, p3) = (p[v[0]], p[v[1]], p[v[2]]);
        let (f1, f2, f3) = (self.values[v[0]], self.values[v[1]], self.values[v[2]]);
        let (g1, g2, g3) = (self.gradients[v[0]], self.gradients[v[1]], self.gradients[v[2]]);

        let e12 = (p2.0 - p1.0, p2.1 - p1.1);
        let e23 = (p3.0 - p2.0, p3.1 - p2.1);
        let e31 = (p1.0 - p3.0, p1.1 - p3.1);
        let dot = |g: [f64; 2], e: (f64, f64)| g[0] * e.0 + g[1] * e.1;

        // Directional derivatives along the edges, scaled by edge length
        let df12 = dot(g1, e12);
        let df21 = -dot(g2, e12);
        let df23 = dot(g2, e23);
        let df32 = -dot(g3, e23);
        let df31 = dot(g3, e31);
        let df13 = -dot(g1, e31);

        let c3000 = f1;
        let c2100 = (df12 + 3.0 * c3000) / 3.0;
        let c2010 = (df13 + 3.0 * c3000) / 3.0;
        let c0300 = f2;
        let c1200 = (df21 + 3.0 * c0300) / 3.0;
        let c0210 = (df23 + 3.0 * c0300) / 3.0;
        let c0030 = f3;
        let c1020 = (df31 + 3.0 * c0030) / 3.0;
        let c0120 = (df32 + 3.0 * c0030) / 3.0;

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        // Cross-boundary derivative must be linear along each edge; the
        // direction is towards the neighbour's centroid (or the own centroid
        // on the hull).
        let mut g = [-0.5; 3];
        for (k, nbr) in self.tri.neighbors()[t].iter().enumerate() {
            let Some(n) = *nbr else { continue };
            let nv = self.tri.triangles()[n];
            let cx = (p[nv[0]].0 + p[nv[1]].0 + p[nv[2]].0) / 3.0;
            let cy = (p[nv[0]].1 + p[nv[1]].1 + p[nv[2]].1) / 3.0;
            let c = self.tri.barycentric(t, cx, cy);
            g[k] = match k {
                0 => (2.0 * c[2] + c[1] - 1.0) / (2.0 - 3.0 * c[2] - 3.0 * c[1]),
                1 => (2.0 * c[0] + c[2] - 1.0) / (2.0 - 3.0 * c[0] - 3.0 * c[2]),
                _ => (2.0 * c[1] + c[0] - 1.0) / (2.0 - 3.0 * c[1] - 3.0 * c[0]),
            };
        }

        let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;
        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        // Barycentric coordinates in the sub-triangle containing the point;
        // the smallest coordinate becomes the centroid weight.
        let minval = b[0].min(b[1]).min(b[2]);
        let b1 = b[0] - minval;
        let b2 = b[1] - minval;
        let b3 = b[2] - minval;
        let b4 = 3.0 * minval;

        b1.powi(3) * c3000
            + 3.0 * b1 * b1 * b2 * c2100
            + 3.0 * b1 * b1 * b3 * c2010
            + 3.0 * b1 * b1 * b4 * c2001
            + 3.0 * b1 * b2 * b2 * c1200
            + 6.0 * b1 * b2 * b4 * c1101
            + 3.0 * b1 * b3 * b3 * c1020
            + 6.0 * b1 * b3 * b4 * c1011
            + 3.0 * b1 * b4 * b4 * c1002
            + b2.powi(3) * c0300
            + 3.0 * b2 * b2 * b3 * c0210
            + 3.0 * b2 * b2 * b4 * c0201
            + 3.0 * b2 * b3 * b3 * c0120
            + 6.0 * b2 * b3 * b4 * c0111
            + 3.0 * b2 * b4 * b4 * c0102
            + b3.powi(3) * c0030
            + 3.0 * b3 * b3 * b4 * c0021
            + 3.0 * b3 * b4 * b4 * c0012
            + b4.powi(3) * c0003
    }
}

/// Vertex gradients minimizing the summed squared second derivative along
/// edges, by Gauss–Seidel sweeps until the largest relative change drops
/// below tolerance.
fn estimate_gradients(tri: &Triangulation, values: &[f64]) -> Vec<[f64; 2]> {
    let points = tri.points();
    let adjacency = tri.vertex_neighbors();
    let mut grad = vec![[0.0f64; 2]; points.len()];

    for _ in 0..GRADIENT_MAX_ITER {
        let mut err = 0.0f64;
        for (i, nbrs) in adjacency.iter().enumerate() {
            let mut q = [0.0f64; 3];
            let mut s = [0.0f64; 2];
            for &j in nbrs {
                let ex = points[j].0 - points[i].0;
                let ey = points[j].1 - points[i].1;
                let l = (ex * ex + ey * ey).sqrt();
                let l3 = l * l * l;
                let df2 = -ex * grad[j][0] - ey * grad[j][1];
                let rhs = 6.0 * (values[i] - values[j]) - 2.0 * df2;
                q[0] += 4.0 * ex * ex / l3;
                q[1] += 4.0 * ex * ey / l3;
                q[2] += 4.0 * ey * ey / l3;
                s[0] += rhs * ex / l3;
                s[1] += rhs * ey / l3;
            }
            let det = q[0] * q[2] - q[1] * q[1];
            if det == 0.0 || !det.is_finite() {
                continue;
            }
            let r0 = (q[2] * s[0] - q[1] * s[1]) / det;
            let r1 = (-q[1] * s[0] + q[0] * s[1]) / det;

            let change = (grad[i][0] + r0).abs().max((grad[i][1] + r1).abs());
            grad[i] = [-r0, -r1];
            err = err.max(change / r0.abs().max(r1.abs()).max(1.0));
        }
        if err < GRADIENT_TOL {
            break;
        }
    }
    grad
}
