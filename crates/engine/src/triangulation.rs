//! Delaunay triangulation of scattered 2-D points (Bowyer–Watson).
//!
//! Construction runs on coordinates normalized to the unit box; the stored
//! points are the caller's originals. Triangles are counter-clockwise and
//! `neighbors[t][k]` is the triangle across the edge opposite vertex `k`.

use std::collections::HashMap;

use crate::error::AnalysisError;

/// Barycentric tolerance for point location.
const INSIDE_EPS: f64 = 1e-10;
/// Half-extent of the enclosing super-triangle in normalized units.
const SUPER_EXTENT: f64 = 1e3;

#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<(f64, f64)>,
    triangles: Vec<[usize; 3]>,
    neighbors: Vec<[Option<usize>; 3]>,
    /// Per-triangle affine map from (p - v2) to (b0, b1).
    transforms: Vec<[f64; 4]>,
}

impl Triangulation {
    /// Triangulate `points`. Points must be distinct; fewer than three or an
    /// all-colinear set is an `InterpolationFailure`.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, AnalysisError> {
        if points.len() < 3 {
            return Err(AnalysisError::InterpolationFailure(format!(
                "triangulation needs 3 points, got {}",
                points.len()
            )));
        }
        let triangles = bowyer_watson(&normalized(&points));
        if triangles.is_empty() {
            return Err(AnalysisError::InterpolationFailure(
                "points are colinear; no triangles formed".to_string(),
            ));
        }

        let neighbors = link_neighbors(&triangles);
        let transforms = triangles
            .iter()
            .map(|t| affine_inverse(points[t[0]], points[t[1]], points[t[2]]))
            .collect();
        Ok(Self { points, triangles, neighbors, transforms })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn neighbors(&self) -> &[[Option<usize>; 3]] {
        &self.neighbors
    }

    /// Barycentric coordinates of `(x, y)` with respect to triangle `t`.
    pub fn barycentric(&self, t: usize, x: f64, y: f64) -> [f64; 3] {
        let [a, b, c, d] = self.transforms[t];
        let (x2, y2) = self.points[self.triangles[t][2]];
        let (dx, dy) = (x - x2, y - y2);
        let b0 = a * dx + b * dy;
        let b1 = c * dx + d * dy;
        [b0, b1, 1.0 - b0 - b1]
    }

    /// Triangle containing `(x, y)` and the point's barycentric coordinates,
    /// or `None` outside the convex hull.
    pub fn locate(&self, x: f64, y: f64) -> Option<(usize, [f64; 3])> {
        (0..self.triangles.len()).find_map(|t| {
            let bc = self.barycentric(t, x, y);
            bc.iter().all(|&v| v >= -INSIDE_EPS).then_some((t, bc))
        })
    }

    /// Adjacent vertices of every vertex, ascending.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); self.points.len()];
        for t in &self.triangles {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                if !adj[a].contains(&b) {
                    adj[a].push(b);
                }
                if !adj[b].contains(&a) {
                    adj[b].push(a);
                }
            }
        }
        for list in &mut adj {
            list.sort_unstable();
        }
        adj
    }
}

fn normalized(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let (min_x, max_x) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    let (min_y, max_y) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    let scale = (max_x - min_x).max(max_y - min_y);
    let scale = if scale > 0.0 { scale } else { 1.0 };
    points
        .iter()
        .map(|&(x, y)| ((x - min_x) / scale, (y - min_y) / scale))
        .collect()
}

fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Positive when `p` is strictly inside the circumcircle of CCW triangle `abc`.
fn in_circle(a: (f64, f64), b: (f64, f64), c: (f64, f64), p: (f64, f64)) -> f64 {
    let (adx, ady) = (a.0 - p.0, a.1 - p.1);
    let (bdx, bdy) = (b.0 - p.0, b.1 - p.1);
    let (cdx, cdy) = (c.0 - p.0, c.1 - p.1);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx) + ad * (bdx * cdy - bdy * cdx)
}

fn bowyer_watson(points: &[(f64, f64)]) -> Vec<[usize; 3]> {
    let n = points.len();
    let mut verts = points.to_vec();
    verts.push((0.5 - SUPER_EXTENT, -SUPER_EXTENT));
    verts.push((0.5 + SUPER_EXTENT, -SUPER_EXTENT));
    verts.push((0.5, SUPER_EXTENT));

    let mut tris: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];
    for i in 0..n {
        let p = verts[i];
        let (bad, keep): (Vec<[usize; 3]>, Vec<[usize; 3]>) = tris
            .into_iter()
            .partition(|t| in_circle(verts[t[0]], verts[t[1]], verts[t[2]], p) > 0.0);

        // Boundary of the cavity: edges owned by exactly one bad triangle
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for t in &bad {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        tris = keep;
        for t in &bad {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                if edge_count[&(a.min(b), a.max(b))] == 1 {
                    let tri = if orient(verts[a], verts[b], p) > 0.0 { [a, b, i] } else { [b, a, i] };
                    if orient(verts[tri[0]], verts[tri[1]], verts[tri[2]]) != 0.0 {
                        tris.push(tri);
                    }
                }
            }
        }
    }

    tris.retain(|t| t.iter().all(|&v| v < n));
    tris
}

fn link_neighbors(triangles: &[[usize; 3]]) -> Vec<[Option<usize>; 3]> {
    let mut owners: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
    for (ti, t) in triangles.iter().enumerate() {
        for k in 0..3 {
            let (a, b) = (t[(k + 1) % 3], t[(k + 2) % 3]);
            owners.entry((a.min(b), a.max(b))).or_default().push((ti, k));
        }
    }

    let mut neighbors = vec![[None; 3]; triangles.len()];
    for sharing in owners.values() {
        if let [(t1, k1), (t2, k2)] = sharing.as_slice() {
            neighbors[*t1][*k1] = Some(*t2);
            neighbors[*t2][*k2] = Some(*t1);
        }
    }
    neighbors
}

fn affine_inverse(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> [f64; 4] {
    let (m00, m01) = (p0.0 - p2.0, p1.0 - p2.0);
    let (m10, m11) = (p0.1 - p2.1, p1.1 - p2.1);
    let det = m00 * m11 - m01 * m10;
    [m11 / det, -m01 / det, -m10 / det, m00 / det]
}
