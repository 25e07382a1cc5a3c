//! Planar polygon triangulation by ear clipping.
//!
//! Polygons are given as vertex indices into a shared position list, so the
//! triangles produced can be appended straight onto a mesh. Winding follows
//! the order of the input loop: an ear `(prev, curr, next)` is emitted in
//! loop order, which keeps caps and hole patches consistent with the faces
//! around them.
//!
//! Polygons with holes are reduced to a single loop by cutting a bridge from
//! each hole to a visible vertex of the outer loop (holes are processed from
//! the largest to the smallest projected coordinate), then ear clipped.

use nalgebra::{Point3, Vector3};

/// Relative tolerance below which an ear counts as degenerate.
const EAR_EPSILON: f64 = 1e-12;

/// Newell normal of a closed polygon, or `None` if it has no area.
pub fn polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let mut normal = Vector3::zeros();
    let n = points.len();
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal.try_normalize(f64::EPSILON)
}

/// Orthonormal `(u, v)` spanning the plane with the given normal, `u × v = normal`.
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = helper.cross(normal).normalize();
    let v = normal.cross(&u);
    (u, v)
}

/// Signed area of a loop projected onto the plane with the given normal.
///
/// Positive when the loop runs counter-clockwise seen from the normal side.
pub fn signed_area(positions: &[Point3<f64>], polygon: &[usize], normal: &Vector3<f64>) -> f64 {
    let (u, v) = plane_basis(normal);
    let pts: Vec<(f64, f64)> = polygon
        .iter()
        .map(|&i| project(&positions[i], &u, &v))
        .collect();
    shoelace(&pts)
}

/// Whether `point` lies inside the projected loop (even-odd rule).
pub fn contains_point(
    positions: &[Point3<f64>],
    polygon: &[usize],
    point: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let (u, v) = plane_basis(normal);
    let (px, py) = project(point, &u, &v);
    let pts: Vec<(f64, f64)> = polygon
        .iter()
        .map(|&i| project(&positions[i], &u, &v))
        .collect();

    let mut inside = false;
    let n = pts.len();
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Triangulate a single loop using its own Newell normal.
///
/// Falls back to a fan when the loop has no area.
pub fn triangulate_loop(positions: &[Point3<f64>], polygon: &[usize]) -> Vec<[usize; 3]> {
    let points: Vec<Point3<f64>> = polygon.iter().map(|&i| positions[i]).collect();
    match polygon_normal(&points) {
        Some(normal) => ear_clip(positions, polygon, &normal),
        None => fan(polygon),
    }
}

/// Ear-clip a loop that runs counter-clockwise around `normal`.
///
/// If no ear can be found (self-intersecting or badly non-planar input) the
/// remainder is closed with a fan.
///
/// # Example
///
/// ```
/// use chisel::algo::triangulate::ear_clip;
/// use nalgebra::{Point3, Vector3};
///
/// // L-shaped hexagon in the XY plane
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
/// ];
/// let tris = ear_clip(&positions, &[0, 1, 2, 3, 4, 5], &Vector3::z());
/// assert_eq!(tris.len(), 4);
/// ```
pub fn ear_clip(
    positions: &[Point3<f64>],
    polygon: &[usize],
    normal: &Vector3<f64>,
) -> Vec<[usize; 3]> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    let mut remaining = polygon.to_vec();
    let mut triangles = Vec::with_capacity(polygon.len() - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let prev = remaining[(i + m - 1) % m];
            let next = remaining[(i + 1) % m];
            is_ear(positions, &remaining, prev, remaining[i], next, normal)
        });

        match ear {
            Some(i) => {
                let prev = remaining[(i + m - 1) % m];
                let next = remaining[(i + 1) % m];
                triangles.push([prev, remaining[i], next]);
                remaining.remove(i);
            }
            None => {
                log::warn!(
                    "Ear clipping stuck with {} vertices remaining, using fan triangulation",
                    remaining.len()
                );
                break;
            }
        }
    }

    triangles.extend(fan(&remaining));
    triangles
}

/// Triangulate an outer loop with holes.
///
/// `outer` must run counter-clockwise around `normal`; holes are reversed to
/// run clockwise if they do not already.
pub fn triangulate_with_holes(
    positions: &[Point3<f64>],
    outer: &[usize],
    holes: &[Vec<usize>],
    normal: &Vector3<f64>,
) -> Vec<[usize; 3]> {
    if holes.is_empty() {
        return ear_clip(positions, outer, normal);
    }
    let merged = bridge_holes(positions, outer, holes, normal);
    ear_clip(positions, &merged, normal)
}

fn bridge_holes(
    positions: &[Point3<f64>],
    outer: &[usize],
    holes: &[Vec<usize>],
    normal: &Vector3<f64>,
) -> Vec<usize> {
    let (u, v) = plane_basis(normal);
    let uv = |i: usize| project(&positions[i], &u, &v);

    let mut pending: Vec<(usize, f64, Vec<usize>)> = holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| {
            let mut hole = h.clone();
            if signed_area(positions, &hole, normal) > 0.0 {
                hole.reverse();
            }
            let (k, x) = hole
                .iter()
                .enumerate()
                .map(|(k, &i)| (k, uv(i).0))
                .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });
            (k, x, hole)
        })
        .collect();
    pending.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut polygon = outer.to_vec();

    for idx in 0..pending.len() {
        let (k, _, ref hole) = pending[idx];
        let h = hole[k];
        let hp = uv(h);

        let mut candidates: Vec<usize> = (0..polygon.len()).collect();
        candidates.sort_by(|&a, &b| dist2(uv(polygon[a]), hp).total_cmp(&dist2(uv(polygon[b]), hp)));

        let blockers = pending[idx..].iter().map(|(_, _, hole)| hole.as_slice());
        let visible = candidates.iter().copied().find(|&c| {
            let o = polygon[c];
            segment_clear(&uv, o, h, &polygon)
                && blockers.clone().all(|hole| segment_clear(&uv, o, h, hole))
        });

        let c = visible.unwrap_or_else(|| {
            log::debug!("No visible bridge for hole at vertex {}, using nearest", h);
            candidates[0]
        });

        let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
        merged.extend_from_slice(&polygon[..=c]);
        merged.extend_from_slice(&hole[k..]);
        merged.extend_from_slice(&hole[..=k]);
        merged.extend_from_slice(&polygon[c..]);
        polygon = merged;
    }

    polygon
}

/// Segment `a-b` does not properly cross any edge of the loop.
fn segment_clear<F>(uv: &F, a: usize, b: usize, polygon: &[usize]) -> bool
where
    F: Fn(usize) -> (f64, f64),
{
    let (pa, pb) = (uv(a), uv(b));
    let n = polygon.len();
    (0..n).all(|i| {
        let (c, d) = (polygon[i], polygon[(i + 1) % n]);
        if c == a || c == b || d == a || d == b {
            return true;
        }
        !segments_cross(pa, pb, uv(c), uv(d))
    })
}

fn segments_cross(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

#[inline]
fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

#[inline]
fn dist2(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)
}

#[inline]
fn project(p: &Point3<f64>, u: &Vector3<f64>, v: &Vector3<f64>) -> (f64, f64) {
    (p.coords.dot(u), p.coords.dot(v))
}

fn shoelace(pts: &[(f64, f64)]) -> f64 {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = pts[i];
            let (x1, y1) = pts[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum::<f64>()
        * 0.5
}

fn fan(polygon: &[usize]) -> Vec<[usize; 3]> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    (1..polygon.len() - 1)
        .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
        .collect()
}

fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    normal: &Vector3<f64>,
) -> bool {
    let (a, b, c) = (positions[prev], positions[curr], positions[next]);

    // Reflex and degenerate corners are never ears.
    let twice_area = (b - a).cross(&(c - a)).dot(normal);
    let scale = (b - a).norm_squared().max((c - a).norm_squared());
    if twice_area <= EAR_EPSILON * scale {
        return false;
    }

    remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .all(|&idx| !point_in_triangle(&positions[idx], &a, &b, &c, normal))
}

fn point_in_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let d1 = (b - a).cross(&(p - a)).dot(normal);
    let d2 = (c - b).cross(&(p - b)).dot(normal);
    let d3 = (a - c).cross(&(p - c)).dot(normal);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}
