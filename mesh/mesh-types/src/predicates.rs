//! Exact geometric predicates.
//!
//! Thin wrappers over Shewchuk's adaptive predicates from the `robust`
//! crate, with a sign convention matching the mesh winding rules:
//!
//! - [`orient3d`] is positive when `d` lies on the side of triangle
//!   `(a, b, c)` that its counter-clockwise normal points to.
//! - A tetrahedron `[v0, v1, v2, v3]` is positively oriented when
//!   `orient3d(v0, v1, v2, v3) > 0`.
//!
//! On top of the raw predicates this module answers the combinatorial
//! question meshing code keeps asking: do two triangles intersect in a way
//! that is not explained by the vertices they share?

use nalgebra::Point3;
use robust::{Coord, Coord3D};

#[inline]
fn c3(p: &Point3<f64>) -> Coord3D<f64> {
    Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

/// Orientation of `d` relative to the plane of `(a, b, c)`.
///
/// Returns six times the signed volume of tetrahedron `(a, b, c, d)`
/// (computed exactly in sign): positive when `d` is on the normal side of
/// the counter-clockwise triangle `(a, b, c)`, zero when coplanar.
#[inline]
#[must_use]
pub fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    -robust::orient3d(c3(a), c3(b), c3(c), c3(d))
}

/// Circumsphere test.
///
/// Positive when `e` lies strictly inside the sphere through `a, b, c, d`,
/// negative outside, zero on the sphere or for a flat tetrahedron. The
/// orientation of `(a, b, c, d)` does not matter.
#[must_use]
pub fn in_sphere(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
    e: &Point3<f64>,
) -> f64 {
    let orient = robust::orient3d(c3(a), c3(b), c3(c), c3(d));
    if orient == 0.0 {
        return 0.0;
    }
    robust::insphere(c3(a), c3(b), c3(c), c3(d), c3(e)) * orient.signum()
}

/// Axis dropped when projecting a plane to 2D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropAxis {
    X,
    Y,
    Z,
}

fn drop_axis(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> DropAxis {
    let n = (b - a).cross(&(c - a));
    let (x, y, z) = (n.x.abs(), n.y.abs(), n.z.abs());
    if x >= y && x >= z {
        DropAxis::X
    } else if y >= z {
        DropAxis::Y
    } else {
        DropAxis::Z
    }
}

#[inline]
fn project(p: &Point3<f64>, axis: DropAxis) -> Coord<f64> {
    match axis {
        DropAxis::X => Coord { x: p.y, y: p.z },
        DropAxis::Y => Coord { x: p.z, y: p.x },
        DropAxis::Z => Coord { x: p.x, y: p.y },
    }
}

#[inline]
fn orient2d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, axis: DropAxis) -> f64 {
    robust::orient2d(project(a, axis), project(b, axis), project(c, axis))
}

#[inline]
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Closed 2D segment intersection between coplanar segments `pq` and `rs`.
fn segments_intersect_2d(
    p: &Point3<f64>,
    q: &Point3<f64>,
    r: &Point3<f64>,
    s: &Point3<f64>,
    axis: DropAxis,
) -> bool {
    let d1 = sign(orient2d(p, q, r, axis));
    let d2 = sign(orient2d(p, q, s, axis));
    let d3 = sign(orient2d(r, s, p, axis));
    let d4 = sign(orient2d(r, s, q, axis));

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    let on_segment = |a: &Point3<f64>, b: &Point3<f64>, x: &Point3<f64>| {
        let (pa, pb, px) = (project(a, axis), project(b, axis), project(x, axis));
        px.x >= pa.x.min(pb.x)
            && px.x <= pa.x.max(pb.x)
            && px.y >= pa.y.min(pb.y)
            && px.y <= pa.y.max(pb.y)
    };

    (d1 == 0 && on_segment(p, q, r))
        || (d2 == 0 && on_segment(p, q, s))
        || (d3 == 0 && on_segment(r, s, p))
        || (d4 == 0 && on_segment(r, s, q))
}

/// Closed 2D point-in-triangle test for a point coplanar with the triangle.
fn point_in_triangle_2d(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    axis: DropAxis,
) -> bool {
    let s1 = sign(orient2d(a, b, p, axis));
    let s2 = sign(orient2d(b, c, p, axis));
    let s3 = sign(orient2d(c, a, p, axis));
    let has_neg = s1 < 0 || s2 < 0 || s3 < 0;
    let has_pos = s1 > 0 || s2 > 0 || s3 > 0;
    !(has_neg && has_pos)
}

/// Check if the closed segment `pq` intersects the closed triangle `(a, b, c)`.
#[must_use]
pub fn segment_intersects_triangle(
    p: &Point3<f64>,
    q: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> bool {
    let op = sign(orient3d(a, b, c, p));
    let oq = sign(orient3d(a, b, c, q));
    if op * oq > 0 {
        return false;
    }

    if op == 0 && oq == 0 {
        let axis = drop_axis(a, b, c);
        return point_in_triangle_2d(p, a, b, c, axis)
            || point_in_triangle_2d(q, a, b, c, axis)
            || segments_intersect_2d(p, q, a, b, axis)
            || segments_intersect_2d(p, q, b, c, axis)
            || segments_intersect_2d(p, q, c, a, axis);
    }

    // The segment crosses or touches the plane; the crossing point lies in
    // the closed triangle iff the line passes on the same side of all edges.
    let s1 = sign(orient3d(p, q, a, b));
    let s2 = sign(orient3d(p, q, b, c));
    let s3 = sign(orient3d(p, q, c, a));
    let has_neg = s1 < 0 || s2 < 0 || s3 < 0;
    let has_pos = s1 > 0 || s2 > 0 || s3 > 0;
    !(has_neg && has_pos)
}

/// Check if `x` lies strictly inside the open cone at `s` spanned by
/// `b1 - s` and `b2 - s`, all points coplanar.
fn strictly_inside_cone(
    s: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
    x: &Point3<f64>,
    axis: DropAxis,
) -> bool {
    let turn = sign(orient2d(s, b1, b2, axis));
    turn != 0 && sign(orient2d(s, b1, x, axis)) == turn && sign(orient2d(s, x, b2, axis)) == turn
}

/// Check if rays `s -> x` and `s -> y` coincide.
fn same_ray(s: &Point3<f64>, x: &Point3<f64>, y: &Point3<f64>, axis: DropAxis) -> bool {
    orient2d(s, x, y, axis) == 0.0 && (x - s).dot(&(y - s)) > 0.0
}

/// Check if `x` lies in the closed cone at `s` of triangle `(s, b1, b2)`,
/// excluding the apex itself, with `x` coplanar to that triangle.
fn in_closed_cone(
    s: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
    x: &Point3<f64>,
    axis: DropAxis,
) -> bool {
    strictly_inside_cone(s, b1, b2, x, axis)
        || same_ray(s, b1, x, axis)
        || same_ray(s, b2, x, axis)
}

/// Index positions of the vertices shared by two index triples.
fn shared_slots(ta: &[u32; 3], tb: &[u32; 3]) -> Vec<(usize, usize)> {
    let mut shared = Vec::with_capacity(3);
    for (i, va) in ta.iter().enumerate() {
        for (j, vb) in tb.iter().enumerate() {
            if va == vb {
                shared.push((i, j));
            }
        }
    }
    shared
}

/// Check if two indexed triangles intersect improperly.
///
/// Triangles sharing an edge or a vertex may touch along it; anything
/// beyond that contact (overlap, crossing, touching elsewhere) counts as an
/// intersection. Triangles sharing all three vertices always intersect.
/// Indices refer to `points`; callers guarantee they are in range.
#[must_use]
pub fn triangles_intersect(ta: [u32; 3], tb: [u32; 3], points: &[Point3<f64>]) -> bool {
    let pa = ta.map(|i| points[i as usize]);
    let pb = tb.map(|i| points[i as usize]);
    let shared = shared_slots(&ta, &tb);

    match shared.len() {
        0 => disjoint_triangles_intersect(&pa, &pb),
        1 => {
            let (i, j) = shared[0];
            let s = pa[i];
            let (a1, a2) = (pa[(i + 1) % 3], pa[(i + 2) % 3]);
            let (b1, b2) = (pb[(j + 1) % 3], pb[(j + 2) % 3]);
            vertex_sharing_triangles_intersect(&s, &a1, &a2, &b1, &b2)
        }
        2 => {
            let (i0, j0) = shared[0];
            let (i1, _) = shared[1];
            let u = pa[i0];
            let v = pa[i1];
            let a = pa[3 - i0 - i1];
            let b = pb[3 - j0 - shared[1].1];
            if orient3d(&u, &v, &a, &b) != 0.0 {
                return false;
            }
            // Coplanar fold-over: the far vertices lie on the same side of
            // the shared edge.
            let axis = drop_axis(&u, &v, &a);
            sign(orient2d(&u, &v, &a, axis)) == sign(orient2d(&u, &v, &b, axis))
        }
        _ => true,
    }
}

fn disjoint_triangles_intersect(pa: &[Point3<f64>; 3], pb: &[Point3<f64>; 3]) -> bool {
    for k in 0..3 {
        let (p, q) = (&pa[k], &pa[(k + 1) % 3]);
        if segment_intersects_triangle(p, q, &pb[0], &pb[1], &pb[2]) {
            return true;
        }
        let (p, q) = (&pb[k], &pb[(k + 1) % 3]);
        if segment_intersects_triangle(p, q, &pa[0], &pa[1], &pa[2]) {
            return true;
        }
    }
    false
}

fn vertex_sharing_triangles_intersect(
    s: &Point3<f64>,
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> bool {
    let a1_in_b = orient3d(s, b1, b2, a1) == 0.0;
    let a2_in_b = orient3d(s, b1, b2, a2) == 0.0;
    let b1_in_a = orient3d(s, a1, a2, b1) == 0.0;
    let b2_in_a = orient3d(s, a1, a2, b2) == 0.0;

    if a1_in_b && a2_in_b {
        // Coplanar: interiors overlap iff the open cones at `s` overlap.
        let axis = drop_axis(s, b1, b2);
        let both_rays_shared = (same_ray(s, a1, b1, axis) && same_ray(s, a2, b2, axis))
            || (same_ray(s, a1, b2, axis) && same_ray(s, a2, b1, axis));
        return both_rays_shared
            || strictly_inside_cone(s, b1, b2, a1, axis)
            || strictly_inside_cone(s, b1, b2, a2, axis)
            || strictly_inside_cone(s, a1, a2, b1, axis)
            || strictly_inside_cone(s, a1, a2, b2, axis);
    }

    if segment_intersects_triangle(a1, a2, s, b1, b2)
        || segment_intersects_triangle(b1, b2, s, a1, a2)
    {
        return true;
    }

    // An edge leaving `s` that lies in the other plane and inside the other
    // triangle's cone overlaps that triangle along a segment.
    let axis_b = drop_axis(s, b1, b2);
    let axis_a = drop_axis(s, a1, a2);
    (a1_in_b && in_closed_cone(s, b1, b2, a1, axis_b))
        || (a2_in_b && in_closed_cone(s, b1, b2, a2, axis_b))
        || (b1_in_a && in_closed_cone(s, a1, a2, b1, axis_a))
        || (b2_in_a && in_closed_cone(s, a1, a2, b2, axis_a))
}

/// Check if `p` lies strictly inside the tetrahedron `(a, b, c, d)`.
///
/// The tetrahedron may have either orientation; flat tetrahedra contain
/// nothing.
#[must_use]
pub fn point_strictly_in_tetrahedron(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> bool {
    let o = sign(orient3d(a, b, c, d));
    if o == 0 {
        return false;
    }
    sign(orient3d(p, b, c, d)) == o
        && sign(orient3d(a, p, c, d)) == o
        && sign(orient3d(a, b, p, d)) == o
        && sign(orient3d(a, b, c, p)) == o
}
