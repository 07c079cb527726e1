//! Narrow-phase shape-pair tests, all in world space. Polygonal pairs use
//! the separating-axis theorem over both shapes' edge normals with
//! reference/incident edge clipping; circles get direct distance and
//! Voronoi-region tests.

use crate::collision::manifold::ContactData;
use crate::dynamics::body::Body;
use crate::dynamics::boundary::Boundary;
use crate::dynamics::shape::Shape;
use crate::math::Vec2;

/// Axis-selection bias: prefer the first shape's axis unless the second is
/// meaningfully better, which keeps the chosen face stable between steps.
const RELATIVE_BIAS: f64 = 0.95;
const ABSOLUTE_BIAS: f64 = 0.01;

/// Dispatches on the ordered shape pair. The returned normal points from
/// `a` to `b`.
pub(crate) fn collide_bodies(a: &Body, b: &Body) -> Option<ContactData> {
    match (&a.shape, &b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a.pos, *ra, b.pos, *rb)
        }
        (Shape::Circle { radius }, _) => circle_polygon(a.pos, *radius, &b.world_verts),
        (_, Shape::Circle { radius }) => {
            circle_polygon(b.pos, *radius, &a.world_verts).map(ContactData::flipped)
        }
        _ => polygon_polygon(&a.world_verts, &b.world_verts),
    }
}

/// Body against a half-plane wall. The returned normal points from the body
/// into the wall.
pub(crate) fn collide_boundary(body: &Body, boundary: &Boundary) -> Option<ContactData> {
    match body.shape {
        Shape::Circle { radius } => {
            let deepest = body.pos - boundary.normal * radius;
            let penetration = boundary.penetration_of(deepest);
            if penetration <= 0.0 {
                return None;
            }
            Some(ContactData::single(-boundary.normal, penetration, deepest))
        }
        _ => {
            // Keep the two deepest vertices beyond the plane.
            let mut best: [Option<(f64, Vec2)>; 2] = [None, None];
            for &v in &body.world_verts {
                let pen = boundary.penetration_of(v);
                if pen <= 0.0 {
                    continue;
                }
                if best[0].map_or(true, |(p, _)| pen > p) {
                    best[1] = best[0];
                    best[0] = Some((pen, v));
                } else if best[1].map_or(true, |(p, _)| pen > p) {
                    best[1] = Some((pen, v));
                }
            }

            let (max_pen, first) = best[0]?;
            let mut data = ContactData::single(-boundary.normal, max_pen, first);
            if let Some((_, second)) = best[1] {
                data.contacts[1] = second;
                data.contact_count = 2;
            }
            Some(data)
        }
    }
}

fn circle_circle(pa: Vec2, ra: f64, pb: Vec2, rb: f64) -> Option<ContactData> {
    let delta = pb - pa;
    let radius = ra + rb;
    if delta.length_sqr() >= radius * radius {
        return None;
    }

    match delta.try_normalize() {
        Some(normal) => {
            let distance = delta.length();
            Some(ContactData::single(
                normal,
                radius - distance,
                pa + normal * ra,
            ))
        }
        // Concentric centers: no direction to separate along, push up.
        None => Some(ContactData::single(Vec2::UP, ra, pa)),
    }
}

/// Outward unit normal of edge `i` for a positively wound loop.
fn edge_normal(verts: &[Vec2], i: usize) -> Vec2 {
    let j = (i + 1) % verts.len();
    (verts[j] - verts[i]).perp().try_normalize().unwrap_or(Vec2::UP)
}

fn circle_polygon(center: Vec2, radius: f64, verts: &[Vec2]) -> Option<ContactData> {
    // Edge of minimum circle-center clearance.
    let mut separation = f64::MIN;
    let mut face = 0;
    for i in 0..verts.len() {
        let s = edge_normal(verts, i).dot(center - verts[i]);
        if s > radius {
            return None;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let v1 = verts[face];
    let v2 = verts[(face + 1) % verts.len()];
    let face_n = edge_normal(verts, face);

    // Center inside the polygon: separate along the clearest face.
    if separation < f64::EPSILON {
        let normal = -face_n;
        return Some(ContactData::single(
            normal,
            radius - separation,
            center + normal * radius,
        ));
    }

    // Voronoi region of the face: one of its endpoints, or the face itself.
    let dot1 = (center - v1).dot(v2 - v1);
    let dot2 = (center - v2).dot(v1 - v2);

    if dot1 <= 0.0 {
        let dist_sqr = (center - v1).length_sqr();
        if dist_sqr > radius * radius {
            return None;
        }
        let normal = (v1 - center).try_normalize().unwrap_or(Vec2::UP);
        Some(ContactData::single(
            normal,
            radius - dist_sqr.sqrt(),
            v1,
        ))
    } else if dot2 <= 0.0 {
        let dist_sqr = (center - v2).length_sqr();
        if dist_sqr > radius * radius {
            return None;
        }
        let normal = (v2 - center).try_normalize().unwrap_or(Vec2::UP);
        Some(ContactData::single(
            normal,
            radius - dist_sqr.sqrt(),
            v2,
        ))
    } else {
        let normal = -face_n;
        Some(ContactData::single(
            normal,
            radius - separation,
            center + normal * radius,
        ))
    }
}

/// Deepest penetration of `b` against any face axis of `a`. Negative values
/// mean overlap on every axis tried so far.
fn find_axis_least_penetration(a: &[Vec2], b: &[Vec2]) -> (usize, f64) {
    let mut best_distance = f64::MIN;
    let mut best_index = 0;

    for i in 0..a.len() {
        let n = edge_normal(a, i);

        // Support of b along -n.
        let mut support = b[0];
        let mut lowest = n.dot(b[0]);
        for &w in &b[1..] {
            let proj = n.dot(w);
            if proj < lowest {
                lowest = proj;
                support = w;
            }
        }

        let distance = n.dot(support - a[i]);
        if distance > best_distance {
            best_distance = distance;
            best_index = i;
        }
    }

    (best_index, best_distance)
}

/// Incident face: the face of `inc` most anti-parallel to the reference
/// normal.
fn find_incident_face(inc: &[Vec2], ref_normal: Vec2) -> (Vec2, Vec2) {
    let mut face = 0;
    let mut min_dot = f64::MAX;
    for i in 0..inc.len() {
        let dot = ref_normal.dot(edge_normal(inc, i));
        if dot < min_dot {
            min_dot = dot;
            face = i;
        }
    }
    (inc[face], inc[(face + 1) % inc.len()])
}

/// Clips the two-point face to the half-space `n . p <= c`. Returns how many
/// points survive.
fn clip(n: Vec2, c: f64, face: &mut [Vec2; 2]) -> usize {
    let mut sp = 0;
    let mut out = *face;

    let d0 = n.dot(face[0]) - c;
    let d1 = n.dot(face[1]) - c;

    if d0 <= 0.0 {
        out[sp] = face[0];
        sp += 1;
    }
    if d1 <= 0.0 {
        out[sp] = face[1];
        sp += 1;
    }
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out[sp] = face[0] + (face[1] - face[0]) * t;
        sp += 1;
    }

    *face = out;
    sp
}

fn bias_greater_than(a: f64, b: f64) -> bool {
    a >= b * RELATIVE_BIAS + a * ABSOLUTE_BIAS
}

fn polygon_polygon(av: &[Vec2], bv: &[Vec2]) -> Option<ContactData> {
    let (face_a, pen_a) = find_axis_least_penetration(av, bv);
    if pen_a >= 0.0 {
        return None;
    }
    let (face_b, pen_b) = find_axis_least_penetration(bv, av);
    if pen_b >= 0.0 {
        return None;
    }

    // Reference face owner; flip keeps the manifold normal pointing a -> b.
    let (ref_poly, inc_poly, ref_index, flip) = if bias_greater_than(pen_a, pen_b) {
        (av, bv, face_a, false)
    } else {
        (bv, av, face_b, true)
    };

    let v1 = ref_poly[ref_index];
    let v2 = ref_poly[(ref_index + 1) % ref_poly.len()];
    let ref_normal = edge_normal(ref_poly, ref_index);

    let mut incident = {
        let (i0, i1) = find_incident_face(inc_poly, ref_normal);
        [i0, i1]
    };

    let side = (v2 - v1).try_normalize()?;
    let neg_side = -side.dot(v1);
    let pos_side = side.dot(v2);

    // Clip to the reference face's side planes; roundoff can drop points.
    if clip(-side, neg_side, &mut incident) < 2 {
        return None;
    }
    if clip(side, pos_side, &mut incident) < 2 {
        return None;
    }

    let ref_c = ref_normal.dot(v1);
    let mut contacts = [Vec2::ZERO; 2];
    let mut count = 0;
    let mut penetration = 0.0;

    for p in incident {
        let separation = ref_normal.dot(p) - ref_c;
        if separation <= 0.0 {
            contacts[count] = p;
            count += 1;
            penetration += -separation;
        }
    }
    if count == 0 {
        return None;
    }
    penetration /= count as f64;

    Some(ContactData {
        normal: if flip { -ref_normal } else { ref_normal },
        penetration,
        contacts,
        contact_count: count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::boundary::BoundaryEdge;
    use approx::assert_relative_eq;

    fn square(cx: f64, cy: f64, half: f64) -> Vec<Vec2> {
        vec![
            Vec2::new(cx - half, cy - half),
            Vec2::new(cx + half, cy - half),
            Vec2::new(cx + half, cy + half),
            Vec2::new(cx - half, cy + half),
        ]
    }

    #[test]
    fn circle_circle_separated_and_touching() {
        assert!(circle_circle(Vec2::ZERO, 10.0, Vec2::new(30.0, 0.0), 10.0).is_none());
        // Exactly touching is not a contact.
        assert!(circle_circle(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0).is_none());
    }

    #[test]
    fn circle_circle_overlap_normal_and_depth() {
        let m = circle_circle(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0).unwrap();
        assert_relative_eq!(m.normal.x, 1.0);
        assert_relative_eq!(m.normal.y, 0.0);
        assert_relative_eq!(m.penetration, 5.0);
        assert_relative_eq!(m.contacts[0].x, 10.0);
        assert_eq!(m.contact_count, 1);
    }

    #[test]
    fn concentric_circles_push_up() {
        let m = circle_circle(Vec2::new(4.0, 4.0), 10.0, Vec2::new(4.0, 4.0), 8.0).unwrap();
        assert_relative_eq!(m.normal.x, 0.0);
        assert_relative_eq!(m.normal.y, -1.0);
        assert_relative_eq!(m.penetration, 10.0);
    }

    #[test]
    fn circle_polygon_face_contact() {
        // Circle left of a square, overlapping its left face.
        let verts = square(0.0, 0.0, 10.0);
        let m = circle_polygon(Vec2::new(-12.0, 0.0), 5.0, &verts).unwrap();

        // Normal from the circle toward the polygon.
        assert_relative_eq!(m.normal.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(m.normal.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.penetration, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn circle_polygon_vertex_contact() {
        let verts = square(0.0, 0.0, 10.0);
        // Closest feature is the corner (10, 10).
        let center = Vec2::new(13.0, 13.0);
        let m = circle_polygon(center, 5.0, &verts).unwrap();

        let expected = (Vec2::new(10.0, 10.0) - center).try_normalize().unwrap();
        assert_relative_eq!(m.normal.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(m.normal.y, expected.y, epsilon = 1e-9);
        let dist = (center - Vec2::new(10.0, 10.0)).length();
        assert_relative_eq!(m.penetration, 5.0 - dist, epsilon = 1e-9);
        assert_relative_eq!(m.contacts[0].x, 10.0);
        assert_relative_eq!(m.contacts[0].y, 10.0);
    }

    #[test]
    fn circle_polygon_miss_past_corner() {
        let verts = square(0.0, 0.0, 10.0);
        assert!(circle_polygon(Vec2::new(16.0, 16.0), 5.0, &verts).is_none());
    }

    #[test]
    fn sat_reports_gap() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(25.0, 0.0, 10.0);
        assert!(polygon_polygon(&a, &b).is_none());
    }

    #[test]
    fn sat_overlap_two_point_manifold() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(15.0, 0.0, 10.0);
        let m = polygon_polygon(&a, &b).unwrap();

        assert_relative_eq!(m.normal.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(m.normal.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.penetration, 5.0, epsilon = 1e-9);
        assert_eq!(m.contact_count, 2);
        for p in &m.contacts[..m.contact_count] {
            // Contacts lie on the incident face of a, inside b.
            assert_relative_eq!(p.x, 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn sat_normal_flips_with_argument_order() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(15.0, 0.0, 10.0);
        let ab = polygon_polygon(&a, &b).unwrap();
        let ba = polygon_polygon(&b, &a).unwrap();
        assert_relative_eq!(ab.normal.x, -ba.normal.x, epsilon = 1e-9);
        assert_relative_eq!(ab.normal.y, -ba.normal.y, epsilon = 1e-9);
    }

    #[test]
    fn clip_keeps_inside_and_interpolates() {
        let mut face = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)];
        let n = Vec2::new(1.0, 0.0);
        let kept = clip(n, 4.0, &mut face);
        assert_eq!(kept, 2);
        assert_relative_eq!(face[0].x, 0.0);
        assert_relative_eq!(face[1].x, 4.0);
    }

    #[test]
    fn boundary_contact_picks_deepest_vertices() {
        let floor = Boundary::new(BoundaryEdge::Bottom, 800.0, 600.0);

        let mut body = crate::dynamics::body::Body::from_def(
            crate::dynamics::body::BodyDef::new(crate::dynamics::shape::ShapeDef::Rect {
                pos: Vec2::new(400.0, 598.0),
                width: 20.0,
                height: 10.0,
            }),
            crate::dynamics::body::BodyId(0),
        )
        .unwrap();
        body.init_body_data();

        let m = collide_boundary(&body, &floor).unwrap();
        assert_eq!(m.contact_count, 2);
        assert_relative_eq!(m.penetration, 3.0, epsilon = 1e-9);
        // Normal points out of the world.
        assert_relative_eq!(m.normal.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_ignores_contained_body() {
        let floor = Boundary::new(BoundaryEdge::Bottom, 800.0, 600.0);
        let mut body = crate::dynamics::body::Body::from_def(
            crate::dynamics::body::BodyDef::new(crate::dynamics::shape::ShapeDef::Circle {
                center: Vec2::new(400.0, 300.0),
                radius: 10.0,
            }),
            crate::dynamics::body::BodyId(0),
        )
        .unwrap();
        body.init_body_data();
        assert!(collide_boundary(&body, &floor).is_none());

        body.set_pos(Vec2::new(400.0, 595.0));
        let m = collide_boundary(&body, &floor).unwrap();
        assert_relative_eq!(m.penetration, 5.0, epsilon = 1e-9);
        assert_relative_eq!(m.contacts[0].y, 605.0, epsilon = 1e-9);
    }
}
