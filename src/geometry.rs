use geo_types::Coord;

use crate::types::BoundingBox;

pub type Quad = [(f64, f64); 4];

fn quad_ring(quad: &Quad) -> Vec<Coord<f64>> {
    quad.iter().map(|&(x, y)| Coord { x, y }).collect()
}

/// Twice the signed shoelace area, summed as a fan around the first vertex.
fn signed_area2(pts: &[Coord<f64>]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }
    let o = pts[0];
    let mut sum = 0.0f64;
    for w in pts[1..].windows(2) {
        let (ax, ay) = (w[0].x - o.x, w[0].y - o.y);
        let (bx, by) = (w[1].x - o.x, w[1].y - o.y);
        sum += ax * by - bx * ay;
    }
    sum
}

/// Area of a convex ring, open or closed, in either orientation.
///
/// A convex ring whose edges are all axis-parallel is a rectangle; its area
/// is taken from the coordinate extents so that two rings with the same
/// extents always report the same area.
pub fn polygon_area(pts: &[Coord<f64>]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }
    let rectilinear = pts
        .iter()
        .zip(pts.iter().cycle().skip(1))
        .all(|(a, b)| a.x == b.x || a.y == b.y);

    let area = if rectilinear {
        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in pts {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        (x1 - x0) * (y1 - y0)
    } else {
        (signed_area2(pts) * 0.5).abs()
    };

    if area.is_finite() && area > 0.0 {
        area
    } else {
        0.0
    }
}

pub fn quad_area(quad: &Quad) -> f64 {
    polygon_area(&quad_ring(quad))
}

/// Area of a box as the ring of its corners.
///
/// Agrees with `width * height` up to rounding of `right()`/`bottom()`, and is
/// the denominator that keeps a fully contained box at a ratio of exactly 1.
pub fn box_area(b: &BoundingBox) -> f64 {
    quad_area(&b.corners())
}

/// Point where segment `a -> b` crosses the clip edge `e0 -> e1`, given the
/// signed distances `da > 0 > db` (or the reverse) of its ends.
fn crossing(
    a: Coord<f64>,
    da: f64,
    b: Coord<f64>,
    db: f64,
    e0: Coord<f64>,
    e1: Coord<f64>,
) -> Coord<f64> {
    let t = da / (da - db);
    let mut p = Coord {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    };
    // an axis-parallel edge pins one coordinate exactly
    if e0.x == e1.x {
        p.x = e0.x;
    }
    if e0.y == e1.y {
        p.y = e0.y;
    }
    p
}

/// Sutherland-Hodgman: clip `subject` against the convex ring `clip`.
///
/// Points on a clip edge count as inside, so a subject lying entirely within
/// the clip ring comes back vertex for vertex.
fn clip_convex(subject: &[Coord<f64>], clip: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let orient = signed_area2(clip);
    if !orient.is_finite() || orient == 0.0 {
        return Vec::new();
    }

    let mut output = subject.to_vec();
    for (i, &e0) in clip.iter().enumerate() {
        let e1 = clip[(i + 1) % clip.len()];
        if e0 == e1 {
            continue;
        }
        let input = std::mem::take(&mut output);
        let Some(&last) = input.last() else {
            break;
        };

        let side = |p: Coord<f64>| {
            let s = (e1.x - e0.x) * (p.y - e0.y) - (e1.y - e0.y) * (p.x - e0.x);
            if orient > 0.0 {
                s
            } else {
                -s
            }
        };

        let mut prev = last;
        let mut prev_d = side(prev);
        for &cur in &input {
            let cur_d = side(cur);
            if cur_d >= 0.0 {
                if prev_d < 0.0 && cur_d > 0.0 {
                    output.push(crossing(prev, prev_d, cur, cur_d, e0, e1));
                }
                output.push(cur);
            } else if prev_d > 0.0 {
                output.push(crossing(prev, prev_d, cur, cur_d, e0, e1));
            }
            prev = cur;
            prev_d = cur_d;
        }
    }
    output
}

/// Intersection area of two convex quadrilaterals.
pub fn quad_overlap_area(a: &Quad, b: &Quad) -> f64 {
    polygon_area(&clip_convex(&quad_ring(a), &quad_ring(b)))
}

/// Intersection area of two boxes, clipped as polygons.
pub fn overlap_area(a: &BoundingBox, b: &BoundingBox) -> f64 {
    if a.is_degenerate() || b.is_degenerate() {
        return 0.0;
    }
    // b is clipped against a, so a b inside a keeps its exact corners
    quad_overlap_area(&b.corners(), &a.corners())
}

pub fn corner_distance(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (ax, ay) = a.top_left();
    let (bx, by) = b.top_left();
    (ax - bx).hypot(ay - by)
}
