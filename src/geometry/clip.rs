use crate::core::{bounds::Bounds, point::Point};

// Cohen–Sutherland outcode bits, one per violated side of the clip
// rectangle. Pixel y grows downward, so min.y is the top edge.
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

/// Classifies a point against the clip rectangle
fn bit_code(p: &Point, bounds: &Bounds) -> u8 {
    let mut code = 0;

    if p.x < bounds.min.x {
        code |= LEFT;
    } else if p.x > bounds.max.x {
        code |= RIGHT;
    }

    if p.y < bounds.min.y {
        code |= TOP;
    } else if p.y > bounds.max.y {
        code |= BOTTOM;
    }

    code
}

/// Intersects the segment `a`-`b` with the first edge named by `code`,
/// checked in the fixed priority bottom, top, right, left.
///
/// Only called with a nonzero code, which guarantees the corresponding
/// delta is nonzero for any segment that was not trivially rejected, so
/// the slope terms cannot divide by zero.
fn edge_intersection(a: &Point, b: &Point, code: u8, bounds: &Bounds) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    if code & BOTTOM != 0 {
        Point::new(a.x + dx * (bounds.max.y - a.y) / dy, bounds.max.y)
    } else if code & TOP != 0 {
        Point::new(a.x + dx * (bounds.min.y - a.y) / dy, bounds.min.y)
    } else if code & RIGHT != 0 {
        Point::new(bounds.max.x, a.y + dy * (bounds.max.x - a.x) / dx)
    } else {
        Point::new(bounds.min.x, a.y + dy * (bounds.min.x - a.x) / dx)
    }
}

/// Cohen–Sutherland segment clipping.
///
/// Returns the portion of `a`-`b` inside `bounds`, or `None` when the
/// segment lies entirely outside. A segment fully inside comes back with
/// both endpoints unchanged.
pub fn clip_segment(a: Point, b: Point, bounds: &Bounds) -> Option<(Point, Point)> {
    let mut a = a;
    let mut b = b;
    let mut code_a = bit_code(&a, bounds);
    let mut code_b = bit_code(&b, bounds);

    loop {
        // Trivial accept: both inside
        if code_a | code_b == 0 {
            return Some((a, b));
        }
        // Trivial reject: both violate the same side
        if code_a & code_b != 0 {
            return None;
        }

        // Move the outside endpoint onto the first violated edge
        if code_a != 0 {
            a = edge_intersection(&a, &b, code_a, bounds);
            code_a = bit_code(&a, bounds);
        } else {
            b = edge_intersection(&a, &b, code_b, bounds);
            code_b = bit_code(&b, bounds);
        }
    }
}

/// Clips a polygon ring to a rectangle, one clip edge at a time.
///
/// For each polygon edge with both endpoints inside the current clip
/// edge, the first endpoint is kept; with exactly one inside, the
/// boundary intersection is emitted as well. Rings fully inside come
/// back unchanged (up to rotation); empty input yields empty output.
/// Rings need at least three points to be meaningful, which is the
/// caller's contract.
pub fn clip_polygon(points: &[Point], bounds: &Bounds) -> Vec<Point> {
    let mut clipped: Vec<Point> = points.to_vec();

    for edge in [LEFT, TOP, RIGHT, BOTTOM] {
        let input = clipped;
        clipped = Vec::with_capacity(input.len());

        let len = input.len();
        for i in 0..len {
            let a = input[i];
            let b = input[(i + len - 1) % len];
            let a_out = bit_code(&a, bounds) & edge != 0;
            let b_out = bit_code(&b, bounds) & edge != 0;

            if !a_out {
                if b_out {
                    clipped.push(edge_intersection(&b, &a, edge, bounds));
                }
                clipped.push(a);
            } else if !b_out {
                clipped.push(edge_intersection(&b, &a, edge, bounds));
            }
        }

        if clipped.is_empty() {
            break;
        }
    }

    clipped
}
