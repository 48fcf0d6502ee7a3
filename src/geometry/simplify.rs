use crate::core::point::Point;

/// Simplifies a polyline for rendering with the given pixel tolerance.
///
/// Two passes: a cheap squared-distance reduction that drops runs of
/// near-coincident points, then Douglas–Peucker, which keeps only points
/// whose perpendicular distance to the local chord exceeds the tolerance.
/// The first and last point always survive. Sequences of two or fewer
/// points (and empty input) are returned unchanged.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let sq_tolerance = tolerance * tolerance;
    let reduced = reduce_points(points, sq_tolerance);
    douglas_peucker(&reduced, sq_tolerance)
}

/// Drops consecutive points closer than the squared tolerance
fn reduce_points(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    let mut reduced = vec![points[0]];
    let mut prev = 0;

    for i in 1..points.len() {
        if sq_dist(&points[i], &points[prev]) > sq_tolerance {
            reduced.push(points[i]);
            prev = i;
        }
    }
    if prev < points.len() - 1 {
        reduced.push(points[points.len() - 1]);
    }
    reduced
}

fn douglas_peucker(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    dp_step(points, 0, points.len() - 1, sq_tolerance, &mut keep);

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Recursive span split: keep the point of maximum perpendicular
/// distance to the chord if it exceeds the tolerance, then recurse on
/// both halves. Spans of length <= 2 are the base case.
fn dp_step(points: &[Point], first: usize, last: usize, sq_tolerance: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }

    let mut max_sq_dist = 0.0;
    let mut index = first;
    for i in (first + 1)..last {
        let sq = sq_seg_dist(&points[i], &points[first], &points[last]);
        if sq > max_sq_dist {
            max_sq_dist = sq;
            index = i;
        }
    }

    if max_sq_dist > sq_tolerance {
        keep[index] = true;
        dp_step(points, first, index, sq_tolerance, keep);
        dp_step(points, index, last, sq_tolerance, keep);
    }
}

fn sq_dist(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Squared distance from `p` to the segment `a`-`b`
fn sq_seg_dist(p: &Point, a: &Point, b: &Point) -> f64 {
    let mut x = a.x;
    let mut y = a.y;
    let mut dx = b.x - x;
    let mut dy = b.y - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((p.x - x) * dx + (p.y - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b.x;
            y = b.y;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    dx = p.x - x;
    dy = p.y - y;
    dx * dx + dy * dy
}
