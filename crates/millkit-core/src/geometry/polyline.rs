//! Chaining of plane-intersection segments into polylines.

use std::collections::VecDeque;

use nalgebra::Point3;

use super::triangle::Segment;

/// Endpoints closer than this are joined when chaining segments.
pub const CHAIN_TOLERANCE: f64 = 1e-3;

/// Sine of the turn angle below which a vertex is considered collinear.
const COLLINEAR_THRESHOLD: f64 = 1e-6;

/// Chain unordered segments into polylines by endpoint proximity.
///
/// Each unused segment seeds a polyline which is then extended at either end
/// by any unused segment touching it, until a full pass finds nothing to add.
/// A contour that closes on itself repeats its first point as its last.
pub fn chain_segments(segments: &[Segment], tolerance: f64) -> Vec<Vec<Point3<f64>>> {
    let near = |a: &Point3<f64>, b: &Point3<f64>| (a - b).norm() < tolerance;

    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;

        let mut chain: VecDeque<Point3<f64>> =
            VecDeque::from([segments[seed].start, segments[seed].end]);

        loop {
            let mut extended = false;

            for (i, segment) in segments.iter().enumerate() {
                if used[i] {
                    continue;
                }
                let (Some(&first), Some(&last)) = (chain.front(), chain.back()) else {
                    break;
                };
                // A closed contour stops growing.
                if chain.len() > 2 && near(&first, &last) {
                    break;
                }

                if near(&last, &segment.start) {
                    chain.push_back(segment.end);
                } else if near(&last, &segment.end) {
                    chain.push_back(segment.start);
                } else if near(&first, &segment.end) {
                    chain.push_front(segment.start);
                } else if near(&first, &segment.start) {
                    chain.push_front(segment.end);
                } else {
                    continue;
                }
                used[i] = true;
                extended = true;
            }

            if !extended {
                break;
            }
        }

        polylines.push(chain.into_iter().collect());
    }

    polylines
}

/// Whether the polyline ends where it starts.
pub fn is_closed(points: &[Point3<f64>], tolerance: f64) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 2 => (first - last).norm() < tolerance,
        _ => false,
    }
}

/// Drop interior vertices that lie on the straight line between their
/// neighbours, and consecutive duplicates.
///
/// Open polylines keep both endpoints. Closed polylines are treated as a ring,
/// so a start point in the middle of a straight edge is dropped too and the
/// ring is re-closed at the next corner.
pub fn simplify_collinear(points: &[Point3<f64>], tolerance: f64) -> Vec<Point3<f64>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    if is_closed(points, tolerance) {
        let ring = &points[..points.len() - 1];
        let n = ring.len();
        let kept: Vec<Point3<f64>> = (0..n)
            .filter(|&i| !is_redundant(&ring[(i + n - 1) % n], &ring[i], &ring[(i + 1) % n]))
            .map(|i| ring[i])
            .collect();

        if kept.len() < 3 {
            return points.to_vec();
        }
        let mut closed = kept.clone();
        closed.push(kept[0]);
        return closed;
    }

    let mut simplified = vec![points[0]];
    for i in 1..points.len() - 1 {
        let prev = simplified[simplified.len() - 1];
        if !is_redundant(&prev, &points[i], &points[i + 1]) {
            simplified.push(points[i]);
        }
    }
    simplified.push(points[points.len() - 1]);
    simplified
}

fn is_redundant(prev: &Point3<f64>, current: &Point3<f64>, next: &Point3<f64>) -> bool {
    let incoming = current - prev;
    let outgoing = next - current;
    let (len_in, len_out) = (incoming.norm(), outgoing.norm());
    if len_in < 1e-9 || len_out < 1e-9 {
        return true;
    }
    // Only straight continuations; a reversal is a real vertex.
    incoming.dot(&outgoing) > 0.0
        && incoming.cross(&outgoing).norm() <= COLLINEAR_THRESHOLD * len_in * len_out
}
