//! Picking helpers working in camera-plane coordinates
//!
//! Gizmo handles are hit-tested after orthographic projection onto the camera
//! plane, so every test here is two-dimensional.

use glam::Vec2;

/// Longer sample runs switch to the exact box-vs-segment test.
const MAX_SEGMENT_SAMPLES: f32 = (1 << 16) as f32;

/// Check whether `point` lies within `precision` of the segment `end_0`–`end_1`.
///
/// The segment is sampled every `precision` units, both endpoints included,
/// and a sample hits when both coordinate differences are at most
/// `precision` (a square neighbourhood). Non-positive precision never hits.
/// The result does not depend on the order of the endpoints.
pub fn belongs_to_segment(point: Vec2, end_0: Vec2, end_1: Vec2, precision: f32) -> bool {
    if !(precision > 0.0) || !point.is_finite() {
        return false;
    }

    // Canonical endpoint order keeps the samples identical when swapped.
    let swap = end_1.x < end_0.x || (end_1.x == end_0.x && end_1.y < end_0.y);
    let (start, end) = if swap { (end_1, end_0) } else { (end_0, end_1) };

    let length = (end - start).length();
    if !length.is_finite() {
        return false;
    }

    let steps = (length / precision).ceil();
    if steps > MAX_SEGMENT_SAMPLES {
        return box_meets_segment(point, start, end, precision);
    }
    let n = steps as usize;
    if n == 0 {
        return near(point, start, precision);
    }

    let step = (end - start) / n as f32;
    (0..=n).any(|i| {
        let sample = if i == n { end } else { start + step * i as f32 };
        near(point, sample, precision)
    })
}

/// Square-neighbourhood test used for segment samples.
fn near(point: Vec2, sample: Vec2, precision: f32) -> bool {
    (point.x - sample.x).abs() <= precision && (point.y - sample.y).abs() <= precision
}

/// Whether the square of half-width `precision` around `point` touches the
/// segment. Each axis bounds the segment parameter to an interval; the square
/// and the segment meet when the intervals overlap inside [0, 1].
fn box_meets_segment(point: Vec2, start: Vec2, end: Vec2, precision: f32) -> bool {
    let d = end - start;
    let offset = point - start;
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for (o, d) in [(offset.x, d.x), (offset.y, d.y)] {
        if d == 0.0 {
            if o.abs() > precision {
                return false;
            }
            continue;
        }
        let (a, b) = ((o - precision) / d, (o + precision) / d);
        lo = lo.max(a.min(b));
        hi = hi.min(a.max(b));
    }
    lo <= hi
}

/// Euclidean-distance test used for ring samples.
pub fn within_radius(point: Vec2, sample: Vec2, radius: f32) -> bool {
    point.distance(sample) <= radius
}
