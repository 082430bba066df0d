//! Expansion of X3D triangle/line set nodes into `-1`-delimited index streams.
//!
//! The indexed variants (`IndexedTriangleSet`, `IndexedTriangleFanSet`,
//! `IndexedTriangleStripSet`) carry explicit vertex indices. The count
//! variants (`TriangleFanSet`, `TriangleStripSet`, `LineSet`) carry one
//! vertex count per primitive and consume vertices in order from a running
//! counter. Either way the output is a stream for
//! [`decode_faces`](super::decode_faces).
//!
//! When `ccw` is false every emitted triangle has its last two indices swapped.

use crate::geometry::{GeometryError, GeometryResult, DELIMITER};

fn push_triangle(stream: &mut Vec<i32>, a: i32, b: i32, c: i32, ccw: bool) {
    if ccw {
        stream.extend_from_slice(&[a, b, c, DELIMITER]);
    } else {
        stream.extend_from_slice(&[a, c, b, DELIMITER]);
    }
}

/// Emit the triangles of one fan: hub is the first vertex, each later vertex
/// closes a triangle with its predecessor.
fn push_fan(stream: &mut Vec<i32>, fan: &[i32], ccw: bool) {
    if fan.len() < 3 {
        return;
    }
    let hub = fan[0];
    for pair in fan[1..].windows(2) {
        push_triangle(stream, hub, pair[0], pair[1], ccw);
    }
}

/// Emit the triangles of one strip, alternating which window slot the new
/// vertex replaces so that winding stays consistent.
fn push_strip(stream: &mut Vec<i32>, strip: &[i32], ccw: bool) {
    if strip.len() < 3 {
        return;
    }
    let mut window = [strip[0], strip[1]];
    for (n, &next) in strip[2..].iter().enumerate() {
        push_triangle(stream, window[0], window[1], next, ccw);
        window[n & 1] = next;
    }
}

/// Sentinel-delimited runs; any negative value ends a run.
fn sentinel_runs(index: &[i32]) -> impl Iterator<Item = &[i32]> {
    index.split(|&value| value < 0).filter(|run| !run.is_empty())
}

/// Every count must reach `minimum`, and together they must not consume more
/// than the `vertex_count` vertices available.
fn check_counts(
    shape: &'static str,
    counts: &[i32],
    minimum: i32,
    vertex_count: usize,
) -> GeometryResult<()> {
    if let Some(&count) = counts.iter().find(|&&count| count < minimum) {
        return Err(GeometryError::InvalidPrimitiveCount {
            shape,
            count,
            minimum,
        });
    }

    // Counts are non-negative past the minimum check
    let total = counts
        .iter()
        .try_fold(0usize, |sum, &count| sum.checked_add(count as usize));
    let available = vertex_count.min(i32::MAX as usize);
    match total {
        Some(total) if total <= available => Ok(()),
        total => Err(GeometryError::CountMismatch {
            what: shape,
            expected: vertex_count,
            actual: total.unwrap_or(usize::MAX),
        }),
    }
}

/// Fresh vertex indices for each count, consumed from a running counter.
///
/// Counts must already have passed [`check_counts`].
fn counted_runs(counts: &[i32]) -> impl Iterator<Item = Vec<i32>> + '_ {
    let mut next = 0;
    counts.iter().map(move |&count| {
        let run = (next..next + count).collect();
        next += count;
        run
    })
}

/// `IndexedTriangleSet`: every consecutive triple is one triangle.
///
/// A trailing partial triple is ignored.
pub fn indexed_triangles(index: &[i32], ccw: bool) -> Vec<i32> {
    let mut stream = Vec::with_capacity(index.len() / 3 * 4);
    let chunks = index.chunks_exact(3);
    if !chunks.remainder().is_empty() {
        log::debug!(
            "Ignoring {} trailing indices of IndexedTriangleSet",
            chunks.remainder().len()
        );
    }
    for tri in chunks {
        push_triangle(&mut stream, tri[0], tri[1], tri[2], ccw);
    }
    stream
}

/// `IndexedTriangleFanSet`: fans separated by `-1`.
///
/// Fans with fewer than three indices produce nothing.
pub fn indexed_triangle_fans(index: &[i32], ccw: bool) -> Vec<i32> {
    let mut stream = Vec::new();
    for fan in sentinel_runs(index) {
        push_fan(&mut stream, fan, ccw);
    }
    stream
}

/// `IndexedTriangleStripSet`: strips separated by `-1`.
///
/// Strips with fewer than three indices produce nothing.
pub fn indexed_triangle_strips(index: &[i32], ccw: bool) -> Vec<i32> {
    let mut stream = Vec::new();
    for strip in sentinel_runs(index) {
        push_strip(&mut stream, strip, ccw);
    }
    stream
}

/// `TriangleFanSet`: each fan consumes `fan_count[i]` fresh vertices out of
/// `vertex_count`.
pub fn triangle_fans_from_counts(
    fan_count: &[i32],
    vertex_count: usize,
    ccw: bool,
) -> GeometryResult<Vec<i32>> {
    check_counts("TriangleFanSet", fan_count, 3, vertex_count)?;

    let mut stream = Vec::new();
    for fan in counted_runs(fan_count) {
        push_fan(&mut stream, &fan, ccw);
    }
    Ok(stream)
}

/// `TriangleStripSet`: each strip consumes `strip_count[i]` fresh vertices
/// out of `vertex_count`.
pub fn triangle_strips_from_counts(
    strip_count: &[i32],
    vertex_count: usize,
    ccw: bool,
) -> GeometryResult<Vec<i32>> {
    check_counts("TriangleStripSet", strip_count, 3, vertex_count)?;

    let mut stream = Vec::new();
    for strip in counted_runs(strip_count) {
        push_strip(&mut stream, &strip, ccw);
    }
    Ok(stream)
}

/// `LineSet`: each polyline consumes `line_count[i]` fresh vertices out of
/// `vertex_count`.
///
/// The result is a polyline stream, not a segment stream.
pub fn polylines_from_counts(line_count: &[i32], vertex_count: usize) -> GeometryResult<Vec<i32>> {
    check_counts("LineSet", line_count, 2, vertex_count)?;

    let mut stream = Vec::new();
    for line in counted_runs(line_count) {
        stream.extend(line);
        stream.push(DELIMITER);
    }
    Ok(stream)
}

/// `TriangleSet`: consecutive vertex triples.
pub fn sequential_triangles(vertex_count: usize, ccw: bool) -> Vec<i32> {
    let index: Vec<i32> = (0..vertex_count as i32).collect();
    indexed_triangles(&index, ccw)
}

/// `PointSet`: one point per vertex.
pub fn sequential_points(vertex_count: usize) -> Vec<i32> {
    sequential_faces(vertex_count, 1)
}

/// Consecutive runs of `per_face` vertices; a trailing partial run is dropped.
pub fn sequential_faces(vertex_count: usize, per_face: usize) -> Vec<i32> {
    if per_face == 0 {
        return Vec::new();
    }
    let index: Vec<i32> = (0..vertex_count as i32).collect();
    index
        .chunks_exact(per_face)
        .flat_map(|face| face.iter().copied().chain(std::iter::once(DELIMITER)))
        .collect()
}
