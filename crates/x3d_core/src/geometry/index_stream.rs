//! `-1`-delimited index stream decoding.
//!
//! A face whose run is empty (two delimiters in a row, or a stream that is
//! nothing but a delimiter) makes the whole stream malformed. Decoding is
//! all-or-nothing: faces are accumulated locally and only returned when the
//! entire stream has been consumed.

use thiserror::Error;

use crate::geometry::DELIMITER;
use crate::mesh::{Face, PrimitiveTypes};

/// A stream contained an empty run or a negative index other than the delimiter.
///
/// Carries no partial output. Callers treat it as "no geometry" rather than
/// propagating it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed index stream")]
pub struct MalformedIndexStream;

/// Split a stream into its delimiter-bounded runs.
///
/// A missing trailing delimiter is implied, so `[0, 1, 2]` and
/// `[0, 1, 2, -1]` yield the same single run.
fn runs(stream: &[i32]) -> impl Iterator<Item = &[i32]> {
    stream
        .strip_suffix(&[DELIMITER])
        .unwrap_or(stream)
        .split(|&value| value == DELIMITER)
}

fn run_to_indices(run: &[i32]) -> Result<Vec<u32>, MalformedIndexStream> {
    run.iter()
        .map(|&value| u32::try_from(value).map_err(|_| MalformedIndexStream))
        .collect()
}

/// Decode a stream into faces and the OR-ed primitive mask.
pub fn try_decode_faces(
    stream: &[i32],
) -> Result<(Vec<Face>, PrimitiveTypes), MalformedIndexStream> {
    let mut faces = Vec::new();
    let mut primitive_types = PrimitiveTypes::empty();

    for run in runs(stream) {
        if run.is_empty() {
            return Err(MalformedIndexStream);
        }
        let face = Face::new(run_to_indices(run)?);
        primitive_types |= face.primitive_type();
        faces.push(face);
    }

    Ok((faces, primitive_types))
}

/// Decode a stream into faces, absorbing malformed input as an empty result.
///
/// `decode_faces(&[0, 1, 2, -1, 3, 4])` yields a triangle and a line.
pub fn decode_faces(stream: &[i32]) -> (Vec<Face>, PrimitiveTypes) {
    try_decode_faces(stream).unwrap_or_else(|_| {
        log::debug!("Discarding malformed index stream of {} entries", stream.len());
        (Vec::new(), PrimitiveTypes::empty())
    })
}

/// Decode polylines into 2-index line segments, one per consecutive pair.
///
/// Every run must hold at least two indices.
pub fn try_decode_lines(stream: &[i32]) -> Result<Vec<Face>, MalformedIndexStream> {
    let mut lines = Vec::new();

    for run in runs(stream) {
        if run.len() < 2 {
            return Err(MalformedIndexStream);
        }
        let indices = run_to_indices(run)?;
        lines.extend(indices.windows(2).map(|pair| Face::new(pair.to_vec())));
    }

    Ok(lines)
}

/// Decode polylines into line segments, absorbing malformed input as an empty result.
pub fn decode_lines(stream: &[i32]) -> Vec<Face> {
    try_decode_lines(stream).unwrap_or_else(|_| {
        log::debug!("Discarding malformed polyline stream of {} entries", stream.len());
        Vec::new()
    })
}

/// Rewrite a polyline stream as a stream of independent 2-point segments.
///
/// `[0, 1, 2, -1]` becomes `[0, 1, -1, 1, 2, -1]`. Polylines with fewer
/// than two indices have no segments and are dropped.
pub fn polyline_indices_to_line_indices(stream: &[i32]) -> Vec<i32> {
    let mut segments = Vec::with_capacity(stream.len() * 3);

    for polyline in stream.split(|&value| value == DELIMITER) {
        match polyline.len() {
            0 => {}
            1 => log::debug!("Dropping single-vertex polyline {}", polyline[0]),
            _ => {
                for pair in polyline.windows(2) {
                    segments.extend_from_slice(&[pair[0], pair[1], DELIMITER]);
                }
            }
        }
    }

    segments
}
