//! Geometry reconstruction from X3D index streams.
//!
//! X3D geometry nodes describe faces as flat integer arrays where `-1`
//! separates one face (or polyline, fan, strip) from the next. This module
//! turns those streams into [`Face`](crate::mesh::Face) lists, expands the
//! count-based and fan/strip node types into the same stream format, and
//! binds color, normal, and texture-coordinate lists onto the result.
//!
//! - [`index_stream`]: `-1`-delimited stream decoding
//! - [`primitive_set`]: fan/strip/set expansion into index streams
//! - [`attributes`]: color/normal/texcoord binding

pub mod attributes;
pub mod index_stream;
pub mod primitive_set;

pub use attributes::*;
pub use index_stream::*;
pub use primitive_set::*;

use thiserror::Error;

/// The reserved face delimiter in X3D index streams.
pub const DELIMITER: i32 = -1;

/// Validation errors raised while reconstructing geometry.
///
/// These abort the import; see [`MalformedIndexStream`] for the soft
/// failure that decoding absorbs locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("{what}: expected {expected} entries, got {actual}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{what} {index} is out of range (bound {bound})")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        bound: usize,
    },

    #[error("{shape}: vertex count {count} is below the minimum of {minimum}")]
    InvalidPrimitiveCount {
        shape: &'static str,
        count: i32,
        minimum: i32,
    },

    #[error("{what} is empty")]
    EmptyIndexStream { what: &'static str },
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
