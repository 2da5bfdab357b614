//! # Geometry Kernel
//!
//! Triangle meshes and the intersection primitives the toolpath generators are
//! built on. All queries tolerate degenerate triangles: anything that would
//! produce a zero-length or non-finite result comes back as `None` and is
//! skipped by callers.

mod mesh;
mod polyline;
mod triangle;

pub use mesh::{Aabb, Mesh};
pub use polyline::{chain_segments, is_closed, simplify_collinear, CHAIN_TOLERANCE};
pub use triangle::{Interval, ScanAxis, Segment, Triangle};

/// Deltas smaller than this along the tested axis are treated as parallel.
pub const PLANE_EPSILON: f64 = 1e-12;

/// Slack on the edge interpolation parameter so crossings at a vertex are kept.
pub const PARAM_EPSILON: f64 = 1e-8;

/// Barycentric weights above `-BARYCENTRIC_EPSILON` count as inside.
pub const BARYCENTRIC_EPSILON: f64 = 1e-9;
