//! # Millkit Core
//!
//! Geometry kernel and mesh loading shared by the CAM and simulation crates.
//!
//! ## Contents
//!
//! - **Geometry**: triangles, meshes, plane/scanline intersection, vertical height sampling
//! - **Polylines**: chaining intersection segments into contours, collinear simplification
//! - **STL**: binary and ASCII STL parsing with format auto-detection
//! - **Types**: progress callbacks and cooperative cancellation shared across crates

pub mod error;
pub mod geometry;
pub mod stl;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use geometry::{
    chain_segments, is_closed, simplify_collinear, Aabb, Interval, Mesh, ScanAxis, Segment,
    Triangle, CHAIN_TOLERANCE,
};
pub use stl::{detect_format, load_stl, parse_stl, StlFormat};
pub use types::{progress_fn, CancelToken, ProgressCallback};

pub use nalgebra::{Point2, Point3, Vector3};
