//! Geometry processing algorithms.
//!
//! - **Parameterization**: planar (axis-dominant) UV projection
//! - **Progress**: callback-based progress reporting shared by long operations

pub mod parameterize;
mod progress;

pub use progress::Progress;
