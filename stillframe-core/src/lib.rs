//! Core data structures for stillframe
//!
//! This crate provides the fundamental types shared by the loaders and the
//! offscreen renderer: points, point clouds, triangle meshes, axis-aligned
//! bounds, and the common error taxonomy.

pub mod bounds;
pub mod error;
pub mod mesh;
pub mod point;
pub mod point_cloud;

pub use bounds::*;
pub use error::*;
pub use mesh::*;
pub use point::*;
pub use point_cloud::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
