//! Flowsnap Core Types and Definitions
//!
//! This crate provides the foundational types for reconstructing flowchart
//! graphs from object-detector output. It includes:
//!
//! - **Geometry**: Points, bounds and the four box sides ([`geometry`] module)
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Detection**: Raw detector boxes and their class vocabulary ([`detection`] module)
//! - **Shape**: Accepted shape detections with anchors and labels ([`shape`] module)

pub mod color;
pub mod detection;
pub mod geometry;
pub mod shape;
