//! tfgraph Core Types and Definitions
//!
//! This crate provides the foundational types shared by the tfgraph
//! pipeline. It includes:
//!
//! - **Identifiers**: Stable, nestable element identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Resources**: Raw resource declarations ([`resource`] module)

pub mod geometry;
pub mod identifier;
pub mod resource;
