//! Transformation module.
//!
//! - Profile: enumerations, fallbacks and objective defaults
//! - Inherit: forward-fill of campaign fields onto adset rows
//! - Rows / Defaults: per-row validation and default resolution
//! - Assembler: fixed-shape output tables
//! - Engine: one-pass transform
//! - Pipeline: parsing + transform + stats, with logging

pub mod assembler;
pub mod defaults;
pub mod engine;
pub mod inherit;
pub mod pipeline;
pub mod profile;
pub mod rows;

pub use assembler::{assemble, ErrorTable, MappedTable, TransformOutput};
pub use engine::transform;
pub use profile::{validate_profile, MappingProfile};
pub use pipeline::*;
