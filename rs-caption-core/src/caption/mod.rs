//! Top-level module for caption composition.
//!
//! This module provides:
//! - Template parsing (`Template`, tokens and reorderable groups)
//! - Attribute writers quantizing raw values into labels (`Writer`)
//! - Phrasing variants, literal or computed from context (`Variant`)
//! - The replayable decision log (`Choices`)
//! - The composition driver (`Composer`) and its configuration

/// Raw attribute values supplied per composition call.
pub mod attribute;

/// Record of every random decision of a composition, for exact replay.
pub mod choices;

/// Orchestrates structure selection, group permutation, attribute writing
/// and fixed-point token expansion.
pub mod composer;

/// Composer settings and JSON configuration.
pub mod config;

/// Template grammar: `{token}` placeholders and `<group>` spans.
pub mod template;

/// Phrasing variants.
pub mod variant;

/// Value → label converters (options, codebook, bins, 2-D bins, angle).
pub mod writer;
