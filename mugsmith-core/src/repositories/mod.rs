//! Shared, deduplicated resources referenced by ID from the design state.

pub mod fonts;
pub mod images;
