//! Genre and category lifecycle, plus the rename cascade into tracks.

pub mod cascade;
pub mod service;

pub use cascade::{replace_first_occurrence, CascadeReport, TaxonomyRenameCascader};
pub use service::TaxonomyService;
