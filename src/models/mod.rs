pub mod analysis_types;
pub mod labels;
