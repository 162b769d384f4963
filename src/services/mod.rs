pub mod advisory_service;
pub mod analyzer;
pub mod classifier;
pub mod footprint_service;
pub mod fs_service;
pub mod ingredient_resolver;
pub mod table_store;
