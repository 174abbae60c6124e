//! Storage backend selection

pub mod factory;

pub use factory::{create_mapping_repository, create_mapping_store};
