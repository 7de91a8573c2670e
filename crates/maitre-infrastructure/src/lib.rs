//! Infrastructure layer for Maitre.
//!
//! Storage-facing implementations of the core's traits: the TOML archive
//! repository, the in-memory and cached dish catalogs, and path helpers.

pub mod cached_catalog;
pub mod dir_archive_repository;
pub mod dto;
pub mod memory_catalog;
pub mod paths;

pub use cached_catalog::CachedDishCatalog;
pub use dir_archive_repository::DirArchiveRepository;
pub use memory_catalog::InMemoryDishCatalog;
pub use paths::MaitrePaths;
