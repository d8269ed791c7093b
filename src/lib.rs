//! anirec: anime recommendations over precomputed embedding tables.
//!
//! The crate serves two flows against artifacts produced by an upstream
//! training pipeline (it never trains anything itself):
//!
//! - content-based: rank the anime embedding table against a query
//!   title's own row by raw dot product and return the closest titles;
//! - collaborative: rank the user embedding table for similar users, pool
//!   the titles those users rate at or above their own 75th-percentile
//!   rating, drop what the query user already prefers, and return the
//!   most supported candidates.
//!
//! Modules, leaves first:
//!
//! - [`embedding`]: dense embedding tables and the id ↔ encoded-index codec
//! - [`rank`]: dot-product scoring and deterministic top-k selection
//! - [`catalog`]: anime metadata lookup and per-user preferred sets
//! - [`store`]: artifact loading (CSV/JSON) with a path-keyed cache
//! - [`config`]: explicit artifact-path configuration
//! - [`recommend`]: the service orchestrating resolve, embed, rank,
//!   resolve back
//! - [`error`]: artifact and service error types
//!
//! Absence is not failure: an unknown title or user id produces an empty
//! result, while missing or malformed artifacts produce
//! [`error::ArtifactError`]. All tables are read-only after load, so
//! concurrent calls share them without locking.
//!
//! # Examples
//!
//! Assemble a service in memory and query it:
//!
//! ```
//! use anirec::catalog::{AnimeCatalog, AnimeRecord};
//! use anirec::embedding::{EmbeddingTable, IdCodec};
//! use anirec::recommend::RecommenderBuilder;
//!
//! let catalog = AnimeCatalog::from_records(vec![
//!     AnimeRecord {
//!         anime_id: 20,
//!         name: "Naruto".into(),
//!         genres: "Action, Adventure".into(),
//!         synopsis: String::new(),
//!     },
//!     AnimeRecord {
//!         anime_id: 1735,
//!         name: "Naruto Shippuuden".into(),
//!         genres: "Action, Adventure".into(),
//!         synopsis: String::new(),
//!     },
//!     AnimeRecord {
//!         anime_id: 431,
//!         name: "Howl's Moving Castle".into(),
//!         genres: "Adventure, Drama".into(),
//!         synopsis: String::new(),
//!     },
//! ]);
//! let table = EmbeddingTable::from_rows(vec![
//!     vec![1.0, 0.0],
//!     vec![0.9, 0.1],
//!     vec![-1.0, 0.2],
//! ]);
//! let codec = IdCodec::from_pairs(vec![(20, 0), (1735, 1), (431, 2)]);
//!
//! let recommender = RecommenderBuilder::new()
//!     .with_catalog(catalog)
//!     .with_anime_domain(table, codec)
//!     .build();
//!
//! let names = recommender.recommend_by_anime(" NARUTO ", 2).unwrap();
//! assert_eq!(names[0], "Naruto Shippuuden");
//! ```

pub mod catalog;
pub mod config;
pub mod embedding;
pub mod error;
pub mod rank;
pub mod recommend;
pub mod store;

#[cfg(test)]
mod tests;

/// Initialise the env_logger backend for binaries and tests. Safe to call
/// more than once; later calls are no-ops.
pub fn init() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
