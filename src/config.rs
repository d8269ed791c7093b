//! Explicit artifact-path configuration.
//!
//! All external locations are carried in plain structs handed to
//! construction; nothing in the crate reads process-wide path state. The
//! structs serialize with serde so a deployment can keep the configuration
//! as a JSON file next to the artifacts it points at.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Artifact locations for the anime (content) domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeSourceConfig {
    /// CSV with columns `anime_id,name,genres`; extra columns ignored.
    pub metadata: PathBuf,
    /// CSV with columns `anime_id,synopsis`; extra columns ignored.
    pub synopsis: PathBuf,
    /// JSON array of equal-length float rows, one per encoded index.
    pub weights: PathBuf,
    /// JSON object mapping external anime_id to encoded index.
    pub codec: PathBuf,
}

/// Artifact locations for the user (collaborative) domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSourceConfig {
    /// JSON array of equal-length float rows, one per encoded index.
    pub weights: PathBuf,
    /// JSON object mapping external user_id to encoded index.
    pub codec: PathBuf,
    /// CSV with columns `user_id,anime_id,rating`.
    pub ratings: PathBuf,
}

/// Full configuration for [`crate::recommend::Recommender::load`].
///
/// The user domain is optional: a deployment that only serves the
/// content-based flow omits it and the user flow reports
/// [`crate::error::RecError::UserDomainUnavailable`] instead of loading
/// artifacts it was never given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Anime metadata, synopsis and embedding artifacts.
    pub anime: AnimeSourceConfig,
    /// User embedding and ratings artifacts, when the collaborative flow
    /// is deployed.
    #[serde(default)]
    pub user: Option<UserSourceConfig>,
}

impl RecommenderConfig {
    /// Configuration for the content-based flow only.
    pub fn content_only(anime: AnimeSourceConfig) -> Self {
        Self { anime, user: None }
    }

    /// Configuration with both flows enabled.
    pub fn with_user(anime: AnimeSourceConfig, user: UserSourceConfig) -> Self {
        Self { anime, user: Some(user) }
    }
}
