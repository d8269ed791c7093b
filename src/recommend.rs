//! Recommendation service: resolve, embed, rank, resolve back.
//!
//! [`Recommender`] owns the catalog and the embedding domains and exposes
//! the two public flows:
//!
//! - content-based: [`Recommender::similar_anime`] /
//!   [`Recommender::recommend_by_anime`] rank the anime embedding table
//!   against the query title's own row;
//! - collaborative: [`Recommender::recommend_by_user`] ranks the user
//!   table for similar users, then aggregates what those users prefer and
//!   the query user has not already preferred.
//!
//! Per-entity misses (unknown title, id absent from a codec, candidate
//! that no longer resolves) degrade to empty or partial results and are
//! logged; they are never errors. Errors are reserved for artifact
//! loading failures and for invoking the user flow on a service built
//! without the user domain.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use log::{debug, info, warn};

use crate::catalog::{normalize_name, AnimeCatalog, RatingsTable};
use crate::config::RecommenderConfig;
use crate::embedding::{EmbeddingTable, IdCodec};
use crate::error::{ArtifactError, RecError, Result};
use crate::rank::{rank, RankMode};
use crate::store::{self, EmbeddingStore};

/// One scored content-based match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimeMatch {
    /// External id of the matched anime.
    pub anime_id: i64,
    /// Display title.
    pub name: String,
    /// Genre list from the catalog.
    pub genres: String,
    /// Raw dot-product similarity against the query row.
    pub score: f64,
}

/// One collaborative candidate with its support across similar users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecommendation {
    /// Display title.
    pub name: String,
    /// How many similar users' preferred sets contain this title.
    pub support: usize,
    /// Genre list from the catalog.
    pub genres: String,
    /// Synopsis from the catalog; empty when the artifact had none.
    pub synopsis: String,
}

struct UserDomain {
    table: Arc<EmbeddingTable>,
    codec: Arc<IdCodec>,
    ratings: RatingsTable,
}

/// The assembled recommendation service. Read-only after construction;
/// shared immutable tables make concurrent calls safe.
pub struct Recommender {
    catalog: AnimeCatalog,
    table: Arc<EmbeddingTable>,
    codec: Arc<IdCodec>,
    user: Option<UserDomain>,
}

impl Recommender {
    /// Loads every configured artifact and assembles the service.
    ///
    /// One-shot convenience over [`Recommender::load_with`]; hosts that
    /// build several services over shared artifacts should keep their own
    /// [`EmbeddingStore`] so repeated paths hit its cache.
    pub fn load(config: &RecommenderConfig) -> std::result::Result<Self, ArtifactError> {
        Self::load_with(&EmbeddingStore::new(), config)
    }

    /// Loads artifacts through the given store and assembles the service.
    pub fn load_with(
        store: &EmbeddingStore,
        config: &RecommenderConfig,
    ) -> std::result::Result<Self, ArtifactError> {
        info!("Loading recommender artifacts");
        let catalog = store::load_catalog(&config.anime.metadata, &config.anime.synopsis)?;
        let (table, codec) = store.domain(&config.anime.weights, &config.anime.codec)?;

        let user = match &config.user {
            Some(cfg) => {
                let (utable, ucodec) = store.domain(&cfg.weights, &cfg.codec)?;
                let ratings = store::load_ratings(&cfg.ratings)?;
                Some(UserDomain { table: utable, codec: ucodec, ratings })
            }
            None => {
                debug!("No user domain configured; collaborative flow disabled");
                None
            }
        };

        info!(
            "Recommender ready: {} catalog records, {} embedded anime, user domain: {}",
            catalog.len(),
            table.nitems(),
            user.is_some()
        );
        Ok(Self { catalog, table, codec, user })
    }

    /// The loaded catalog.
    pub fn catalog(&self) -> &AnimeCatalog {
        &self.catalog
    }

    /// True when the collaborative flow is available.
    pub fn has_user_domain(&self) -> bool {
        self.user.is_some()
    }

    /// Ranks the catalog against `name`'s embedding row and returns up to
    /// `k` scored matches, best first.
    ///
    /// An unknown title, or a title whose id is missing from the codec,
    /// yields `Ok` with an empty vector. Rows that fail to decode or
    /// resolve on the way back are skipped, never fatal.
    pub fn similar_anime(&self, name: &str, k: usize) -> Result<Vec<AnimeMatch>> {
        info!("similar_anime query '{}' (k={})", name, k);

        let Some(record) = self.catalog.resolve_by_name(name) else {
            warn!("no catalog entry matches '{}'", name);
            return Ok(Vec::new());
        };
        let Some(encoded) = self.codec.encode(record.anime_id) else {
            warn!("anime_id {} ('{}') missing from embedding codec", record.anime_id, record.name);
            return Ok(Vec::new());
        };

        let query = self.table.row(encoded);
        let ranked = rank(&query, &self.table, Some(encoded), k, RankMode::Nearest);
        debug!("query row {} ranked, {} candidates", encoded, ranked.len());

        // Filtering skipped rows preserves rank order.
        let mut matches = Vec::with_capacity(ranked.len());
        for (index, score) in ranked {
            let Some(anime_id) = self.codec.decode(index) else {
                warn!("encoded index {} has no external id, skipping", index);
                continue;
            };
            let Some(hit) = self.catalog.resolve_by_id(anime_id) else {
                warn!("anime_id {} not in catalog, skipping", anime_id);
                continue;
            };
            matches.push(AnimeMatch {
                anime_id,
                name: hit.name.clone(),
                genres: hit.genres.clone(),
                score,
            });
        }

        debug!("similar_anime('{}') -> {} matches", name, matches.len());
        Ok(matches)
    }

    /// Content-based flow returning display names only, best first.
    pub fn recommend_by_anime(&self, name: &str, k: usize) -> Result<Vec<String>> {
        Ok(self.similar_anime(name, k)?.into_iter().map(|m| m.name).collect())
    }

    /// Collaborative flow: find up to `k` users with the most similar
    /// embedding rows, pool the titles they prefer that the query user
    /// does not already prefer, and return the `k` most supported.
    ///
    /// Candidates aggregate by normalized title; support ties keep
    /// first-encounter order (similar users in rank order, each user's
    /// titles in preferred order). An unknown user id yields `Ok` with an
    /// empty vector. Returns [`RecError::UserDomainUnavailable`] when the
    /// service was assembled without the user domain.
    pub fn recommend_by_user(&self, user_id: i64, k: usize) -> Result<Vec<UserRecommendation>> {
        info!("recommend_by_user query {} (k={})", user_id, k);

        let Some(domain) = &self.user else {
            return Err(RecError::UserDomainUnavailable);
        };
        let Some(encoded) = domain.codec.encode(user_id) else {
            warn!("user_id {} missing from user codec", user_id);
            return Ok(Vec::new());
        };

        let query = domain.table.row(encoded);
        let neighbours = rank(&query, &domain.table, Some(encoded), k, RankMode::Nearest);
        debug!("user {} has {} similar users", user_id, neighbours.len());

        let own_names: HashSet<String> =
            self.preferred_names(domain, user_id).into_iter().collect();
        debug!("user {} prefers {} titles", user_id, own_names.len());

        // Support counts keyed by normalized title, first-encounter order.
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut support: Vec<(String, usize)> = Vec::new();
        for (index, _score) in &neighbours {
            let Some(similar_id) = domain.codec.decode(*index) else {
                warn!("encoded user index {} has no external id, skipping", index);
                continue;
            };
            for key in self.preferred_names(domain, similar_id) {
                if own_names.contains(&key) {
                    continue;
                }
                match slots.get(&key) {
                    Some(&slot) => support[slot].1 += 1,
                    None => {
                        slots.insert(key.clone(), support.len());
                        support.push((key, 1));
                    }
                }
            }
        }

        // Stable sort keeps first-encounter order among equal counts.
        support.sort_by(|a, b| b.1.cmp(&a.1));
        support.truncate(k);

        let mut recommendations = Vec::with_capacity(support.len());
        for (key, count) in support {
            let Some(hit) = self.catalog.resolve_by_name(&key) else {
                warn!("candidate '{}' no longer resolves, skipping", key);
                continue;
            };
            recommendations.push(UserRecommendation {
                name: hit.name.clone(),
                support: count,
                genres: hit.genres.clone(),
                synopsis: hit.synopsis.clone(),
            });
        }

        debug!("recommend_by_user({}) -> {} candidates", user_id, recommendations.len());
        Ok(recommendations)
    }

    /// Normalized titles of a user's preferred anime, in preference
    /// order. Ids without a catalog record drop out here, mirroring the
    /// join the metadata artifact would perform.
    fn preferred_names(&self, domain: &UserDomain, user_id: i64) -> Vec<String> {
        domain
            .ratings
            .preferred_anime(user_id)
            .into_iter()
            .filter_map(|anime_id| {
                let record = self.catalog.resolve_by_id(anime_id);
                if record.is_none() {
                    debug!("preferred anime_id {} not in catalog, dropped", anime_id);
                }
                record.map(|r| normalize_name(&r.name))
            })
            .collect()
    }
}

/// Assembles a [`Recommender`] from pre-built parts, for tests, demos and
/// hosts that manage their own artifact loading.
///
/// # Examples
///
/// ```
/// use anirec::catalog::{AnimeCatalog, AnimeRecord};
/// use anirec::embedding::{EmbeddingTable, IdCodec};
/// use anirec::recommend::RecommenderBuilder;
///
/// let catalog = AnimeCatalog::from_records(vec![
///     AnimeRecord { anime_id: 1, name: "A".into(), genres: String::new(), synopsis: String::new() },
///     AnimeRecord { anime_id: 2, name: "B".into(), genres: String::new(), synopsis: String::new() },
/// ]);
/// let table = EmbeddingTable::from_rows(vec![vec![1.0, 0.0], vec![0.9, 0.1]]);
/// let codec = IdCodec::from_pairs(vec![(1, 0), (2, 1)]);
///
/// let recommender = RecommenderBuilder::new()
///     .with_catalog(catalog)
///     .with_anime_domain(table, codec)
///     .build();
/// let names = recommender.recommend_by_anime("A", 1).unwrap();
/// assert_eq!(names, vec!["B".to_string()]);
/// ```
pub struct RecommenderBuilder {
    catalog: Option<AnimeCatalog>,
    anime: Option<(EmbeddingTable, IdCodec)>,
    user: Option<(EmbeddingTable, IdCodec, RatingsTable)>,
}

impl Default for RecommenderBuilder {
    fn default() -> Self {
        debug!("Creating RecommenderBuilder with no parts");
        Self { catalog: None, anime: None, user: None }
    }
}

impl RecommenderBuilder {
    pub fn new() -> Self {
        info!("Initializing new RecommenderBuilder");
        Self::default()
    }

    /// Anime metadata with synopses already merged.
    pub fn with_catalog(mut self, catalog: AnimeCatalog) -> Self {
        info!("Builder received catalog with {} records", catalog.len());
        self.catalog = Some(catalog);
        self
    }

    /// Anime embedding table and its id codec.
    pub fn with_anime_domain(mut self, table: EmbeddingTable, codec: IdCodec) -> Self {
        info!(
            "Builder received anime domain: {} items x {} features",
            table.nitems(),
            table.nfeatures()
        );
        self.anime = Some((table, codec));
        self
    }

    /// User embedding table, its id codec and the ratings table; enables
    /// the collaborative flow.
    pub fn with_user_domain(
        mut self,
        table: EmbeddingTable,
        codec: IdCodec,
        ratings: RatingsTable,
    ) -> Self {
        info!(
            "Builder received user domain: {} users, {} ratings",
            table.nitems(),
            ratings.n_ratings()
        );
        self.user = Some((table, codec, ratings));
        self
    }

    /// Assembles the service.
    ///
    /// # Panics
    ///
    /// - If the catalog or the anime domain was not provided.
    /// - If a codec does not cover its table's rows exactly.
    pub fn build(self) -> Recommender {
        assert!(self.catalog.is_some(), "recommender needs a catalog");
        assert!(self.anime.is_some(), "recommender needs the anime embedding domain");
        let catalog = self.catalog.unwrap();
        let (table, codec) = self.anime.unwrap();
        assert_codec_covers(&codec, &table, "anime");

        let user = self.user.map(|(utable, ucodec, ratings)| {
            assert_codec_covers(&ucodec, &utable, "user");
            UserDomain { table: Arc::new(utable), codec: Arc::new(ucodec), ratings }
        });

        info!(
            "Recommender assembled: {} catalog records, {} embedded anime, user domain: {}",
            catalog.len(),
            table.nitems(),
            user.is_some()
        );
        Recommender {
            catalog,
            table: Arc::new(table),
            codec: Arc::new(codec),
            user,
        }
    }
}

fn assert_codec_covers(codec: &IdCodec, table: &EmbeddingTable, domain: &str) {
    assert_eq!(
        codec.len(),
        table.nitems(),
        "{} codec maps {} ids but table has {} rows",
        domain,
        codec.len(),
        table.nitems()
    );
    for index in 0..table.nitems() {
        assert!(
            codec.decode(index).is_some(),
            "{} codec: encoded index {} has no external id",
            domain,
            index
        );
    }
}
