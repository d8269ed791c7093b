//! Anime metadata catalog and ratings table.
//!
//! The catalog resolves human queries to canonical records in both
//! directions the recommendation flows need: a free-text title to the
//! record holding its anime_id (so its embedding row can be found), and a
//! decoded anime_id back to display fields (name, genres, synopsis).
//!
//! Title lookup is normalized: both the stored key and the query are
//! trimmed and lowercased, so `"Naruto"`, `" naruto "` and `"NARUTO"`
//! resolve to the same record. Display names are not guaranteed unique;
//! the first record loaded under a normalized name wins.
//!
//! The ratings table serves the collaborative flow: a user's "preferred"
//! anime are those rated at or above the user's own 75th-percentile
//! rating, ordered by descending rating.

use std::collections::HashMap;

use log::{debug, info, trace, warn};

/// Fraction of a user's rating distribution a title must reach to count
/// as preferred.
pub const PREFERRED_RATING_PERCENTILE: f64 = 0.75;

/// One catalog entry, keyed by `anime_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimeRecord {
    /// External id shared with the embedding codec.
    pub anime_id: i64,
    /// Display title; lookup key after normalization.
    pub name: String,
    /// Comma-separated genre list, as shipped in the metadata artifact.
    pub genres: String,
    /// Plot synopsis; empty when the synopsis artifact has no row.
    pub synopsis: String,
}

/// Normalizes a title for lookup: trim surrounding whitespace, lowercase.
#[inline]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Read-only index over anime records.
///
/// # Examples
///
/// ```
/// use anirec::catalog::{AnimeCatalog, AnimeRecord};
///
/// let catalog = AnimeCatalog::from_records(vec![AnimeRecord {
///     anime_id: 1,
///     name: "Cowboy Bebop".to_string(),
///     genres: "Action, Sci-Fi".to_string(),
///     synopsis: String::new(),
/// }]);
/// assert!(catalog.resolve_by_name(" COWBOY bebop ").is_some());
/// assert!(catalog.resolve_by_name("unknown").is_none());
/// assert_eq!(catalog.resolve_by_id(1).unwrap().name, "Cowboy Bebop");
/// ```
#[derive(Clone, Debug, Default)]
pub struct AnimeCatalog {
    records: Vec<AnimeRecord>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<i64, usize>,
}

impl AnimeCatalog {
    /// Builds the catalog indexes. Duplicate normalized names and
    /// duplicate ids keep the first record seen.
    pub fn from_records(records: Vec<AnimeRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());

        for (pos, record) in records.iter().enumerate() {
            by_name.entry(normalize_name(&record.name)).or_insert(pos);
            if by_id.contains_key(&record.anime_id) {
                warn!("duplicate anime_id {} in catalog, keeping first record", record.anime_id);
            } else {
                by_id.insert(record.anime_id, pos);
            }
        }

        info!(
            "Catalog built: {} records, {} distinct names, {} distinct ids",
            records.len(),
            by_name.len(),
            by_id.len()
        );
        Self { records, by_name, by_id }
    }

    /// Resolves a free-text title after normalization. First match wins
    /// among records sharing a normalized name.
    pub fn resolve_by_name(&self, name: &str) -> Option<&AnimeRecord> {
        let key = normalize_name(name);
        let hit = self.by_name.get(&key).map(|&pos| &self.records[pos]);
        trace!("resolve_by_name('{}') -> {:?}", name, hit.map(|r| r.anime_id));
        hit
    }

    /// Resolves an external anime_id.
    pub fn resolve_by_id(&self, id: i64) -> Option<&AnimeRecord> {
        self.by_id.get(&id).map(|&pos| &self.records[pos])
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the catalog holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &AnimeRecord> {
        self.records.iter()
    }
}

/// One rating event from the ratings artifact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatingRecord {
    /// External user id shared with the user embedding codec.
    pub user_id: i64,
    /// External anime id shared with the catalog.
    pub anime_id: i64,
    /// Rating value on whatever scale the artifact uses.
    pub rating: f64,
}

/// Ratings grouped per user, frozen after construction.
#[derive(Clone, Debug, Default)]
pub struct RatingsTable {
    by_user: HashMap<i64, Vec<(i64, f64)>>,
    nratings: usize,
}

impl RatingsTable {
    /// Groups rating records by user, keeping artifact order per user.
    pub fn from_records(records: Vec<RatingRecord>) -> Self {
        let nratings = records.len();
        let mut by_user: HashMap<i64, Vec<(i64, f64)>> = HashMap::new();
        for record in records {
            by_user.entry(record.user_id).or_default().push((record.anime_id, record.rating));
        }
        info!("Ratings table built: {} ratings across {} users", nratings, by_user.len());
        Self { by_user, nratings }
    }

    /// Number of distinct users.
    #[inline]
    pub fn n_users(&self) -> usize {
        self.by_user.len()
    }

    /// Total rating events.
    #[inline]
    pub fn n_ratings(&self) -> usize {
        self.nratings
    }

    /// Raw `(anime_id, rating)` pairs for a user, in artifact order.
    pub fn ratings_of(&self, user_id: i64) -> Option<&[(i64, f64)]> {
        self.by_user.get(&user_id).map(|v| v.as_slice())
    }

    /// Anime the user rated at or above their own 75th-percentile rating,
    /// ordered by descending rating (ties by ascending anime_id).
    ///
    /// The percentile interpolates linearly between order statistics, so
    /// thresholds agree with the pipeline that produced the artifacts. An
    /// unknown user, or a user with no finite ratings, yields an empty
    /// vector.
    pub fn preferred_anime(&self, user_id: i64) -> Vec<i64> {
        let Some(ratings) = self.by_user.get(&user_id) else {
            debug!("user {} has no ratings", user_id);
            return Vec::new();
        };

        let mut values: Vec<f64> =
            ratings.iter().map(|&(_, r)| r).filter(|r| r.is_finite()).collect();
        if values.is_empty() {
            debug!("user {} has no finite ratings", user_id);
            return Vec::new();
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let threshold = interpolated_percentile(&values, PREFERRED_RATING_PERCENTILE);
        trace!(
            "user {}: {} ratings, percentile threshold {:.4}",
            user_id,
            values.len(),
            threshold
        );

        let mut preferred: Vec<(i64, f64)> = ratings
            .iter()
            .copied()
            .filter(|&(_, r)| r.is_finite() && r >= threshold)
            .collect();
        preferred.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        preferred.into_iter().map(|(anime_id, _)| anime_id).collect()
    }
}

/// Linear-interpolation percentile over ascending-sorted values, with
/// `fraction` in [0, 1].
fn interpolated_percentile(sorted: &[f64], fraction: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let fraction = fraction.clamp(0.0, 1.0);
    let position = fraction * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
