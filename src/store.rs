//! Artifact loading: embedding weights, id codecs, catalog and ratings.
//!
//! Everything that touches the filesystem lives here. Loaders validate
//! structure before handing data to the in-memory types, so shape
//! violations surface as [`ArtifactError`] values with the offending path
//! and reason instead of panics from the constructors.
//!
//! Artifact formats:
//! - weights: JSON array of equal-length float rows, one per encoded index
//! - codec: JSON object of external id (stringified integer) to encoded index
//! - metadata: CSV `anime_id,name,genres` (extra columns ignored)
//! - synopsis: CSV `anime_id,synopsis` (extra columns ignored)
//! - ratings: CSV `user_id,anime_id,rating`
//!
//! [`EmbeddingStore`] keeps loaded weights and codecs in concurrent
//! path-keyed caches. Artifacts are treated as immutable for the process
//! lifetime, so a cache hit returns the same shared handle and there is no
//! invalidation.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use log::{debug, info, warn};

use crate::catalog::{AnimeCatalog, AnimeRecord, RatingRecord, RatingsTable};
use crate::embedding::{EmbeddingTable, IdCodec};
use crate::error::ArtifactError;

/// Path-keyed cache over embedding weights and codec artifacts.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use anirec::store::EmbeddingStore;
///
/// let store = EmbeddingStore::new();
/// let (table, codec) = store
///     .domain(Path::new("anime_weights.json"), Path::new("anime_codec.json"))
///     .unwrap();
/// assert_eq!(table.nitems(), codec.len());
/// ```
#[derive(Debug, Default)]
pub struct EmbeddingStore {
    tables: DashMap<PathBuf, Arc<EmbeddingTable>>,
    codecs: DashMap<PathBuf, Arc<IdCodec>>,
}

impl EmbeddingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads (or returns the cached) embedding table at `path`.
    pub fn table(&self, path: &Path) -> Result<Arc<EmbeddingTable>, ArtifactError> {
        if let Some(hit) = self.tables.get(path) {
            debug!("weights cache hit: {}", path.display());
            return Ok(hit.clone());
        }
        let table = Arc::new(read_weights(path)?);
        self.tables.insert(path.to_path_buf(), table.clone());
        Ok(table)
    }

    /// Loads (or returns the cached) id codec at `path`.
    pub fn codec(&self, path: &Path) -> Result<Arc<IdCodec>, ArtifactError> {
        if let Some(hit) = self.codecs.get(path) {
            debug!("codec cache hit: {}", path.display());
            return Ok(hit.clone());
        }
        let codec = Arc::new(read_codec(path)?);
        self.codecs.insert(path.to_path_buf(), codec.clone());
        Ok(codec)
    }

    /// Loads a weights/codec pair and checks they describe the same
    /// domain: the codec must map exactly the table's encoded indices
    /// 0..nitems.
    pub fn domain(
        &self,
        weights: &Path,
        codec: &Path,
    ) -> Result<(Arc<EmbeddingTable>, Arc<IdCodec>), ArtifactError> {
        let table = self.table(weights)?;
        let ids = self.codec(codec)?;

        if ids.len() != table.nitems() {
            return Err(ArtifactError::corrupt(
                codec,
                format!("codec maps {} ids but table has {} rows", ids.len(), table.nitems()),
            ));
        }
        for index in 0..table.nitems() {
            if ids.decode(index).is_none() {
                return Err(ArtifactError::corrupt(
                    codec,
                    format!("encoded index {} has no external id", index),
                ));
            }
        }

        info!(
            "Embedding domain ready: {} items x {} features ({})",
            table.nitems(),
            table.nfeatures(),
            weights.display()
        );
        Ok((table, ids))
    }
}

fn read_weights(path: &Path) -> Result<EmbeddingTable, ArtifactError> {
    let file = File::open(path).map_err(|e| ArtifactError::from_io(path, e))?;
    let rows: Vec<Vec<f64>> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ArtifactError::json(path, e))?;

    if rows.is_empty() {
        return Err(ArtifactError::corrupt(path, "empty embedding table"));
    }
    let width = rows[0].len();
    if width == 0 {
        return Err(ArtifactError::corrupt(path, "zero-length embedding rows"));
    }
    if let Some(bad) = rows.iter().position(|row| row.len() != width) {
        return Err(ArtifactError::corrupt(
            path,
            format!("row {} has {} values, expected {}", bad, rows[bad].len(), width),
        ));
    }

    info!("Loaded weights {}: {} rows x {} features", path.display(), rows.len(), width);
    Ok(EmbeddingTable::from_rows(rows))
}

fn read_codec(path: &Path) -> Result<IdCodec, ArtifactError> {
    let file = File::open(path).map_err(|e| ArtifactError::from_io(path, e))?;
    let raw: HashMap<String, usize> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ArtifactError::json(path, e))?;

    let mut pairs = Vec::with_capacity(raw.len());
    let mut seen_ids = HashSet::with_capacity(raw.len());
    let mut seen_indices = HashSet::with_capacity(raw.len());
    for (key, index) in raw {
        let id: i64 = key.trim().parse().map_err(|_| {
            ArtifactError::corrupt(path, format!("codec key '{}' is not an integer id", key))
        })?;
        if !seen_ids.insert(id) {
            return Err(ArtifactError::corrupt(path, format!("duplicate id {} in codec", id)));
        }
        if !seen_indices.insert(index) {
            return Err(ArtifactError::corrupt(
                path,
                format!("duplicate encoded index {} in codec", index),
            ));
        }
        pairs.push((id, index));
    }

    info!("Loaded codec {}: {} entries", path.display(), pairs.len());
    Ok(IdCodec::from_pairs(pairs))
}

/// Loads the metadata and synopsis artifacts into a catalog.
///
/// Synopsis rows are merged onto metadata rows by anime_id; a metadata row
/// with no synopsis gets an empty string. Synopsis rows for unknown ids
/// are ignored.
pub fn load_catalog(metadata: &Path, synopsis: &Path) -> Result<AnimeCatalog, ArtifactError> {
    let synopses = read_synopsis(synopsis)?;

    let mut reader = open_csv(metadata)?;
    let headers = reader.headers().map_err(|e| ArtifactError::csv(metadata, e))?.clone();
    let id_col = require_column(metadata, &headers, "anime_id")?;
    let name_col = require_column(metadata, &headers, "name")?;
    let genres_col = require_column(metadata, &headers, "genres")?;

    let mut records = Vec::new();
    let mut line = 2;
    for result in reader.records() {
        let row = result.map_err(|e| ArtifactError::csv(metadata, e))?;
        let anime_id = parse_field::<i64>(metadata, &row, id_col, "anime_id", line)?;
        let name = row.get(name_col).unwrap_or("").to_string();
        let genres = row.get(genres_col).unwrap_or("").to_string();
        let synopsis = synopses.get(&anime_id).cloned().unwrap_or_default();
        records.push(AnimeRecord { anime_id, name, genres, synopsis });
        line += 1;
    }

    if records.is_empty() {
        return Err(ArtifactError::corrupt(metadata, "metadata has no records"));
    }

    info!(
        "Loaded catalog {}: {} records ({} with synopsis)",
        metadata.display(),
        records.len(),
        records.iter().filter(|r| !r.synopsis.is_empty()).count()
    );
    Ok(AnimeCatalog::from_records(records))
}

fn read_synopsis(path: &Path) -> Result<HashMap<i64, String>, ArtifactError> {
    let mut reader = open_csv(path)?;
    let headers = reader.headers().map_err(|e| ArtifactError::csv(path, e))?.clone();
    let id_col = require_column(path, &headers, "anime_id")?;
    let synopsis_col = require_column(path, &headers, "synopsis")?;

    let mut synopses = HashMap::new();
    let mut line = 2;
    for result in reader.records() {
        let row = result.map_err(|e| ArtifactError::csv(path, e))?;
        let anime_id = parse_field::<i64>(path, &row, id_col, "anime_id", line)?;
        let text = row.get(synopsis_col).unwrap_or("").to_string();
        synopses.entry(anime_id).or_insert(text);
        line += 1;
    }

    debug!("Loaded synopsis {}: {} entries", path.display(), synopses.len());
    Ok(synopses)
}

/// Loads the ratings artifact. An empty ratings file is allowed; the
/// collaborative flow then degrades to empty preferred sets.
pub fn load_ratings(path: &Path) -> Result<RatingsTable, ArtifactError> {
    let mut reader = open_csv(path)?;
    let headers = reader.headers().map_err(|e| ArtifactError::csv(path, e))?.clone();
    let user_col = require_column(path, &headers, "user_id")?;
    let anime_col = require_column(path, &headers, "anime_id")?;
    let rating_col = require_column(path, &headers, "rating")?;

    let mut records = Vec::new();
    let mut line = 2;
    for result in reader.records() {
        let row = result.map_err(|e| ArtifactError::csv(path, e))?;
        records.push(RatingRecord {
            user_id: parse_field::<i64>(path, &row, user_col, "user_id", line)?,
            anime_id: parse_field::<i64>(path, &row, anime_col, "anime_id", line)?,
            rating: parse_field::<f64>(path, &row, rating_col, "rating", line)?,
        });
        line += 1;
    }

    if records.is_empty() {
        warn!("ratings artifact {} has no records", path.display());
    }
    info!("Loaded ratings {}: {} records", path.display(), records.len());
    Ok(RatingsTable::from_records(records))
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>, ArtifactError> {
    let file = File::open(path).map_err(|e| ArtifactError::from_io(path, e))?;
    Ok(csv::Reader::from_reader(file))
}

fn require_column(
    path: &Path,
    headers: &csv::StringRecord,
    name: &str,
) -> Result<usize, ArtifactError> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        ArtifactError::corrupt(
            path,
            format!(
                "missing column '{}', available: {:?}",
                name,
                headers.iter().collect::<Vec<_>>()
            ),
        )
    })
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    row: &csv::StringRecord,
    col: usize,
    name: &str,
    line: usize,
) -> Result<T, ArtifactError> {
    let raw = row.get(col).unwrap_or("");
    raw.trim().parse::<T>().map_err(|_| {
        ArtifactError::corrupt(path, format!("line {}: invalid {} '{}'", line, name, raw))
    })
}
