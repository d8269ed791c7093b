use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::config::{AnimeSourceConfig, RecommenderConfig, UserSourceConfig};
use crate::error::ArtifactError;
use crate::recommend::Recommender;
use crate::store::{load_catalog, load_ratings, EmbeddingStore};

use approx::assert_relative_eq;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", content).expect("write temp content");
    file
}

fn weights_fixture() -> NamedTempFile {
    write_temp("[[1.0, 0.0], [0.9, 0.1], [-1.0, 0.0]]")
}

fn codec_fixture() -> NamedTempFile {
    write_temp(r#"{"20": 0, "1735": 1, "431": 2}"#)
}

#[test]
fn domain_loads_weights_and_codec() {
    crate::init();
    let weights = weights_fixture();
    let codec = codec_fixture();

    let store = EmbeddingStore::new();
    let (table, ids) = store.domain(weights.path(), codec.path()).expect("load domain");

    assert_eq!(table.shape(), (3, 2));
    assert_relative_eq!(table.value(1, 0), 0.9);
    assert_eq!(ids.encode(20), Some(0));
    assert_eq!(ids.decode(2), Some(431));
}

#[test]
fn repeated_loads_hit_the_cache() {
    let weights = weights_fixture();
    let store = EmbeddingStore::new();

    let first = store.table(weights.path()).expect("first load");
    let second = store.table(weights.path()).expect("second load");
    assert!(Arc::ptr_eq(&first, &second), "same path must return the cached table");
}

#[test]
fn missing_weights_file_is_not_found() {
    let store = EmbeddingStore::new();
    let err = store.table(Path::new("/nonexistent/weights.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::NotFound { .. }), "got {:?}", err);
}

#[test]
fn ragged_weights_are_corrupt() {
    let weights = write_temp("[[1.0, 0.0], [0.9]]");
    let store = EmbeddingStore::new();
    let err = store.table(weights.path()).unwrap_err();
    match err {
        ArtifactError::Corrupt { reason, .. } => {
            assert!(reason.contains("row 1"), "reason should name the row: {}", reason)
        }
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn empty_weights_are_corrupt() {
    let weights = write_temp("[]");
    let store = EmbeddingStore::new();
    let err = store.table(weights.path()).unwrap_err();
    assert!(matches!(err, ArtifactError::Corrupt { .. }), "got {:?}", err);
}

#[test]
fn unparseable_weights_are_a_json_error() {
    let weights = write_temp("[[1.0, 0.0");
    let store = EmbeddingStore::new();
    let err = store.table(weights.path()).unwrap_err();
    assert!(matches!(err, ArtifactError::Json { .. }), "got {:?}", err);
}

#[test]
fn codec_with_duplicate_index_is_corrupt() {
    let codec = write_temp(r#"{"20": 0, "1735": 0}"#);
    let store = EmbeddingStore::new();
    let err = store.codec(codec.path()).unwrap_err();
    match err {
        ArtifactError::Corrupt { reason, .. } => {
            assert!(reason.contains("duplicate encoded index"), "{}", reason)
        }
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn codec_with_non_integer_key_is_corrupt() {
    let codec = write_temp(r#"{"naruto": 0}"#);
    let store = EmbeddingStore::new();
    let err = store.codec(codec.path()).unwrap_err();
    assert!(matches!(err, ArtifactError::Corrupt { .. }), "got {:?}", err);
}

#[test]
fn domain_rejects_codec_table_size_mismatch() {
    let weights = weights_fixture();
    let codec = write_temp(r#"{"20": 0, "1735": 1}"#);
    let store = EmbeddingStore::new();
    let err = store.domain(weights.path(), codec.path()).unwrap_err();
    match err {
        ArtifactError::Corrupt { reason, .. } => {
            assert!(reason.contains("2 ids"), "{}", reason);
            assert!(reason.contains("3 rows"), "{}", reason);
        }
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn domain_rejects_codec_with_gap() {
    // Right count, wrong coverage: index 3 is mapped but index 2 is not.
    let weights = weights_fixture();
    let codec = write_temp(r#"{"20": 0, "1735": 1, "431": 3}"#);
    let store = EmbeddingStore::new();
    let err = store.domain(weights.path(), codec.path()).unwrap_err();
    match err {
        ArtifactError::Corrupt { reason, .. } => {
            assert!(reason.contains("encoded index 2"), "{}", reason)
        }
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn catalog_loads_and_merges_synopsis() {
    let metadata = write_temp(
        "anime_id,name,genres,members\n\
         20,Naruto,\"Action, Adventure\",100\n\
         1,Cowboy Bebop,\"Action, Sci-Fi\",200\n\
         431,Howl's Moving Castle,\"Adventure, Drama\",300\n",
    );
    let synopsis = write_temp(
        "anime_id,synopsis\n\
         20,A young ninja seeks recognition.\n\
         1,Bounty hunters drift through space.\n\
         9999,Synopsis for an id the metadata does not know.\n",
    );

    let catalog = load_catalog(metadata.path(), synopsis.path()).expect("load catalog");
    assert_eq!(catalog.len(), 3);

    let naruto = catalog.resolve_by_name("naruto").expect("naruto loads");
    assert_eq!(naruto.genres, "Action, Adventure");
    assert_eq!(naruto.synopsis, "A young ninja seeks recognition.");

    // Metadata row with no synopsis row degrades to an empty string.
    let howl = catalog.resolve_by_id(431).expect("howl loads");
    assert!(howl.synopsis.is_empty());

    // The orphan synopsis row is ignored.
    assert!(catalog.resolve_by_id(9999).is_none());
}

#[test]
fn catalog_missing_column_is_corrupt() {
    let metadata = write_temp("anime_id,title\n20,Naruto\n");
    let synopsis = write_temp("anime_id,synopsis\n");
    let err = load_catalog(metadata.path(), synopsis.path()).unwrap_err();
    match err {
        ArtifactError::Corrupt { reason, .. } => {
            assert!(reason.contains("missing column 'name'"), "{}", reason)
        }
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn catalog_without_records_is_corrupt() {
    let metadata = write_temp("anime_id,name,genres\n");
    let synopsis = write_temp("anime_id,synopsis\n");
    let err = load_catalog(metadata.path(), synopsis.path()).unwrap_err();
    assert!(matches!(err, ArtifactError::Corrupt { .. }), "got {:?}", err);
}

#[test]
fn catalog_missing_file_is_not_found() {
    let synopsis = write_temp("anime_id,synopsis\n");
    let err = load_catalog(Path::new("/nonexistent/anime.csv"), synopsis.path()).unwrap_err();
    assert!(matches!(err, ArtifactError::NotFound { .. }), "got {:?}", err);
}

#[test]
fn ratings_load_and_group() {
    let ratings = write_temp(
        "user_id,anime_id,rating\n\
         100,20,9.0\n\
         100,1,4.5\n\
         200,20,7.0\n",
    );
    let table = load_ratings(ratings.path()).expect("load ratings");
    assert_eq!(table.n_users(), 2);
    assert_eq!(table.n_ratings(), 3);
    assert_eq!(table.ratings_of(100).map(|r| r.len()), Some(2));
}

#[test]
fn ratings_bad_value_is_corrupt_with_line() {
    let ratings = write_temp(
        "user_id,anime_id,rating\n\
         100,20,9.0\n\
         100,1,not-a-number\n",
    );
    let err = load_ratings(ratings.path()).unwrap_err();
    match err {
        ArtifactError::Corrupt { reason, .. } => {
            assert!(reason.contains("line 3"), "{}", reason);
            assert!(reason.contains("rating"), "{}", reason);
        }
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn empty_ratings_are_allowed() {
    let ratings = write_temp("user_id,anime_id,rating\n");
    let table = load_ratings(ratings.path()).expect("empty ratings are valid");
    assert_eq!(table.n_ratings(), 0);
}

#[test]
fn recommender_loads_both_domains_from_artifacts() {
    crate::init();
    let metadata = write_temp(
        "anime_id,name,genres\n\
         20,Naruto,\"Action, Adventure\"\n\
         1735,Naruto Shippuuden,\"Action, Adventure\"\n\
         1,Cowboy Bebop,\"Action, Sci-Fi\"\n",
    );
    let synopsis = write_temp("anime_id,synopsis\n20,A young ninja seeks recognition.\n");
    let anime_weights = write_temp("[[1.0, 0.0], [0.9, 0.1], [0.0, 1.0]]");
    let anime_codec = write_temp(r#"{"20": 0, "1735": 1, "1": 2}"#);
    let user_weights = write_temp("[[1.0, 0.0], [0.9, 0.1]]");
    let user_codec = write_temp(r#"{"100": 0, "200": 1}"#);
    let ratings = write_temp(
        "user_id,anime_id,rating\n\
         100,20,9.0\n\
         200,1735,8.0\n\
         200,1,7.0\n",
    );

    let config = RecommenderConfig::with_user(
        AnimeSourceConfig {
            metadata: metadata.path().to_path_buf(),
            synopsis: synopsis.path().to_path_buf(),
            weights: anime_weights.path().to_path_buf(),
            codec: anime_codec.path().to_path_buf(),
        },
        UserSourceConfig {
            weights: user_weights.path().to_path_buf(),
            codec: user_codec.path().to_path_buf(),
            ratings: ratings.path().to_path_buf(),
        },
    );

    let recommender = Recommender::load(&config).expect("artifacts load");
    assert_eq!(recommender.catalog().len(), 3);
    assert!(recommender.has_user_domain());

    let names = recommender.recommend_by_anime("naruto", 2).expect("content flow");
    assert_eq!(names, vec!["Naruto Shippuuden".to_string(), "Cowboy Bebop".to_string()]);

    // User 200's preferred set is Shippuuden only (the 7.0-rated Bebop
    // falls below their 75th percentile); user 100 has not preferred it.
    let recs = recommender.recommend_by_user(100, 2).expect("user flow");
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].name, "Naruto Shippuuden");
    assert_eq!(recs[0].support, 1);
    assert!(recs[0].synopsis.is_empty(), "no synopsis row was shipped for 1735");
}
