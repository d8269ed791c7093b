mod test_store;

use crate::catalog::{AnimeCatalog, AnimeRecord, RatingRecord, RatingsTable};
use crate::embedding::{EmbeddingTable, IdCodec};
use crate::recommend::{Recommender, RecommenderBuilder};

pub const DIM: usize = 4;

/// Small content catalog shared across tests. Ids are sparse on purpose
/// so encode/decode is exercised rather than identity-mapped.
pub fn sample_records() -> Vec<AnimeRecord> {
    vec![
        AnimeRecord {
            anime_id: 20,
            name: "Naruto".to_string(),
            genres: "Action, Adventure".to_string(),
            synopsis: "A young ninja seeks recognition.".to_string(),
        },
        AnimeRecord {
            anime_id: 1735,
            name: "Naruto Shippuuden".to_string(),
            genres: "Action, Adventure".to_string(),
            synopsis: "The ninja returns after training.".to_string(),
        },
        AnimeRecord {
            anime_id: 1,
            name: "Cowboy Bebop".to_string(),
            genres: "Action, Sci-Fi".to_string(),
            synopsis: "Bounty hunters drift through space.".to_string(),
        },
        AnimeRecord {
            anime_id: 199,
            name: "Spirited Away".to_string(),
            genres: "Adventure, Supernatural".to_string(),
            synopsis: "A girl crosses into the spirit world.".to_string(),
        },
        AnimeRecord {
            anime_id: 431,
            name: "Howl's Moving Castle".to_string(),
            genres: "Adventure, Drama".to_string(),
            synopsis: String::new(),
        },
        AnimeRecord {
            anime_id: 5114,
            name: "Fullmetal Alchemist: Brotherhood".to_string(),
            genres: "Action, Adventure, Drama".to_string(),
            synopsis: "Two brothers chase the philosopher's stone.".to_string(),
        },
    ]
}

/// Embedding rows aligned with [`sample_codec`]: the two Naruto entries
/// are near-parallel, Bebop and FMA:B share a direction, the two film
/// entries sit apart from both clusters.
pub fn sample_rows() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 0.0, 0.0, 0.0],   // 20   Naruto
        vec![0.95, 0.05, 0.0, 0.0], // 1735 Naruto Shippuuden
        vec![0.0, 1.0, 0.0, 0.0],   // 1    Cowboy Bebop
        vec![0.0, 0.0, 1.0, 0.0],   // 199  Spirited Away
        vec![0.0, 0.1, 0.9, 0.0],   // 431  Howl's Moving Castle
        vec![0.1, 0.9, 0.0, 0.0],   // 5114 FMA: Brotherhood
    ]
}

pub fn sample_table() -> EmbeddingTable {
    EmbeddingTable::from_rows(sample_rows())
}

pub fn sample_codec() -> IdCodec {
    IdCodec::from_pairs(vec![(20, 0), (1735, 1), (1, 2), (199, 3), (431, 4), (5114, 5)])
}

/// Content-only service over the shared fixtures.
pub fn sample_recommender() -> Recommender {
    crate::init();
    RecommenderBuilder::new()
        .with_catalog(AnimeCatalog::from_records(sample_records()))
        .with_anime_domain(sample_table(), sample_codec())
        .build()
}

/// Service with the collaborative flow enabled.
///
/// Four users; users 100 and 200 have near-identical embedding rows, user
/// 300 sits orthogonal, user 400 opposite. Ratings decide the preferred
/// sets, so each test crafts its own.
pub fn sample_recommender_with_users(ratings: Vec<RatingRecord>) -> Recommender {
    crate::init();
    let user_rows = vec![
        vec![1.0, 0.0, 0.0, 0.0],   // 100
        vec![0.98, 0.02, 0.0, 0.0], // 200
        vec![0.0, 1.0, 0.0, 0.0],   // 300
        vec![-1.0, 0.0, 0.0, 0.0],  // 400
    ];
    let user_codec = IdCodec::from_pairs(vec![(100, 0), (200, 1), (300, 2), (400, 3)]);
    RecommenderBuilder::new()
        .with_catalog(AnimeCatalog::from_records(sample_records()))
        .with_anime_domain(sample_table(), sample_codec())
        .with_user_domain(
            EmbeddingTable::from_rows(user_rows),
            user_codec,
            RatingsTable::from_records(ratings),
        )
        .build()
}

pub fn rating(user_id: i64, anime_id: i64, rating: f64) -> RatingRecord {
    RatingRecord { user_id, anime_id, rating }
}
