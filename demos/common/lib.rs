use anirec::catalog::AnimeRecord;

use rand::prelude::*;

/// Ten-title catalog in three embedding clusters: shounen series
/// (dims 0-1), space westerns (dims 2-3), Ghibli films (dims 4-5).
#[allow(dead_code)]
pub fn demo_catalog() -> Vec<AnimeRecord> {
    fn record(anime_id: i64, name: &str, genres: &str, synopsis: &str) -> AnimeRecord {
        AnimeRecord {
            anime_id,
            name: name.to_string(),
            genres: genres.to_string(),
            synopsis: synopsis.to_string(),
        }
    }
    vec![
        record(20, "Naruto", "Action, Adventure", "A young ninja seeks recognition from his village."),
        record(1735, "Naruto Shippuuden", "Action, Adventure", "The ninja returns from training to face the Akatsuki."),
        record(269, "Bleach", "Action, Supernatural", "A teenager becomes a substitute soul reaper."),
        record(21, "One Piece", "Action, Adventure", "A crew of pirates hunts the ultimate treasure."),
        record(1, "Cowboy Bebop", "Action, Sci-Fi", "Bounty hunters drift between jobs on the Bebop."),
        record(6, "Trigun", "Action, Sci-Fi", "A pacifist gunman with a bounty on his head."),
        record(30, "Neon Genesis Evangelion", "Drama, Mecha", "Teenagers pilot bio-machines against the Angels."),
        record(199, "Spirited Away", "Adventure, Supernatural", "A girl works in a bathhouse for spirits."),
        record(431, "Howl's Moving Castle", "Adventure, Drama", "A cursed hatter shelters in a walking castle."),
        record(523, "My Neighbor Totoro", "Adventure, Supernatural", "Two sisters befriend a forest spirit."),
    ]
}

/// Embedding rows aligned with [`demo_codec_pairs`] (N×8).
#[allow(dead_code)]
pub fn demo_rows() -> Vec<Vec<f64>> {
    vec![
        vec![0.90, 0.40, 0.10, 0.00, 0.00, 0.00, 0.05, 0.00], // 20   Naruto
        vec![0.92, 0.38, 0.05, 0.00, 0.00, 0.00, 0.00, 0.04], // 1735 Naruto Shippuuden
        vec![0.80, 0.50, 0.00, 0.10, 0.00, 0.00, 0.10, 0.00], // 269  Bleach
        vec![0.70, 0.60, 0.00, 0.00, 0.10, 0.00, 0.00, 0.10], // 21   One Piece
        vec![0.10, 0.00, 0.90, 0.40, 0.00, 0.00, 0.05, 0.00], // 1    Cowboy Bebop
        vec![0.00, 0.10, 0.85, 0.45, 0.00, 0.00, 0.00, 0.05], // 6    Trigun
        vec![0.10, 0.20, 0.50, 0.30, 0.20, 0.10, 0.00, 0.00], // 30   Evangelion
        vec![0.00, 0.00, 0.00, 0.10, 0.90, 0.45, 0.00, 0.00], // 199  Spirited Away
        vec![0.00, 0.05, 0.00, 0.00, 0.88, 0.40, 0.05, 0.00], // 431  Howl's Moving Castle
        vec![0.05, 0.00, 0.00, 0.00, 0.92, 0.35, 0.00, 0.00], // 523  My Neighbor Totoro
    ]
}

/// External id to encoded row index, matching [`demo_rows`] order.
#[allow(dead_code)]
pub fn demo_codec_pairs() -> Vec<(i64, usize)> {
    vec![
        (20, 0),
        (1735, 1),
        (269, 2),
        (21, 3),
        (1, 4),
        (6, 5),
        (30, 6),
        (199, 7),
        (431, 8),
        (523, 9),
    ]
}

/// Seeded random rows (N×F) for sizing experiments.
#[allow(dead_code)]
pub fn synthetic_rows(nitems: usize, nfeatures: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..nitems)
        .map(|_| (0..nfeatures).map(|_| rng.random_range(-1.0..1.0)).collect())
        .collect()
}
