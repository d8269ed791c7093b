/// Collaborative flow: user 7 is a shounen watcher, so the pooled
/// preferences of the users ranked nearest to them surface Bleach first.
use anirec::catalog::{AnimeCatalog, RatingRecord, RatingsTable};
use anirec::embedding::{EmbeddingTable, IdCodec};
use anirec::recommend::RecommenderBuilder;

#[path = "./common/lib.rs"]
mod common;

fn ratings() -> Vec<RatingRecord> {
    // (user_id, anime_id, rating); only each user's top quarter counts
    // as preferred.
    let raw = [
        (7, 20, 10.0),
        (7, 1735, 9.0),
        (11, 20, 9.0),
        (11, 269, 9.0),
        (11, 21, 8.0),
        (13, 269, 10.0),
        (13, 21, 9.0),
        (13, 6, 8.0),
        (29, 1, 10.0),
        (29, 6, 9.0),
    ];
    raw.into_iter()
        .map(|(user_id, anime_id, rating)| RatingRecord { user_id, anime_id, rating })
        .collect()
}

fn main() {
    anirec::init();

    // Users 11 and 13 sit close to user 7 in the embedding; user 29 is
    // orthogonal and contributes last.
    let user_rows = vec![
        vec![1.00, 0.00, 0.0, 0.0], // 7
        vec![0.97, 0.05, 0.0, 0.0], // 11
        vec![0.90, 0.15, 0.0, 0.0], // 13
        vec![0.00, 1.00, 0.0, 0.0], // 29
    ];
    let user_codec = IdCodec::from_pairs(vec![(7, 0), (11, 1), (13, 2), (29, 3)]);

    let recommender = RecommenderBuilder::new()
        .with_catalog(AnimeCatalog::from_records(common::demo_catalog()))
        .with_anime_domain(
            EmbeddingTable::from_rows(common::demo_rows()),
            IdCodec::from_pairs(common::demo_codec_pairs()),
        )
        .with_user_domain(
            EmbeddingTable::from_rows(user_rows),
            user_codec,
            RatingsTable::from_records(ratings()),
        )
        .build();

    for user_id in [7, 29, 9999] {
        let recs = recommender.recommend_by_user(user_id, 3).unwrap();

        println!("\nPicks for user {user_id}:");
        if recs.is_empty() {
            println!("  (nothing new to recommend)");
            continue;
        }
        for (rank, rec) in recs.iter().enumerate() {
            println!("  {}. {:<25} support={}  [{}]", rank + 1, rec.name, rec.support, rec.genres);
            if !rec.synopsis.is_empty() {
                println!("     {}", rec.synopsis);
            }
        }
    }
}
