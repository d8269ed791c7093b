/// Content-based flow over the ten-title demo catalog: the top match for
/// "Naruto" should be Naruto Shippuuden, then the other shounen series.
use anirec::catalog::AnimeCatalog;
use anirec::embedding::{EmbeddingTable, IdCodec};
use anirec::recommend::RecommenderBuilder;

#[path = "./common/lib.rs"]
mod common;

fn main() {
    anirec::init();

    let recommender = RecommenderBuilder::new()
        .with_catalog(AnimeCatalog::from_records(common::demo_catalog()))
        .with_anime_domain(
            EmbeddingTable::from_rows(common::demo_rows()),
            IdCodec::from_pairs(common::demo_codec_pairs()),
        )
        .build();

    let k = 5;
    for query in ["Naruto", "  spirited away  ", "Serial Experiments Lain"] {
        let matches = recommender.similar_anime(query, k).unwrap();

        println!("\nTop-{k} for '{query}':");
        if matches.is_empty() {
            println!("  (no catalog entry matches)");
            continue;
        }
        for (rank, m) in matches.iter().enumerate() {
            println!(
                "  {}. {:<25} score={:.4}  [{}]",
                rank + 1,
                m.name,
                m.score,
                m.genres
            );
        }
    }
}
