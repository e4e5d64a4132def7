use criterion::{Criterion, criterion_group, criterion_main};
use pocket_rag::indexer::passage_payload;
use pocket_rag::query::{RetrievedPassage, build_augmented_prompt, format_passages};
use pocket_rag::vector_store::{
    CollectionParams, Distance, InMemoryStore, PointId, VectorRecord, VectorStore,
};
use std::hint::black_box;

const DIMENSION: usize = 1024;
const POINTS: u64 = 2_000;

fn vector(seed: u64) -> Vec<f32> {
    (0..DIMENSION)
        .map(|i| ((seed as f32 * 0.37) + (i as f32 * 0.011)).sin())
        .collect()
}

fn populated_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .create_collection(
            "bench",
            &CollectionParams {
                vector_size: DIMENSION as u64,
                distance: Distance::Cosine,
            },
        )
        .expect("can create collection");

    let records: Vec<VectorRecord> = (0..POINTS)
        .map(|id| VectorRecord::new(id, vector(id), passage_payload(&format!("passage {id}"))))
        .collect();
    store.upsert("bench", &records).expect("can upsert");
    store
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let store = populated_store();
    let query = vector(POINTS + 1);
    c.bench_function("memory_query_top2", |b| {
        b.iter(|| store.query("bench", black_box(&query), 2, true))
    });

    let passages: Vec<RetrievedPassage> = (0..2)
        .map(|id| RetrievedPassage {
            id: PointId::Num(id),
            text: "I like to play cricket".to_string(),
            score: 0.8,
        })
        .collect();
    c.bench_function("augmented_prompt", |b| {
        b.iter(|| {
            build_augmented_prompt(
                &format_passages(black_box(&passages)),
                black_box("What sport do you play?"),
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
