// Criterion benchmarks for the recommendation pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mercadito_recommender::core::{geodesic_distance_km, score_similarity, ReferenceSelector, Recommender, TfidfVectorizer};
use mercadito_recommender::models::{Location, ProductId, ProductRecord, UserProfile};
use std::num::NonZeroUsize;

const WORDS: &[&str] = &[
    "solar", "lamp", "eco", "bottle", "bamboo", "straw", "organic", "coffee", "hammock",
    "leather", "wallet", "ceramic", "mug", "cacao", "honey", "woven", "basket",
];

fn create_product(id: usize) -> ProductRecord {
    let description = (0..6)
        .map(|k| WORDS[(id * 7 + k * 3) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ");

    ProductRecord {
        id: ProductId::Number(id as i64),
        description,
        latitude: 11.0 + (id % 200) as f64 * 0.01,
        longitude: -87.0 + (id % 300) as f64 * 0.01,
        price: (id % 97) as f64 + 0.5,
        rating: Some((id % 5) as f64),
    }
}

fn create_profile() -> UserProfile {
    UserProfile {
        interests: ["eco".to_string(), "solar".to_string()].into_iter().collect(),
        location: Location::new(12.1364, -86.2514),
    }
}

fn bench_geodesic_distance(c: &mut Criterion) {
    let managua = Location::new(12.1364, -86.2514);
    let leon = Location::new(12.4379, -86.8780);

    c.bench_function("geodesic_distance", |b| {
        b.iter(|| geodesic_distance_km(black_box(managua), black_box(leon)));
    });
}

fn bench_similarity(c: &mut Criterion) {
    let vectorizer = TfidfVectorizer::default();
    let products: Vec<ProductRecord> = (0..1000).map(create_product).collect();
    let descriptions: Vec<&str> = products.iter().map(|p| p.description.as_str()).collect();
    let ids: Vec<ProductId> = products.iter().map(|p| p.id.clone()).collect();

    c.bench_function("score_similarity_1000", |b| {
        b.iter(|| {
            score_similarity(
                &vectorizer,
                black_box(&descriptions),
                &ids,
                &ReferenceSelector::default(),
            )
        });
    });
}

fn bench_recommend(c: &mut Criterion) {
    let recommender = Recommender::default();
    let profile = create_profile();
    let top_n = NonZeroUsize::new(5).unwrap();

    let mut group = c.benchmark_group("recommend");

    for size in [100, 1000, 10000].iter() {
        let catalog: Vec<ProductRecord> = (0..*size).map(create_product).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| recommender.recommend(black_box(&profile), catalog.clone(), top_n));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_geodesic_distance, bench_similarity, bench_recommend);
criterion_main!(benches);
