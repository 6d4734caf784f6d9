use criterion::{criterion_group, criterion_main, Criterion};
use odyssey_trips::models::{ActivityLevel, Destination, TripType};
use odyssey_trips::services::relations::{apply_filters, name_matches};
use odyssey_trips::services::DestinationFilters;
use std::hint::black_box;

const NAMES: &[&str] = &[
    "Bali Sunrise Trek",
    "Lombok Surf Camp",
    "Komodo Island Hop",
    "Balinese Cooking Class",
    "Raja Ampat Dive",
];

/// A catalog of `count` destinations cycling through names, levels and prices.
fn catalog(count: usize) -> Vec<Destination> {
    let levels = [
        ActivityLevel::Leisurely,
        ActivityLevel::Moderate,
        ActivityLevel::Challenging,
    ];
    (0..count)
        .map(|i| Destination {
            id: format!("d{}", i),
            name: format!("{} #{}", NAMES[i % NAMES.len()], i),
            trip_type: if i % 2 == 0 {
                TripType::OpenTrip
            } else {
                TripType::PrivateTrip
            },
            activity_level: levels[i % levels.len()],
            guide: Some(format!("g{}", i % 50)),
            description: "-".to_string(),
            benefits: "-".to_string(),
            price: (i % 1000) as f64,
            rating: 0.0,
            photo: "-".to_string(),
        })
        .collect()
}

fn benchmark_search_pipeline(c: &mut Criterion) {
    let destinations = catalog(10_000);
    let filters = DestinationFilters {
        activity_level: Some(ActivityLevel::Moderate),
        trip_type: Some(TripType::OpenTrip),
        min_price: Some(100.0),
        max_price: Some(600.0),
        guide: None,
    };

    let mut group = c.benchmark_group("destination_search");

    group.bench_function("name_match_only", |b| {
        b.iter(|| {
            destinations
                .iter()
                .filter(|d| name_matches(&d.name, black_box("bali")))
                .count()
        })
    });

    group.bench_function("name_match_then_filters", |b| {
        b.iter(|| {
            let matched: Vec<Destination> = destinations
                .iter()
                .filter(|d| name_matches(&d.name, black_box("bali")))
                .cloned()
                .collect();
            apply_filters(matched, black_box(&filters)).len()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_search_pipeline);
criterion_main!(benches);
