// Criterion benchmarks for HemoLink Matcher

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hemolink_matcher::core::{
    distance::{haversine_distance, nearest_distance_km},
    matcher::{rank_matches, CandidateOutcome},
    scoring::score_donor,
};
use hemolink_matcher::models::{BloodType, DonorCandidate, GeoPoint, MatchingCriteria};

fn create_candidate(id: usize, lat: f64, lon: f64) -> DonorCandidate {
    DonorCandidate {
        id: id.to_string(),
        blood_type: BloodType::ALL[id % BloodType::ALL.len()],
        last_donation_at: None,
        availability_schedule: vec![],
        preferred_locations: vec![GeoPoint::new(lat, lon), GeoPoint::new(lat + 0.05, lon - 0.05)],
        eligible: true,
        contact: None,
    }
}

fn create_criteria() -> MatchingCriteria {
    MatchingCriteria {
        blood_type: BloodType::AbPositive,
        location: GeoPoint::new(19.07, 72.87),
        radius_km: None,
        urgency_level: 4,
        required_by: Utc::now(),
    }
}

fn create_pool(count: usize) -> Vec<DonorCandidate> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.5;
            let lon_offset = (i as f64 * 0.001) % 0.5;
            create_candidate(i, 19.07 + lat_offset, 72.87 + lon_offset)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(19.07),
                black_box(72.87),
                black_box(18.52),
                black_box(73.86),
            )
        });
    });
}

fn bench_nearest_location(c: &mut Criterion) {
    let origin = GeoPoint::new(19.07, 72.87);
    let locations: Vec<GeoPoint> = (0..8)
        .map(|i| GeoPoint::new(19.0 + i as f64 * 0.1, 72.8 + i as f64 * 0.1))
        .collect();

    c.bench_function("nearest_distance_8_locations", |b| {
        b.iter(|| nearest_distance_km(black_box(&origin), black_box(&locations)));
    });
}

fn bench_scoring_and_ranking(c: &mut Criterion) {
    let criteria = create_criteria();
    let mut group = c.benchmark_group("scoring");

    for candidate_count in [10, 100, 1000].iter() {
        let candidates = create_pool(*candidate_count);

        group.bench_with_input(
            BenchmarkId::new("score_and_rank", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    let outcomes = candidates
                        .iter()
                        .cloned()
                        .map(|donor| CandidateOutcome::Scored(score_donor(donor, &criteria, 0.7)))
                        .collect();
                    rank_matches(black_box(outcomes), black_box(10))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_nearest_location,
    bench_scoring_and_ranking
);

criterion_main!(benches);
