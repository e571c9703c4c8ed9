use snailgen_core::{LevelProfile, MapGenerator, generate_map};

#[test]
fn identical_seed_and_profile_produce_identical_fingerprints() {
    for profile in [LevelProfile::Burrows, LevelProfile::Halls, LevelProfile::Tangles] {
        let first = MapGenerator::new(12_345, profile).generate();
        let second = MapGenerator::new(12_345, profile).generate();
        assert_eq!(
            first.map.canonical_bytes(),
            second.map.canonical_bytes(),
            "identical runs must produce byte-identical maps ({profile:?})"
        );
        assert_eq!(first.iterations, second.iterations);
        assert_eq!(first.events, second.events);
    }
}

#[test]
fn different_seeds_diverge() {
    let first = generate_map(123, LevelProfile::Burrows);
    let second = generate_map(456, LevelProfile::Burrows);
    assert_ne!(
        first.fingerprint(),
        second.fingerprint(),
        "different seeds should produce different maps"
    );
}

#[test]
fn different_profiles_diverge_for_the_same_seed() {
    let burrows = generate_map(777, LevelProfile::Burrows);
    let halls = generate_map(777, LevelProfile::Halls);
    let tangles = generate_map(777, LevelProfile::Tangles);
    assert_ne!(burrows.fingerprint(), halls.fingerprint());
    assert_ne!(burrows.fingerprint(), tangles.fingerprint());
    assert_ne!(halls.fingerprint(), tangles.fingerprint());
}

#[test]
fn fingerprint_matches_the_canonical_bytes() {
    let generated = generate_map(42, LevelProfile::Halls);
    assert_eq!(
        generated.fingerprint(),
        xxhash_rust::xxh3::xxh3_64(&generated.map.canonical_bytes())
    );
}
