//! Shared fixtures for integration tests

#![allow(dead_code)]

use brewgraph::BrewRecord;

/// A complete, valid record for a Hario V60 pourover
pub fn brew(brew_id: &str) -> BrewRecord {
    BrewRecord::new()
        .with("brew_id", brew_id)
        .with("barista", "Sam")
        .with("brew_date", "2024-03-10")
        .with("roaster", "Onyx Coffee Lab")
        .with("coffee_name", "Geometry")
        .with("roast_level", "Light")
        .with("roast_date", "2024-03-01")
        .with("brew_method", "pourover")
        .with("brewer_brand", "Hario")
        .with("brewer_model", "V60")
        .with("grinder", "Comandante C40")
        .with("grind_setting", "22")
        .with("dose_g", "15")
        .with("total_brew_time_sec", "180")
        .with("notes_intensities", "chocolate:4;fruit:3")
        .with("sweetness_0_10", "7")
        .with("acidity_0_10", "6")
        .with("bitterness_0_10", "2")
        .with("body_0_10", "5")
        .with("overall_0_10", "8")
}

/// Set all five ratings at once
pub fn rated(record: BrewRecord, ratings: [f64; 5]) -> BrewRecord {
    let [sweetness, acidity, bitterness, body, overall] = ratings;
    record
        .with("sweetness_0_10", sweetness.to_string())
        .with("acidity_0_10", acidity.to_string())
        .with("bitterness_0_10", bitterness.to_string())
        .with("body_0_10", body.to_string())
        .with("overall_0_10", overall.to_string())
}

/// Six brews across two brewers, two roasters and two grinders
pub fn tasting_log() -> Vec<BrewRecord> {
    vec![
        rated(brew("B001"), [7.0, 6.0, 2.0, 5.0, 8.0]).with("water_temp_c", "93"),
        rated(brew("B002"), [6.5, 6.0, 2.5, 5.0, 7.5]).with("water_temp_c", "94"),
        rated(brew("B003"), [4.0, 3.0, 6.0, 7.0, 5.0])
            .with("brewer_brand", "AeroPress")
            .with("brewer_model", "Original")
            .with("brew_method", "immersion")
            .with("water_temp_c", "85"),
        rated(brew("B004"), [8.0, 7.0, 1.0, 4.0, 9.0])
            .with("roaster", "Sey")
            .with("coffee_name", "Kochere")
            .with("notes_intensities", "jasmine:5;Chocolate:2"),
        rated(brew("B005"), [5.0, 4.0, 5.0, 6.0, 6.0])
            .with("brewer_brand", "AeroPress")
            .with("brewer_model", "Original")
            .with("brew_method", "immersion")
            .with("grinder", "Baratza Encore")
            .with("grind_setting", "14"),
        rated(brew("B006"), [7.0, 6.0, 2.0, 5.0, 8.0]).with("water_temp_c", "93"),
    ]
}
