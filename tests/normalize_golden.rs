use std::fs;

use pagesnap::ColorNormalizer;

#[test]
fn normalized_values_match_golden() {
    let data = fs::read_to_string("tests/normalize_golden.json").expect("Failed to read fixtures");
    let fixtures: serde_json::Value = serde_json::from_str(&data).expect("Invalid JSON");
    let normalizer = ColorNormalizer::new();
    for f in fixtures.as_array().unwrap() {
        let input = f.get("input").unwrap().as_str().unwrap();
        let expected = f.get("expected").unwrap().as_str().unwrap();
        assert_eq!(normalizer.normalize(input), expected, "Mismatch for input {:?}", input);
    }
}

#[test]
fn normalized_output_is_a_fixed_point() {
    let data = fs::read_to_string("tests/normalize_golden.json").expect("Failed to read fixtures");
    let fixtures: serde_json::Value = serde_json::from_str(&data).expect("Invalid JSON");
    let normalizer = ColorNormalizer::new();
    for f in fixtures.as_array().unwrap() {
        let once = normalizer.normalize(f.get("input").unwrap().as_str().unwrap());
        assert_eq!(normalizer.normalize(&once), once);
    }
}

#[test]
fn outputs_are_legacy_parseable() {
    let normalizer = ColorNormalizer::new();
    for input in [
        "oklch(0.7 0.3 20)",
        "lab(52 40 -60 / 0.25)",
        "lch(30 80 300)",
        "color(display-p3 1 0 0)",
        "color(rec2020 0 1 0)",
        "color(xyz-d50 0.2 0.3 0.1)",
    ] {
        let out = normalizer.normalize(input);
        assert!(
            pagesnap::color::parse_legacy(&out).is_ok(),
            "{} -> {} is not legacy syntax",
            input,
            out
        );
    }
}
