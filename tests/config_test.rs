use moodpick::EngineConfig;

#[test]
fn defaults_match_documented_values() {
    let config = EngineConfig::default();

    assert!((config.recs.epsilon - 0.30).abs() < 1e-9);
    assert_eq!(config.recs.max_candidates, 500);
    assert_eq!(config.recs.anti_repeat_days, 90);
    assert!(config.recs.prefer_curated);
    assert!(!config.recs.require_tags);
    assert_eq!(config.recs.min_curated, 5);
    assert_eq!(config.recs.explore_top_k, 20);
    assert!((config.recs.weight_multiplier - 0.25).abs() < 1e-9);
    assert_eq!(config.llm.timeout_ms, 5000);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");

    let (config, resolved) = EngineConfig::load(Some(path.clone())).unwrap();
    assert_eq!(resolved, Some(path));
    assert_eq!(config.recs.max_candidates, 500);
}

#[test]
fn write_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sub").join("moodpick.toml");

    let mut config = EngineConfig::default();
    config.recs.epsilon = 0.15;
    config.recs.max_candidates = 42;
    config.llm.enabled = false;
    config.write(&path).unwrap();

    let (loaded, _) = EngineConfig::load(Some(path)).unwrap();
    assert!((loaded.recs.epsilon - 0.15).abs() < 1e-9);
    assert_eq!(loaded.recs.max_candidates, 42);
    assert!(!loaded.llm.enabled);
}

#[test]
fn partial_toml_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "[recs]\nepsilon = 0.5\nmax_candidates = 10\nanti_repeat_days = 7\nprefer_curated = false\nrequire_tags = true\nmin_curated = 2\nexplore_top_k = 5\nweight_multiplier = 0.1\n").unwrap();

    let (config, _) = EngineConfig::load(Some(path)).unwrap();
    assert!((config.recs.epsilon - 0.5).abs() < 1e-9);
    assert_eq!(config.recs.anti_repeat_days, 7);
    // The llm section was absent and keeps its defaults.
    assert_eq!(config.llm.timeout_ms, 5000);
}
