use menu_core::core::catalog::Catalog;
use menu_core::core::types::{Category, Dish};
use menu_core::daily_log::{DailyLogEntry, LogQuery};
use menu_core::{DietProfile, EngineConfig, MenuEngine, MenuError};
use std::collections::HashSet;
use std::path::Path;

fn config_in(dir: &Path, seed: u64) -> EngineConfig {
    EngineConfig {
        data_dir: dir.to_path_buf(),
        seed: Some(seed),
        ..EngineConfig::default()
    }
}

fn fingerprint(entry: &DailyLogEntry) -> Vec<String> {
    let mut pair: Vec<String> = entry
        .stations
        .iter()
        .filter(|s| s.station == "Shack 5" || s.station == "Shack 6")
        .map(|s| s.dish.clone())
        .collect();
    pair.sort();
    let mut key: Vec<String> = entry
        .stations
        .iter()
        .filter(|s| s.station == "Shack 1" || s.station == "Shack 3")
        .map(|s| s.dish.clone())
        .collect();
    key.extend(pair);
    key
}

#[test]
fn ledger_and_log_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = MenuEngine::open(&config_in(dir.path(), 1)).unwrap();
        for profile in [DietProfile::None, DietProfile::Jain, DietProfile::Swaminarayan] {
            engine.generate(profile).unwrap();
        }
    }

    // Same seed: the sampler replays its first draws, which are now all taken.
    let mut engine = MenuEngine::open(&config_in(dir.path(), 1)).unwrap();
    assert_eq!(engine.ledger().len(), 3);
    assert_eq!(engine.log().len(), 3);

    for _ in 0..20 {
        engine.generate(DietProfile::None).unwrap();
    }
    let entries = engine.query_log(&LogQuery::all());
    let unique: HashSet<Vec<String>> = entries.iter().map(|e| fingerprint(e)).collect();
    assert_eq!(unique.len(), 23);
}

#[test]
fn exhaustion_and_reset_persist() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new(vec![
        Category::variable(
            "Gujarati Curry",
            &["Shack 1"],
            vec![Dish::untagged("Tindora Dry"), Dish::untagged("Turiya Patra")],
        ),
        Category::fixed("Undhiyu", "Shack 2", "Undhiyu"),
        Category::variable(
            "Punjabi Curry",
            &["Shack 5", "Shack 6"],
            vec![
                Dish::untagged("Kaju Corn"),
                Dish::untagged("Palak Paneer"),
                Dish::untagged("Dal Fry"),
            ],
        ),
    ])
    .unwrap();
    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(&catalog_path, serde_json::to_string(&catalog).unwrap()).unwrap();

    let config = EngineConfig {
        catalog_file: Some(catalog_path),
        attempt_budget: 300,
        ..config_in(&dir.path().join("state"), 4)
    };

    {
        let mut engine = MenuEngine::open(&config).unwrap();
        for _ in 0..6 {
            engine.generate(DietProfile::None).unwrap();
        }
    }

    let mut engine = MenuEngine::open(&config).unwrap();
    assert_eq!(engine.remaining(DietProfile::None), 0);
    assert!(matches!(
        engine.generate(DietProfile::None),
        Err(MenuError::BudgetExhausted { attempts: 300, .. })
    ));

    engine.reset_ledger().unwrap();
    drop(engine);

    let mut engine = MenuEngine::open(&config).unwrap();
    assert!(engine.ledger().is_empty());
    assert_eq!(engine.log().len(), 6);
    assert!(engine.generate(DietProfile::None).is_ok());
}

#[test]
fn torn_log_tail_does_not_block_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), 2);
    {
        let mut engine = MenuEngine::open(&config).unwrap();
        engine.generate(DietProfile::None).unwrap();
    }

    // A crash mid-append leaves half a record behind.
    let mut log = std::fs::OpenOptions::new()
        .append(true)
        .open(config.log_path())
        .unwrap();
    std::io::Write::write_all(&mut log, br#"{"timestamp":"2026-10-"#).unwrap();
    drop(log);

    let mut engine = MenuEngine::open(&config).unwrap();
    assert_eq!(engine.log().len(), 1);
    engine.generate(DietProfile::Jain).unwrap();
    drop(engine);

    let engine = MenuEngine::open(&config).unwrap();
    assert_eq!(engine.log().len(), 2);
    assert_eq!(engine.ledger().len(), 2);
}
