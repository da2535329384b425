// Capacity report for the configured catalog.
// Run with: cargo run --bin catalog_report [config.json]
use menu_core::core::types::CategoryKind;
use menu_core::{DietProfile, EngineConfig, MenuEngine};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config_path = std::env::args().nth(1);
    let config = EngineConfig::load(config_path.as_deref().map(Path::new))?;
    let engine = MenuEngine::open(&config)?;

    println!("Issued so far: {}", engine.ledger().len());
    for profile in DietProfile::ALL {
        println!("\n{}", profile);
        let view = engine.catalog().view(engine.rules(), profile);
        for entry in &view.entries {
            match &entry.category.kind {
                CategoryKind::Fixed { station, dish } => {
                    println!("  {:<16} {} (fixed at {})", entry.category.name, dish, station);
                }
                CategoryKind::Variable { stations } => {
                    println!(
                        "  {:<16} {} of {} eligible, {} per menu",
                        entry.category.name,
                        entry.eligible.len(),
                        entry.category.dishes.len(),
                        stations.len()
                    );
                }
            }
        }
        match view.shortfall() {
            Some(s) => println!(
                "  infeasible: '{}' has {} eligible, needs {}",
                s.category, s.eligible, s.required
            ),
            None => println!(
                "  {} combinations, {} remaining",
                view.combination_count(),
                engine.remaining(profile)
            ),
        }
    }
    Ok(())
}
