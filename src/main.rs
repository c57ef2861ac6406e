// main.rs
use salesbro::config::{config_path, load_config, save_config, Config};
use salesbro::loader::load_table;
use salesbro::user_interaction::{print_insight, TerminalPrompter};
use salesbro::Dashboard;
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const BRO_VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() {
    let filter = EnvFilter::try_from_env("SALESBRO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if env::args().any(|arg| arg == "--version") {
        print_insight(BRO_VERSION);
        process::exit(0);
    }

    init_logging();

    let path = config_path();
    if !path.exists() {
        if let Err(e) = save_config(&path, &Config::default()) {
            tracing::warn!("could not write default config to {}: {}", path.display(), e);
        }
    }
    let config = load_config(&path)?;
    let source = match env::args().nth(1).or_else(|| config.default_source.clone()) {
        Some(source) => PathBuf::from(source),
        None => {
            print_insight("Usage: salesbro [SOURCE]   (a .csv, .xlsx or .xls sales file)");
            print_insight("Or set \"default_source\" in your salesbro.config.");
            process::exit(2);
        }
    };

    let dataset = load_table(&source)?;
    print_insight(&format!(
        "Loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        source.display()
    ));

    let mut prompter = TerminalPrompter::new()?;
    let mut dashboard = Dashboard::new(dataset, config);
    dashboard.run(&mut prompter)?;

    tracing::info!("session ended with {} stored results", dashboard.store().len());
    Ok(())
}
