use anyhow::Result;
use clap::Parser;

pub mod batch;
pub mod cli;
pub mod report;

use cli::{Cli, Command};
use report::BatchReport;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .format_timestamp(None)
        .init();

    // 3. Charger la config, puis les overrides CLI
    let mut config = cli.resolve_config()?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    // 4. Lancer le lot
    let mut report = BatchReport::new(&config);
    let result = match &cli.command {
        Command::Process(_) => batch::process_all_sessions(&config, &mut report),
        Command::Merge(_) => batch::merge_all_classes(&config, &mut report),
        Command::Run(_) => batch::process_all_sessions(&config, &mut report)
            .and_then(|()| batch::merge_all_classes(&config, &mut report)),
    };
    if let Err(e) = result {
        log::error!("{e:#}");
        return Err(e);
    }

    // 5. Bilan
    report.log_summary();
    if let Some(path) = &cli.report {
        report.write_json(path)?;
    }
    log::info!("Traitement terminé.");
    Ok(())
}
