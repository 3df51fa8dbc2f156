#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use bootstrap::{AppConfig, init_logging};
use seoulmate_application::{CommandResult, Ledger, LedgerProcessor, ProcessingOutcome};
use seoulmate_infrastructure::SeoulmateLedgerParser;
use seoulmate_presentation::{CommandPresenter, format_evaluation_error, format_processing_error};
use std::{borrow::Cow, env, fs, process};

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let Some(path) = env::args().nth(1) else {
        return Err("Usage: seoulmate <trip.ledger>".into());
    };

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;

    let config = AppConfig::from_env().map_err(|err| format!("Invalid configuration: {err}"))?;
    tracing::debug!(?config, "loaded configuration");

    let processor = LedgerProcessor::new(&SeoulmateLedgerParser, config.context)
        .with_exchange_rate(config.exchange_rate);

    let ledger = parse(&processor, &source)?;
    let results = processor
        .run_commands(&ledger)
        .map_err(|err| format_evaluation_error(&err))?;

    println!("{}", render_results(&results, &processor));
    Ok(())
}

fn parse<'a>(processor: &LedgerProcessor<'_>, source: &'a str) -> CliResult<Ledger<'a>> {
    match processor.parse_ledger(source) {
        ProcessingOutcome::Success(ledger) => Ok(ledger),
        outcome => Err(format_processing_error(&outcome)
            .unwrap_or_default()
            .into()),
    }
}

fn render_results(results: &[CommandResult], processor: &LedgerProcessor<'_>) -> String {
    results
        .iter()
        .map(|result| CommandPresenter::render(result, processor.context()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
