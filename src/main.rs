use anyhow::{anyhow, Context};
use clap::Parser;
use sigace_import::utils::{logger, validation::Validate};
use sigace_import::{
    failed_items, parse_identifiers, ready_items, sniff_format, CliConfig, DatajudClient,
    ImportConfig, ImportExecutor, ImportItem, ImportSession, InputFormat, PreviewReconciler,
    RestStore, SessionProgress,
};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting sigace-import");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let config = match ImportConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Could not resolve configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // Parse the input file into raw identifiers
    let bytes = std::fs::read(&cli.input).with_context(|| format!("reading {}", cli.input))?;
    let format = match cli.format.as_deref() {
        Some(name) => InputFormat::from_name(name)
            .ok_or_else(|| anyhow!("unknown format '{}', expected csv, xlsx, xls or txt", name))?,
        None => sniff_format(None, &cli.input, Some(&bytes))
            .ok_or_else(|| anyhow!("could not detect the format of '{}'", cli.input))?,
    };
    let raw_ids = parse_identifiers(&bytes, format)?;
    tracing::info!("📄 Parsed {} process numbers from {}", raw_ids.len(), cli.input);

    // Resolve every identifier against the search API, in input order
    let lookup = DatajudClient::new(&config);
    let reconciler = PreviewReconciler::new(lookup.clone());
    let items = reconciler.ingest(raw_ids).await;

    let mut session = ImportSession::new();
    if let Err(e) = session.upload(items) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    print_validation_summary(session.items());

    if let Err(e) = session.confirm() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if !cli.yes && !ask_confirmation(session.ready_count()) {
        println!("Import aborted.");
        return Ok(());
    }

    session.begin_import()?;

    let ready: Vec<ImportItem> = ready_items(session.items())
        .into_iter()
        .cloned()
        .collect();
    let store = RestStore::new(&config);
    // share the session with the executor so its progress lands in the state
    let session = Arc::new(Mutex::new(session));
    let executor = ImportExecutor::new(lookup, store, SessionProgress::new(session.clone()));
    let outcome = executor.run(&ready).await;

    let mut session = session
        .lock()
        .map_err(|_| anyhow!("import session lock poisoned"))?;
    session.complete(outcome)?;

    println!(
        "✅ Import finished: {} imported, {} already existed",
        outcome.imported, outcome.already_imported
    );
    Ok(())
}

fn print_validation_summary(items: &[ImportItem]) {
    let ready = ready_items(items);
    let failed = failed_items(items);

    println!("✅ {} process(es) ready to import", ready.len());
    if !failed.is_empty() {
        println!("⚠️ {} with problems:", failed.len());
        for item in failed {
            println!(
                "  - {}: {}",
                item.raw,
                item.message.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn ask_confirmation(ready_count: usize) -> bool {
    use std::io::Write;

    print!("Import {} process(es)? [y/N] ", ready_count);
    std::io::stdout().flush().ok();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "s" | "sim")
}
