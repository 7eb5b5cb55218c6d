use clap::Parser;
use hero_draft::utils::error::{ErrorSeverity, HeroError};
use hero_draft::utils::{logger, validation::Validate};
use hero_draft::{build_engine, CliConfig, DraftEngine, DraftOutcome, DraftRequest};
use tokio::io::{AsyncBufReadExt, BufReader};

fn exit_code(e: &HeroError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: HeroError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e).max(1));
}

fn print_outcome(outcome: &DraftOutcome, as_json: bool) {
    if as_json {
        match serde_json::to_string_pretty(outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e.into()),
        }
        return;
    }

    println!("{}", outcome.payload.text);
    if !outcome.payload.followups.is_empty() {
        println!();
        for followup in &outcome.payload.followups {
            println!("  › {}", followup);
        }
    }
}

async fn answer(engine: &DraftEngine, cli: &CliConfig, message: &str) {
    let mut request = DraftRequest::new(message);
    if let Some(sender) = &cli.sender {
        request = request.with_sender(sender.clone());
    }

    match engine.draft(&request).await {
        Ok(outcome) => print_outcome(&outcome, cli.json),
        Err(e) => {
            tracing::warn!("⚠️ {}", e);
            eprintln!("⚠️ {}", e.user_friendly_message());
            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = cli.load_config().unwrap_or_else(|e| fail(e));
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(e);
    }

    let engine = build_engine(&config).unwrap_or_else(|e| fail(e));

    if let Some(message) = &cli.message {
        answer(&engine, &cli, message).await;
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        answer(&engine, &cli, &line).await;
        println!("---");
    }

    Ok(())
}
