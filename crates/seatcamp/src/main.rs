use anyhow::Context;
use clap::Parser as ClapParser;
use seatcamp_core::{
    CampConfig, ConfigLoader, PageSession, cancel_channel, classify, parse_crns, run_attempt,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the WebDriver server to attach to (e.g. a running chromedriver)
    #[arg(short, long, default_value = "http://localhost:9515")]
    webdriver_url: String,

    /// Course codes to submit, separated by spaces or commas.
    /// Prompted for interactively when omitted.
    #[arg(long)]
    crns: Option<String>,

    /// Attempt registration once instead of camping until it succeeds
    #[arg(long)]
    once: bool,

    /// Config file (YAML). Defaults to ./seatcamp.yaml, then
    /// ~/.seatcamp/config.yaml, then built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the minimum inter-attempt delay in seconds
    #[arg(long)]
    min_delay: Option<u64>,

    /// Override the maximum inter-attempt delay in seconds
    #[arg(long)]
    max_delay: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

async fn prompt_line(
    reader: &mut Lines<BufReader<Stdin>>,
    prompt: &str,
) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let line = reader.next_line().await?.unwrap_or_default();
    Ok(line.trim().to_string())
}

/// One attempt, classified. Errors come back to the caller so the session
/// still gets closed before the process exits.
async fn run_once<S: PageSession + ?Sized>(
    session: &mut S,
    crns: &[seatcamp_core::Crn],
    config: &CampConfig,
) -> anyhow::Result<seatcamp_core::AttemptResult> {
    run_attempt(session, crns, config).await?;
    Ok(classify(session, &config.closed_phrases).await?)
}

async fn load_config(args: &Args) -> anyhow::Result<CampConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };
    if let Some(min) = args.min_delay {
        config.min_delay_s = min;
    }
    if let Some(max) = args.max_delay {
        config.max_delay_s = max;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&args).await?;

    let mut session =
        match seatcamp_webdriver::WebDriverSession::connect(&args.webdriver_url, None).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to connect: {e}");
                std::process::exit(1);
            }
        };

    if let Err(e) = session.navigate(&config.register_url).await {
        warn!("Initial navigation failed: {e}");
    }

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();

    println!();
    println!("1) Browser session opened.");
    println!("2) Log in manually (SSO/MFA) and navigate to:");
    println!("   Register for Classes -> Enter CRNs");
    println!();
    prompt_line(
        &mut reader,
        "Press Enter here once you're on the Enter CRNs screen...",
    )
    .await?;

    let raw = match args.crns {
        Some(crns) => crns,
        None => {
            prompt_line(
                &mut reader,
                "Enter CRN(s) (one or multiple, separated by spaces/commas): ",
            )
            .await?
        }
    };

    let batch = parse_crns(&raw);
    for notice in &batch.skipped {
        warn!("{notice}");
    }
    if batch.is_empty() {
        println!("No valid CRNs provided. Exiting.");
        session.close().await?;
        return Ok(());
    }

    let (handle, mut cancel) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let result = if args.once {
        match run_once(&mut session, &batch.codes, &config).await {
            Ok(result) => result,
            Err(e) => {
                error!("Attempt failed: {e}");
                session.close().await?;
                return Err(e);
            }
        }
    } else {
        seatcamp_core::camp(&mut session, &batch.codes, &config, &mut cancel).await
    };

    info!(
        "Final result: registered={} closed={}",
        result.succeeded, result.unavailable
    );
    println!("{}", serde_json::to_string_pretty(&result)?);

    prompt_line(&mut reader, "\nDone. Press Enter to quit...").await?;
    session.close().await?;
    Ok(())
}
