use std::io::Read;

use anyhow::Context;
use colored::Colorize;
use rrp_server::{AppConfig, AppState, RrpServer};
use rrp_service::{Details, RatingPool, RatingView, SubmissionOutcome};
use serde_json::Value;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Submit(args) => cmd_submit(&config, args, &cli.format).await,
        Command::Get(args) => cmd_get(&config, args, &cli.format).await,
        Command::Entries(args) => cmd_entries(&config, args, &cli.format).await,
        Command::Config => cmd_config(&config),
        Command::Serve(args) => cmd_serve(config, args).await,
    }
}

async fn cmd_submit(config: &AppConfig, args: SubmitArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let text = if args.file == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
        text
    } else {
        std::fs::read_to_string(&args.file).with_context(|| format!("reading {}", args.file))?
    };
    let payload: Value = serde_json::from_str(&text).context("submission is not valid JSON")?;

    let pool = RatingPool::open(&config.pool).await?;
    let outcome = pool.submit(&payload).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_outcome(&outcome),
    }
    Ok(())
}

async fn cmd_get(config: &AppConfig, args: GetArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let pool = RatingPool::open(&config.pool).await?;
    let view = pool.get(&args.name).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => print_view(&view),
    }
    Ok(())
}

async fn cmd_entries(config: &AppConfig, args: EntriesArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let pool = RatingPool::open(&config.pool).await?;
    let entries = pool.entries(&args.name).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text if entries.is_empty() => {
            println!("No ratings for {}.", args.name.bold());
        }
        OutputFormat::Text => {
            println!("{} ratings for {}", entries.len().to_string().bold(), args.name.bold());
            for entry in &entries {
                println!("  {}  {}", entry.rating.to_string().yellow(), entry.id.to_string().dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_config(config: &AppConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

async fn cmd_serve(mut config: AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind.parse().with_context(|| format!("invalid bind address {bind}"))?;
    }
    let pool = RatingPool::open(&config.pool).await?;
    println!("RRP server on {}", config.server.bind_addr.to_string().bold());
    RrpServer::new(config.server, AppState::new(pool)).serve().await?;
    Ok(())
}

fn print_outcome(outcome: &SubmissionOutcome) {
    println!("{} Rating {} recorded for {}", "✓".green().bold(), outcome.rating.to_string().yellow(), outcome.restaurant.bold());
    match outcome.prior_average {
        Some(avg) => println!("  Prior average: {avg:.2}"),
        None => println!("  Prior average: {}", "none (first rating)".dimmed()),
    }
    if outcome.below_average {
        let notice = if outcome.notified { "below average, alert sent" } else { "below average" };
        println!("  {}", notice.red());
    }
    if outcome.details_created {
        println!("  Details: {}", "recorded".green());
    }
}

fn print_view(view: &RatingView) {
    match &view.details {
        Details::Known(record) => {
            println!("{}", record.name.bold());
            println!("  Address: {}", record.address);
            println!("  Description: {}", record.description);
            for (day, hours) in record.hours.iter() {
                println!("  {:<10} {}", format!("{day}:"), hours);
            }
        }
        Details::Default { name } => {
            println!("{} {}", name.bold(), "(no details recorded)".dimmed());
        }
    }
    match view.average {
        Some(avg) => println!("  Average: {}", format!("{avg:.2}").yellow().bold()),
        None => println!("  Average: {}", "no ratings yet".dimmed()),
    }
}
