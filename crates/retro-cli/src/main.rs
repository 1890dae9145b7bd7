mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use retro_core::AppConfig;
use retro_domain::Owner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("RETRO_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::output_error(&e.to_string());
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "retro", &mut std::io::stdout());
        return Ok(());
    }

    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.effective_data_dir());
    let user_name = cli.user_name.clone().unwrap_or_else(|| cli.user.clone());
    let ctx = CliContext::new(data_dir, config, Owner::new(cli.user.clone(), user_name));

    match cli.command {
        Commands::Board(board_cmd) => handlers::board::handle(&ctx, board_cmd.action).await?,
        Commands::Template(template_cmd) => {
            handlers::template::handle(&ctx, template_cmd.action).await?
        }
        Commands::Card(card_cmd) => handlers::card::handle(&ctx, card_cmd.action).await?,
        Commands::Watch(args) => handlers::watch::handle(&ctx, args).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
