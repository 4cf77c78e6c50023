mod cli;
mod commands;
mod config;
mod main_lib;
mod reporter;

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands};
use commands::ImportArgs;
use config::Config;
use main_lib::{build_context, import_config, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(&cli.global);
    init_tracing(&config.log_format);

    // Local previews never reach the backend, so they run without a tenant.
    let offline_preview = matches!(&cli.command, Commands::Preview { parse, .. } if parse.offline);
    if !offline_preview {
        config.require_owner_uid()?;
    }

    let mut import_settings = import_config(&config);
    if let Commands::Import {
        timeout_secs: Some(secs),
        ..
    } = &cli.command
    {
        import_settings.timeout = Some(Duration::from_secs(*secs));
    }
    let ctx = build_context(&config, import_settings)?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            signal_token.cancel();
        }
    });

    let json = cli.global.json;
    match cli.command {
        Commands::Preview { file, parse } => {
            commands::preview(&ctx, &file, &parse, json, &cancel).await
        }
        Commands::Import {
            file,
            mappings,
            yes,
            offline,
            ..
        } => {
            let args = ImportArgs {
                file: &file,
                mappings: &mappings,
                yes,
                offline,
            };
            commands::import(&ctx, args, json, &cancel).await
        }
        Commands::Watch { batch_id } => commands::watch(&ctx, &batch_id, json, &cancel).await,
        Commands::History { limit } => commands::history(&ctx, limit, json).await,
        Commands::Sources => commands::sources(&ctx, json).await,
        Commands::Campaigns { command } => commands::campaigns(&ctx, command, json).await,
    }
}
