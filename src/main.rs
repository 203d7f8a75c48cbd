//! wavscribe CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wavscribe::cli::{
    app::{load_merged_config, run_convert, run_record, run_send, RecordOptions},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    EXIT_ERROR, EXIT_USAGE_ERROR,
};
use wavscribe::domain::config::AppConfig;
use wavscribe::infrastructure::XdgConfigStore;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("wavscribe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wavscribe=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    if let Some(endpoint) = cli.endpoint.as_deref() {
        if let Err(e) = reqwest::Url::parse(endpoint) {
            presenter.error(&format!("Invalid endpoint '{}': {}", endpoint, e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    }

    let cli_config = AppConfig {
        endpoint: cli.endpoint.clone(),
        max_duration: cli.max_duration,
        ..Default::default()
    };

    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Convert { input, output }) => {
            let config = load_merged_config(cli_config).await;
            run_convert(&input, &output, &config).await
        }
        Some(Commands::Send { file }) => {
            let config = load_merged_config(cli_config).await;
            run_send(&file, &config).await
        }
        None => {
            let config = load_merged_config(cli_config).await;
            debug!(?config, "resolved configuration");
            let options = RecordOptions::from_config(&config, cli.output, !cli.no_upload);
            run_record(options).await
        }
    }
}
