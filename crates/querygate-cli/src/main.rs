//! querygate command line

mod cli;
mod commands;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use querygate_core::logging::{file_logger, ConsoleLogger, FileLogger, Logger, TeeLogger};

use cli::{Cli, Commands, ToolsCommands};
use error::CliResult;

/// `Ok(false)` when the command ran but produced an error answer
async fn run(cli: Cli, logger: Arc<dyn Logger>) -> CliResult<bool> {
    if let Commands::Bridge { snapshot } = &cli.command {
        commands::bridge(snapshot, logger).await?;
        return Ok(true);
    }

    let config = commands::load_config(cli.config.as_deref()).await?;
    match cli.command {
        Commands::Route { query } => commands::route(config, &query.join(" "), logger).await,
        Commands::Tools { action } => {
            match action {
                ToolsCommands::List { kind } => commands::tools_list(config, kind.as_deref(), logger).await?,
                ToolsCommands::Show { name } => commands::tools_show(config, &name, logger).await?,
                ToolsCommands::Add { file } => commands::tools_add(config, &file, logger).await?,
                ToolsCommands::Delete { name } => commands::tools_delete(config, &name, logger).await?,
            }
            Ok(true)
        }
        Commands::Bridge { .. } => Ok(true),
    }
}

/// Console on stderr, plus the debug file when `QUERYGATE_DEBUG` is set
fn logger_for(cli: &Cli) -> Arc<dyn Logger> {
    // stdout carries answers, or MCP in the bridge child
    let console: Arc<dyn Logger> = Arc::new(ConsoleLogger::stderr_only().verbose(cli.verbose));
    if !file_logger::is_enabled() {
        return console;
    }
    let component = match cli.command {
        Commands::Bridge { .. } => "bridge",
        _ => "cli",
    };
    Arc::new(TeeLogger::new(vec![console, Arc::new(FileLogger::new(component))]))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = logger_for(&cli);

    match run(cli, logger.clone()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            logger.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
