mod config;
mod input;
mod logging;
mod output;
mod pipeline;
mod tasks;
mod tiles;

use clap::Parser;
use thiserror::Error;

use crate::config::{Cli, Command, ConfigError, RunArgs, resolve_config};
use crate::output::{OutputError, write_summary};
use crate::pipeline::{PipelineError, run_all};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(&args),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(args: &RunArgs) -> Result<(), AppError> {
    let config = resolve_config(args)?;
    tracing::info!(
        root = %config.root.display(),
        manifests = %config.manifests.display(),
        out = %config.out.display(),
        tasks = config.tasks.len(),
        tile_order = ?config.tile_order,
        "starting run"
    );

    let summary = run_all(&config)?;
    if let Some(path) = &config.summary {
        write_summary(path, &summary)?;
        tracing::info!(path = %path.display(), "wrote run summary");
    }

    let failed = summary.failed();
    if failed > 0 {
        return Err(PipelineError::TasksFailed {
            failed,
            total: summary.tasks.len(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
