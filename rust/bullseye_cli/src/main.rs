mod cli;
mod commands;
mod config;
mod error;
mod processing;

use clap::Parser;
use tracing::error;
use tracing::subscriber::set_global_default;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

use crate::cli::{
    Args,
    Commands,
};
use crate::commands::{
    main_persist,
    main_run,
    main_write_template,
};
use crate::error::CliError;

// Not using mimalloc makes everything extremely slow on windows.
#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), CliError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE));
    set_global_default(subscriber)?;

    let args = Args::parse();
    let res = match args.command {
        Some(Commands::Run(args)) => main_run(args),
        Some(Commands::Persist(args)) => main_persist(args),
        Some(Commands::WriteTemplate(args)) => main_write_template(args),
        None => {
            println!("No command provided");
            Ok(())
        }
    };
    if let Err(e) = &res {
        error!("{}", e);
    }
    res
}
