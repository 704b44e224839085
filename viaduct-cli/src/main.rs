//! entrypoint for viaduct

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![cfg_attr(test, allow(clippy::float_cmp))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

use clap::{Parser, Subcommand};
use rama::core::error::BoxError;
use tracing::level_filters::LevelFilter;

pub mod cmd;
use cmd::proxy;

pub mod error;
pub mod trace;

#[cfg(target_family = "unix")]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "viaduct")]
#[command(bin_name = "viaduct")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmds: CliCommands,
}

#[derive(Debug, Subcommand)]
enum CliCommands {
    /// run the forwarding HTTP(S) proxy
    Proxy(proxy::ProxyArgs),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let CliCommands::Proxy(ref args) = cli.cmds;
    let default_directive = args
        .log_level
        .parse::<tracing_subscriber::filter::Directive>()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    trace::init_tracing(default_directive)?;

    #[allow(clippy::exit)]
    match match cli.cmds {
        CliCommands::Proxy(cfg) => proxy::run(cfg).await,
    } {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Some(err) = err.downcast_ref::<error::ErrorWithExitCode>() {
                eprintln!("exit with error ({}): {err}", err.exit_code());
                std::process::exit(err.exit_code());
            } else {
                eprintln!("exit with error: {err}");
                std::process::exit(1);
            }
        }
    }
}
