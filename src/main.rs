use anyhow::Result;
use clap::Parser;
use jdcli::cli::Cli;
use jdcli::commands;
use jdcli::config::ConfigStore;
use jdcli::session::{MyJdConnector, Session};
use log::LevelFilter;
use std::io;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let session = Session::new(ConfigStore::from_env()?, MyJdConnector, cli.debug);
    let mut out = io::stdout().lock();
    commands::run(cli.command, &session, &mut out).await
}

/// Debug output for this crate with `--debug`, warnings otherwise; `RUST_LOG` wins
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("jdcli", level)
        .parse_default_env()
        .init();
}
