//! Command handlers. Each one validates its arguments, runs a single remote
//! operation through [`Session`] and renders the result.

pub mod device;
pub mod download;
pub mod links;
pub mod login;
pub mod version;

use crate::build_info::BuildInfo;
use crate::cli::Command;
use crate::session::{Connector, Session};
use anyhow::Result;
use comfy_table::{Table, presets};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::Write;

/// Dispatches a parsed command
///
/// # Errors
///
/// Returns the error of the failing command
pub async fn run<C, W>(command: Command, session: &Session<C>, out: &mut W) -> Result<()>
where
    C: Connector,
    W: Write,
{
    match command {
        Command::Login(args) => login::run(args, session, out).await,
        Command::Device { command } => device::run(command, session, out).await,
        Command::Download { command } => download::run(command, session, out).await,
        Command::Links { command } => links::run(command, session, out).await,
        Command::Version => version::run(&BuildInfo::current(), out),
    }
}

/// Writes `value` as JSON indented with four spaces
pub(crate) fn print_json<T, W>(out: &mut W, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn print_table<W: Write>(
    out: &mut W,
    header: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<()> {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL);
    table.set_header(header.to_vec());
    for row in rows {
        table.add_row(row);
    }
    writeln!(out, "{table}")?;
    Ok(())
}
