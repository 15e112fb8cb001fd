use crate::build_info::BuildInfo;
use anyhow::Result;
use std::io::Write;

pub fn run<W: Write>(info: &BuildInfo, out: &mut W) -> Result<()> {
    writeln!(out, "{info}")?;
    Ok(())
}
