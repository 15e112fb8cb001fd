use crate::api::Device;
use crate::api::entities::{DownloadLink, DownloadPackage};
use crate::cli::{DeviceArgs, DownloadCommand, LinkCommand, ListArgs, PackageCommand, RmArgs};
use crate::commands::{print_json, print_table};
use crate::error::JdError::Validation;
use crate::format::{compress_url, format_eta, format_size, format_speed};
use crate::session::{Connector, Session};
use anyhow::Result;
use std::io::Write;

const LINK_COLUMNS: [&str; 6] = ["ID", "URL", "State", "ETA", "Speed", "Size"];
const PACKAGE_COLUMNS: [&str; 5] = ["ID", "Name", "Status", "Save to", "Total size"];

/// Status the downloader reports for completed links
pub const FINISHED: &str = "Finished";

pub async fn run<C, W>(command: DownloadCommand, session: &Session<C>, out: &mut W) -> Result<()>
where
    C: Connector,
    W: Write,
{
    match command {
        DownloadCommand::Link {
            command: LinkCommand::List(args),
        } => list_links(args, session, out).await,
        DownloadCommand::Link {
            command: LinkCommand::Rm(args),
        } => remove_links(args, session, out).await,
        DownloadCommand::Package {
            command: PackageCommand::List(args),
        } => list_packages(args, session, out).await,
        DownloadCommand::Status(args) => status(args, session, out).await,
        DownloadCommand::Clean(args) => clean(args, session, out).await,
        DownloadCommand::Pause(args) => {
            let pause = !args.resume;
            let res = session
                .with_device(args.target.device.as_deref(), |device| async move {
                    device.pause_downloads(pause).await
                })
                .await?;
            print_result(res, out)
        }
        DownloadCommand::Stop(args) => {
            let res = session
                .with_device(args.device.as_deref(), |device| async move {
                    device.stop_downloads().await
                })
                .await?;
            print_result(res, out)
        }
        DownloadCommand::Start(args) => {
            let res = session
                .with_device(args.device.as_deref(), |device| async move {
                    device.start_downloads().await
                })
                .await?;
            print_result(res, out)
        }
    }
}

async fn list_links<C: Connector, W: Write>(
    args: ListArgs,
    session: &Session<C>,
    out: &mut W,
) -> Result<()> {
    let links = session
        .with_device(args.target.device.as_deref(), |device| async move {
            device.download_links().await
        })
        .await?;

    if args.json {
        return print_json(out, &links);
    }
    let rows = links.iter().map(|link| {
        vec![
            link.uuid.to_string(),
            compress_url(link.url.as_deref().unwrap_or_default()),
            link.status.clone().unwrap_or_default(),
            format_eta(link.eta),
            format_speed(link.speed),
            format_size(link.bytes_total),
        ]
    });
    print_table(out, &LINK_COLUMNS, rows)
}

async fn remove_links<C: Connector, W: Write>(
    args: RmArgs,
    session: &Session<C>,
    out: &mut W,
) -> Result<()> {
    if args.ids.is_empty() {
        return Err(Validation(
            "no link identifier(s) was specified (use --id id1 --id id2 ...)".into(),
        )
        .into());
    }

    let ids = args.ids;
    let count = ids.len();
    session
        .with_device(args.target.device.as_deref(), |device| async move {
            device.remove_downloads(&ids, &[]).await
        })
        .await?;
    writeln!(out, "{count} links removed")?;
    Ok(())
}

async fn list_packages<C: Connector, W: Write>(
    args: ListArgs,
    session: &Session<C>,
    out: &mut W,
) -> Result<()> {
    let packages: Vec<DownloadPackage> = session
        .with_device(args.target.device.as_deref(), |device| async move {
            device.download_packages().await
        })
        .await?;

    if args.json {
        return print_json(out, &packages);
    }
    let rows = packages.iter().map(|package| {
        vec![
            package.uuid.to_string(),
            package.name.clone().unwrap_or_default(),
            package.status.clone().unwrap_or_default(),
            package.save_to.clone().unwrap_or_default(),
            format_size(package.bytes_total),
        ]
    });
    print_table(out, &PACKAGE_COLUMNS, rows)
}

async fn status<C: Connector, W: Write>(
    args: DeviceArgs,
    session: &Session<C>,
    out: &mut W,
) -> Result<()> {
    let (state, speed) = session
        .with_device(args.device.as_deref(), |device| async move {
            let speed = device.download_speed().await?;
            let state = device.download_state().await?;
            Ok((state, speed))
        })
        .await?;

    writeln!(out, "Download status: {state}")?;
    writeln!(out, "Download speed: {}", format_speed(speed))?;
    Ok(())
}

/// Removes every finished link from the download list
async fn clean<C: Connector, W: Write>(
    args: DeviceArgs,
    session: &Session<C>,
    out: &mut W,
) -> Result<()> {
    let removed = session
        .with_device(args.device.as_deref(), |device| async move {
            let links = device.download_links().await?;
            let finished: Vec<DownloadLink> = finished_links(&links).cloned().collect();
            if !finished.is_empty() {
                let ids: Vec<i64> = finished.iter().map(|link| link.uuid).collect();
                device.remove_downloads(&ids, &[]).await?;
            }
            Ok(finished)
        })
        .await?;

    if removed.is_empty() {
        writeln!(out, "Nothing to clean")?;
        return Ok(());
    }
    for link in &removed {
        let label = link.url.as_deref().or(link.name.as_deref()).unwrap_or_default();
        writeln!(out, "{label} is completed and was removed")?;
    }
    writeln!(out, "{} links cleaned", removed.len())?;
    Ok(())
}

fn finished_links(links: &[DownloadLink]) -> impl Iterator<Item = &DownloadLink> {
    links
        .iter()
        .filter(|link| link.status.as_deref() == Some(FINISHED))
}

fn print_result<W: Write>(res: bool, out: &mut W) -> Result<()> {
    writeln!(out, "Result : {res}")?;
    Ok(())
}
