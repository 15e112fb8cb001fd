use crate::api::Device;
use crate::api::entities::{AddLinksQuery, CollectorLink};
use crate::cli::{AddArgs, LinksCommand, ListArgs};
use crate::commands::{print_json, print_table};
use crate::error::JdError::Validation;
use crate::format::{compress_url, format_size};
use crate::session::{Connector, Session};
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;
use url::Url;

const COLLECTOR_COLUMNS: [&str; 5] = ["ID", "Name", "URL", "Status", "Size"];

pub async fn run<C, W>(command: LinksCommand, session: &Session<C>, out: &mut W) -> Result<()>
where
    C: Connector,
    W: Write,
{
    match command {
        LinksCommand::Add(args) => add(args, session, out).await,
        LinksCommand::List(args) => list(args, session, out).await,
    }
}

async fn add<C: Connector, W: Write>(args: AddArgs, session: &Session<C>, out: &mut W) -> Result<()> {
    let mut links = args.links;
    if let Some(path) = &args.from_file {
        links.extend(read_links_file(path)?);
    }
    if links.is_empty() {
        return Err(Validation("no links specified".into()).into());
    }

    let query = AddLinksQuery {
        autostart: args.auto_start,
        package_name: args.package_name.filter(|name| !name.is_empty()),
        destination_folder: args.download_dir.filter(|dir| !dir.is_empty()),
        ..AddLinksQuery::new(&links)
    };
    let job = session
        .with_device(args.target.device.as_deref(), |device| async move {
            device.add_links(&query).await
        })
        .await?;

    writeln!(out, "Added {} links, link collecting job: {}", links.len(), job.id)?;
    Ok(())
}

async fn list<C: Connector, W: Write>(args: ListArgs, session: &Session<C>, out: &mut W) -> Result<()> {
    let links: Vec<CollectorLink> = session
        .with_device(args.target.device.as_deref(), |device| async move {
            device.collector_links().await
        })
        .await?;

    if args.json {
        return print_json(out, &links);
    }
    if links.is_empty() {
        writeln!(out, "No links")?;
        return Ok(());
    }
    let rows = links.iter().map(|link| {
        vec![
            link.uuid.to_string(),
            link.name.clone().unwrap_or_default(),
            compress_url(link.url.as_deref().unwrap_or_default()),
            link.status.clone().unwrap_or_default(),
            link.bytes_total
                .map(|size| format_size(Some(size)))
                .unwrap_or_default(),
        ]
    });
    print_table(out, &COLLECTOR_COLUMNS, rows)
}

/// Reads URLs from a file, one per line
///
/// # Errors
///
/// Returns an error if the file cannot be read
pub fn read_links_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read links from {}", path.display()))?;
    Ok(parse_links(&content))
}

/// Extracts URLs, skipping blank lines, `;` comments and lines that don't parse
#[must_use]
pub fn parse_links(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(';'))
        .filter(|line| match Url::parse(line) {
            Ok(_) => true,
            Err(e) => {
                debug!("Skipping {line}: {e}");
                false
            }
        })
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DeviceArgs;
    use crate::error::JdError;
    use crate::session::mock::{MockClient, session};

    #[test]
    fn test_parse_links() {
        let content = "\
https://example.com/a.zip

; commented out
;https://example.com/skipped.zip
   https://example.com/b.zip
not a url
magnet:?xt=urn:btih:abc
";
        assert_eq!(
            vec![
                "https://example.com/a.zip",
                "https://example.com/b.zip",
                "magnet:?xt=urn:btih:abc",
            ],
            parse_links(content)
        );
    }

    #[test]
    fn test_read_links_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        fs::write(&path, "https://example.com/a.zip\r\n;skip\r\n").unwrap();
        assert_eq!(vec!["https://example.com/a.zip"], read_links_file(&path).unwrap());

        assert!(read_links_file(&dir.path().join("missing.txt")).is_err());
    }

    #[tokio::test]
    async fn test_add_without_links_fails_before_remote_call() {
        let client = MockClient::with_devices(&["nas"]);
        let (_dir, session) = session(&client, None);

        let mut out = Vec::new();
        let err = run(LinksCommand::Add(AddArgs::default()), &session, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<JdError>(), Some(Validation(_))));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_combines_flags_and_file() {
        let client = MockClient::with_devices(&["nas"]);
        let (dir, session) = session(&client, None);
        let path = dir.path().join("links.txt");
        fs::write(&path, "https://example.com/b.zip\n").unwrap();

        let args = AddArgs {
            target: DeviceArgs {
                device: Some(String::from("nas")),
            },
            links: vec![String::from("https://example.com/a.zip")],
            from_file: Some(path),
            package_name: Some(String::from("pkg")),
            download_dir: Some(String::new()),
            auto_start: true,
        };
        let mut out = Vec::new();
        run(LinksCommand::Add(args), &session, &mut out).await.unwrap();

        assert_eq!(
            "Added 2 links, link collecting job: 42\n",
            String::from_utf8(out).unwrap()
        );
        let state = client.state.lock().unwrap();
        let query = &state.added[0];
        assert_eq!("https://example.com/a.zip\nhttps://example.com/b.zip", query.links);
        assert!(query.autostart);
        assert_eq!(Some("pkg"), query.package_name.as_deref());
        assert_eq!(None, query.destination_folder);
    }

    #[tokio::test]
    async fn test_list_empty_collector() {
        let client = MockClient::with_devices(&["nas"]);
        let (_dir, session) = session(&client, None);

        let mut out = Vec::new();
        run(LinksCommand::List(ListArgs::default()), &session, &mut out)
            .await
            .unwrap();
        assert_eq!("No links\n", String::from_utf8(out).unwrap());
    }

    #[tokio::test]
    async fn test_list_collector_table() {
        let client = MockClient::with_devices(&["nas"]);
        client.state.lock().unwrap().collector = vec![CollectorLink {
            uuid: 9,
            name: Some(String::from("a.zip")),
            url: Some(String::from("https://example.com/a.zip")),
            bytes_total: Some(2048),
            ..Default::default()
        }];
        let (_dir, session) = session(&client, None);

        let mut out = Vec::new();
        run(LinksCommand::List(ListArgs::default()), &session, &mut out)
            .await
            .unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("a.zip"));
        assert!(rendered.contains("2.0 KiB"));
    }
}
