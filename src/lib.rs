//!# jdcli
//!
//! A command-line client for the My.JDownloader remote control API. Log in once,
//! then list devices and manage the download list and link collector of any
//! JDownloader instance registered with the account.
//!
//! ## Features
//!
//! - Credential storage in a YAML file (`JD_CONFIG` or the user config directory)
//! - Device discovery, with the first device used when none is named
//! - List, remove and clean download links; list download packages
//! - Pause, stop and start the downloader; show its state and speed
//! - Add links to the link collector from flags or a file
//! - Table or JSON output
//!
//! ## Usage example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use jdcli::api::Device;
//! use jdcli::config::ConfigStore;
//! use jdcli::session::{MyJdConnector, Session};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let session = Session::new(ConfigStore::from_env()?, MyJdConnector, false);
//!
//!     let links = session
//!         .with_device(None, |device| async move { device.download_links().await })
//!         .await?;
//!     for link in links {
//!         println!("link: {}, status: {:?}", link.uuid, link.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod build_info;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod session;
