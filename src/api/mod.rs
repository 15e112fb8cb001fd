//! Remote-control API seam.
//!
//! Commands talk to [`RemoteClient`] and [`Device`] only; [`MyJd`] is the
//! HTTP implementation used by the binary.

pub mod client;
pub mod crypto;
pub mod entities;

pub use client::{MyJd, MyJdBuilder, MyJdDevice};

use crate::api::entities::{
    AddLinksQuery, CollectorLink, DeviceInfo, DownloadLink, DownloadPackage, LinkCollectingJob,
};
use anyhow::Result;
use async_trait::async_trait;

/// Account-level operations
#[async_trait]
pub trait RemoteClient: Send + Sync {
    type Device: Device;

    /// Opens a session
    async fn connect(&mut self) -> Result<()>;

    /// Closes the session
    async fn disconnect(&mut self) -> Result<()>;

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Returns a handle for the device with the given name
    ///
    /// Fails with [`crate::error::JdError::DeviceNotFound`] when no such device is registered.
    async fn device(&self, name: &str) -> Result<Self::Device>;
}

/// Operations on a single device
#[async_trait]
pub trait Device: Send + Sync {
    fn info(&self) -> &DeviceInfo;

    async fn download_links(&self) -> Result<Vec<DownloadLink>>;

    async fn download_packages(&self) -> Result<Vec<DownloadPackage>>;

    /// Removes links and packages from the download list
    async fn remove_downloads(&self, link_ids: &[i64], package_ids: &[i64]) -> Result<()>;

    async fn pause_downloads(&self, pause: bool) -> Result<bool>;

    async fn stop_downloads(&self) -> Result<bool>;

    async fn start_downloads(&self) -> Result<bool>;

    /// Current controller state, e.g. `RUNNING` or `IDLE`
    async fn download_state(&self) -> Result<String>;

    /// Current overall speed in bytes per second
    async fn download_speed(&self) -> Result<Option<f64>>;

    async fn add_links(&self, query: &AddLinksQuery) -> Result<LinkCollectingJob>;

    async fn collector_links(&self) -> Result<Vec<CollectorLink>>;
}
