//! Connection scoping and device resolution shared by all device commands.

use crate::api::entities::DeviceInfo;
use crate::api::{MyJd, RemoteClient};
use crate::config::{ConfigStore, Credentials};
use crate::error::JdError::{Connection, NoDevice};
use anyhow::Result;
use futures::FutureExt;
use log::{debug, warn};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// Builds remote client handles from stored credentials
pub trait Connector {
    type Client: RemoteClient;

    /// Creates an unconnected client
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be configured
    fn client(&self, credentials: &Credentials, debug: bool) -> Result<Self::Client>;
}

/// Production connector for the public My.JDownloader service
#[derive(Debug, Default, Clone, Copy)]
pub struct MyJdConnector;

impl Connector for MyJdConnector {
    type Client = MyJd;

    fn client(&self, credentials: &Credentials, debug: bool) -> Result<MyJd> {
        MyJd::builder()
            .email(&credentials.mail)
            .password(&credentials.password)
            .debug(debug)
            .build()
    }
}

/// Everything a command needs to reach a device
pub struct Session<C> {
    store: ConfigStore,
    connector: C,
    debug: bool,
}

impl<C: Connector> Session<C> {
    #[must_use]
    pub fn new(store: ConfigStore, connector: C, debug: bool) -> Self {
        Self {
            store,
            connector,
            debug,
        }
    }

    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Connects, resolves the target device and runs `action` against it
    ///
    /// The device is `device_name`, else the stored preferred device, else the
    /// first device of the account. The connection is closed on every exit path;
    /// a failing disconnect is only logged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Credentials cannot be loaded
    /// - Connecting fails
    /// - No device is available or the named device doesn't exist
    /// - `action` fails, in which case its error is returned unchanged
    pub async fn with_device<F, Fut, T>(&self, device_name: Option<&str>, action: F) -> Result<T>
    where
        F: FnOnce(<C::Client as RemoteClient>::Device) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let credentials = self.store.load()?;
        let device_name = device_name
            .map(ToString::to_string)
            .or_else(|| credentials.device.clone());

        let mut client = self.connect(&credentials).await?;

        let outcome = AssertUnwindSafe(async {
            let name = match device_name {
                Some(name) => name,
                None => pick_device(&client).await?,
            };
            let device = client.device(&name).await?;
            action(device).await
        })
        .catch_unwind()
        .await;

        close(&mut client).await;

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Lists the devices registered with the account
    ///
    /// # Errors
    ///
    /// Returns an error if credentials cannot be loaded, connecting fails or the listing fails
    pub async fn devices(&self) -> Result<Vec<DeviceInfo>> {
        let credentials = self.store.load()?;
        let mut client = self.connect(&credentials).await?;
        let devices = client.list_devices().await;
        close(&mut client).await;
        devices
    }

    /// Builds a client for `credentials` and opens its session
    ///
    /// # Errors
    ///
    /// Returns [`Connection`] if the session cannot be opened
    pub async fn connect(&self, credentials: &Credentials) -> Result<C::Client> {
        let mut client = self.connector.client(credentials, self.debug)?;
        client
            .connect()
            .await
            .map_err(|e| Connection(format!("{e:#}")))?;
        Ok(client)
    }
}

/// Returns the name of the first device registered with the account
///
/// # Errors
///
/// Returns [`NoDevice`] if the account has no devices, or the listing error
pub async fn pick_device<R: RemoteClient>(client: &R) -> Result<String> {
    let devices = client.list_devices().await?;
    let first = devices.into_iter().next().ok_or(NoDevice)?;
    debug!("No device specified, using {}", first.name);
    Ok(first.name)
}

/// Disconnects, downgrading failures to a warning
pub async fn close<R: RemoteClient>(client: &mut R) {
    if let Err(e) = client.disconnect().await {
        warn!("Failed to disconnect client: {e:#}");
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory [`RemoteClient`] used by session and command tests.

    use super::*;
    use crate::api::Device;
    use crate::api::entities::{
        AddLinksQuery, CollectorLink, DeviceInfo, DownloadLink, DownloadPackage,
        LinkCollectingJob,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Debug)]
    pub struct MockState {
        pub devices: Vec<DeviceInfo>,
        pub links: Vec<DownloadLink>,
        pub packages: Vec<DownloadPackage>,
        pub collector: Vec<CollectorLink>,
        pub fail_connect: bool,
        pub fail_disconnect: bool,
        /// Every remote operation, in call order
        pub calls: Vec<String>,
        pub connected: bool,
        pub removed: Vec<i64>,
        pub added: Vec<AddLinksQuery>,
    }

    #[derive(Default, Clone)]
    pub struct MockClient {
        pub state: Arc<Mutex<MockState>>,
    }

    impl MockClient {
        pub fn with_devices(names: &[&str]) -> Self {
            let client = Self::default();
            client.state.lock().unwrap().devices = names
                .iter()
                .enumerate()
                .map(|(i, name)| DeviceInfo {
                    id: format!("id{i}"),
                    device_type: String::from("jd"),
                    name: (*name).to_string(),
                    status: String::from("UNKNOWN"),
                })
                .collect();
            client
        }

        fn record(&self, call: &str) {
            self.state.lock().unwrap().calls.push(call.to_string());
        }

        pub fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }
    }

    #[async_trait]
    impl RemoteClient for MockClient {
        type Device = MockDevice;

        async fn connect(&mut self) -> Result<()> {
            self.record("connect");
            let mut state = self.state.lock().unwrap();
            if state.fail_connect {
                anyhow::bail!("AUTH_FAILED");
            }
            state.connected = true;
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<()> {
            self.record("disconnect");
            let mut state = self.state.lock().unwrap();
            state.connected = false;
            if state.fail_disconnect {
                anyhow::bail!("TOKEN_INVALID");
            }
            Ok(())
        }

        async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
            self.record("list_devices");
            Ok(self.state.lock().unwrap().devices.clone())
        }

        async fn device(&self, name: &str) -> Result<MockDevice> {
            self.record("device");
            let info = self
                .state
                .lock()
                .unwrap()
                .devices
                .iter()
                .find(|d| d.name == name)
                .cloned()
                .ok_or_else(|| crate::error::JdError::DeviceNotFound(name.to_string()))?;
            Ok(MockDevice {
                client: self.clone(),
                info,
            })
        }
    }

    pub struct MockDevice {
        client: MockClient,
        info: DeviceInfo,
    }

    #[async_trait]
    impl Device for MockDevice {
        fn info(&self) -> &DeviceInfo {
            &self.info
        }

        async fn download_links(&self) -> Result<Vec<DownloadLink>> {
            self.client.record("download_links");
            Ok(self.client.state.lock().unwrap().links.clone())
        }

        async fn download_packages(&self) -> Result<Vec<DownloadPackage>> {
            self.client.record("download_packages");
            Ok(self.client.state.lock().unwrap().packages.clone())
        }

        async fn remove_downloads(&self, link_ids: &[i64], _package_ids: &[i64]) -> Result<()> {
            self.client.record("remove_downloads");
            let mut state = self.client.state.lock().unwrap();
            state.removed.extend_from_slice(link_ids);
            state.links.retain(|link| !link_ids.contains(&link.uuid));
            Ok(())
        }

        async fn pause_downloads(&self, _pause: bool) -> Result<bool> {
            self.client.record("pause_downloads");
            Ok(true)
        }

        async fn stop_downloads(&self) -> Result<bool> {
            self.client.record("stop_downloads");
            Ok(true)
        }

        async fn start_downloads(&self) -> Result<bool> {
            self.client.record("start_downloads");
            Ok(true)
        }

        async fn download_state(&self) -> Result<String> {
            self.client.record("download_state");
            Ok(String::from("RUNNING"))
        }

        async fn download_speed(&self) -> Result<Option<f64>> {
            self.client.record("download_speed");
            Ok(Some(10000.0))
        }

        async fn add_links(&self, query: &AddLinksQuery) -> Result<LinkCollectingJob> {
            self.client.record("add_links");
            self.client.state.lock().unwrap().added.push(query.clone());
            Ok(LinkCollectingJob { id: 42 })
        }

        async fn collector_links(&self) -> Result<Vec<CollectorLink>> {
            self.client.record("collector_links");
            Ok(self.client.state.lock().unwrap().collector.clone())
        }
    }

    /// Hands out clones sharing the same state
    pub struct MockConnector(pub MockClient);

    impl Connector for MockConnector {
        type Client = MockClient;

        fn client(&self, _credentials: &Credentials, _debug: bool) -> Result<MockClient> {
            Ok(self.0.clone())
        }
    }

    /// Session over a temporary config file holding valid credentials
    pub fn session(
        client: &MockClient,
        device: Option<&str>,
    ) -> (tempfile::TempDir, Session<MockConnector>) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("jdconfig.yaml"));
        store
            .save(&Credentials {
                mail: String::from("bob@example.com"),
                password: String::from("secret"),
                device: device.map(ToString::to_string),
            })
            .unwrap();
        (dir, Session::new(store, MockConnector(client.clone()), false))
    }
}
