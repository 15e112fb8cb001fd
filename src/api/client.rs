use crate::api::crypto::{self, DEVICE_DOMAIN, SERVER_DOMAIN, Secret};
use crate::api::entities::{
    Acknowledged, AddLinksQuery, CollectorLink, ConnectData, DeviceInfo, DeviceList,
    DeviceRequest, DeviceResponse, DownloadLink, DownloadPackage, ErrorResponse,
    LinkCollectingJob, ServerResponse,
};
use crate::api::{Device, RemoteClient};
use crate::error::JdError::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use url::form_urlencoded;

/// Public My.JDownloader endpoint
pub const DEFAULT_API_URL: &str = "https://api.jdownloader.org";
/// Application key reported to the server
pub const DEFAULT_APP_KEY: &str = "jdcli";
/// Request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const API_VERSION: u8 = 1;
const AES_JSON: &str = "application/aesjson-jd; charset=utf-8";

/// Tokens of an open session
#[derive(Debug)]
struct SessionTokens {
    session_token: String,
    regain_token: String,
    server_token: Secret,
    device_token: Secret,
}

/// My.JDownloader client
pub struct MyJd {
    api_url: String,
    email: String,
    app_key: String,
    login_secret: Secret,
    device_secret: Secret,
    client: Client,
    rid: Arc<AtomicI64>,
    session: Option<Arc<SessionTokens>>,
    debug: bool,
}

impl MyJd {
    /// Creates a new `MyJd` client for the given account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email or password is empty
    /// - API URL doesn't start with "http://" or "https://"
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(
        api_url: String,
        email: String,
        password: String,
        app_key: String,
        timeout_ms: u64,
    ) -> Result<Self> {
        if email.is_empty() {
            return Err(Config("Email cannot be empty".into()).into());
        }

        if password.is_empty() {
            return Err(Config("Password cannot be empty".into()).into());
        }

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(Config(format!(
                "API URL must start with http:// or https://, got: {api_url}"
            ))
            .into());
        }

        let api_url = api_url.trim_end_matches('/').to_string();

        Ok(Self {
            login_secret: crypto::secret(&email, &password, SERVER_DOMAIN),
            device_secret: crypto::secret(&email, &password, DEVICE_DOMAIN),
            api_url,
            email,
            app_key,
            client: Self::create_client(timeout_ms),
            rid: Arc::new(AtomicI64::new(chrono::Utc::now().timestamp_millis())),
            session: None,
            debug: false,
        })
    }

    /// Creates a configured HTTP client
    fn create_client(timeout: u64) -> Client {
        Client::builder()
            .timeout(Duration::from_millis(timeout))
            .build()
            .unwrap_or_default()
    }

    /// Creates a new `MyJd` client with a builder pattern
    #[must_use]
    pub fn builder() -> MyJdBuilder {
        MyJdBuilder::default()
    }

    /// Returns true once [`RemoteClient::connect`] succeeded and until disconnect
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Arc<SessionTokens>> {
        self.session.as_ref().ok_or_else(|| {
            Connection("No session available. Make sure to call connect() first".into()).into()
        })
    }

    /// Makes a signed server call and decrypts the response with the same key
    async fn server_call<R>(&self, query: &str, key: &Secret) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let rid = next_rid(&self.rid);
        let query = format!("{query}&rid={rid}");
        let signature = crypto::sign(key, &query)?;
        let url = format!("{}{}&signature={}", self.api_url, query, signature);

        let path = query.split('?').next().unwrap_or_default();
        debug!("Making server call to: {path}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to make server call")?;

        let plain = read_response(response, key, self.debug).await?;
        let response: ServerResponse<R> = serde_json::from_str(&plain)
            .map_err(|e| InvalidResponse(format!("unexpected response from {path}: {e}")))?;
        check_rid(rid, response.rid)?;
        Ok(response.data)
    }
}

#[async_trait]
impl RemoteClient for MyJd {
    type Device = MyJdDevice;

    /// Authenticates and derives the session encryption tokens
    async fn connect(&mut self) -> Result<()> {
        let query = format!(
            "/my/connect?email={}&appkey={}",
            encode(&self.email),
            encode(&self.app_key)
        );

        let data: ConnectData = self
            .server_call(&query, &self.login_secret)
            .await
            .context("Failed to connect")?;

        let tokens = SessionTokens {
            server_token: crypto::update_token(&self.login_secret, &data.sessiontoken)?,
            device_token: crypto::update_token(&self.device_secret, &data.sessiontoken)?,
            session_token: data.sessiontoken,
            regain_token: data.regaintoken,
        };
        debug!("Connected, regain token available: {}", !tokens.regain_token.is_empty());
        self.session = Some(Arc::new(tokens));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        let query = format!("/my/disconnect?sessiontoken={}", session.session_token);
        let _: Acknowledged = self
            .server_call(&query, &session.server_token)
            .await
            .context("Failed to disconnect")?;
        debug!("Disconnected");
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let session = self.session()?;
        let query = format!("/my/listdevices?sessiontoken={}", session.session_token);

        let devices: DeviceList = self
            .server_call(&query, &session.server_token)
            .await
            .context("Failed to list devices")?;
        Ok(devices.list)
    }

    async fn device(&self, name: &str) -> Result<MyJdDevice> {
        let session = Arc::clone(self.session()?);
        let info = self
            .list_devices()
            .await?
            .into_iter()
            .find(|device| device.name == name)
            .ok_or_else(|| DeviceNotFound(name.to_string()))?;

        debug!("Using device {} ({})", info.name, info.id);
        Ok(MyJdDevice {
            api_url: self.api_url.clone(),
            client: self.client.clone(),
            rid: Arc::clone(&self.rid),
            session,
            info,
            debug: self.debug,
        })
    }
}

/// Handle for a device reachable through an open [`MyJd`] session
pub struct MyJdDevice {
    api_url: String,
    client: Client,
    rid: Arc<AtomicI64>,
    session: Arc<SessionTokens>,
    info: DeviceInfo,
    debug: bool,
}

impl MyJdDevice {
    /// Makes an encrypted device call
    async fn action<D>(&self, action: &str, params: &[Value]) -> Result<Option<D>>
    where
        D: DeserializeOwned,
    {
        let rid = next_rid(&self.rid);
        let request = DeviceRequest {
            url: action,
            params: params.iter().map(Value::to_string).collect(),
            rid,
            api_ver: API_VERSION,
        };
        let body = crypto::encrypt(&self.session.device_token, &serde_json::to_string(&request)?)?;

        let url = format!(
            "{}/t_{}_{}{}",
            self.api_url,
            self.session.session_token,
            encode(&self.info.id),
            action
        );
        debug!("Calling {action} on device {}", self.info.name);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, AES_JSON)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to call {action}"))?;

        let plain = read_response(response, &self.session.device_token, self.debug).await?;
        let response: DeviceResponse<D> = serde_json::from_str(&plain)
            .map_err(|e| InvalidResponse(format!("unexpected response from {action}: {e}")))?;
        check_rid(rid, response.rid)?;
        Ok(response.data)
    }

    async fn action_bool(&self, action: &str, params: &[Value]) -> Result<bool> {
        Ok(self.action::<bool>(action, params).await?.unwrap_or_default())
    }
}

#[async_trait]
impl Device for MyJdDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    async fn download_links(&self) -> Result<Vec<DownloadLink>> {
        let query = json!({
            "bytesTotal": true,
            "bytesLoaded": true,
            "eta": true,
            "speed": true,
            "status": true,
            "url": true,
            "finished": true,
            "running": true,
            "enabled": true,
        });
        let links = self
            .action("/downloadsV2/queryLinks", &[query])
            .await
            .context("Failed to query download links")?;
        Ok(links.unwrap_or_default())
    }

    async fn download_packages(&self) -> Result<Vec<DownloadPackage>> {
        let query = json!({
            "bytesTotal": true,
            "bytesLoaded": true,
            "eta": true,
            "speed": true,
            "status": true,
            "saveTo": true,
            "childCount": true,
            "finished": true,
            "running": true,
            "enabled": true,
        });
        let packages = self
            .action("/downloadsV2/queryPackages", &[query])
            .await
            .context("Failed to query download packages")?;
        Ok(packages.unwrap_or_default())
    }

    async fn remove_downloads(&self, link_ids: &[i64], package_ids: &[i64]) -> Result<()> {
        debug!("Removing {} links and {} packages", link_ids.len(), package_ids.len());
        self.action::<IgnoredAny>(
            "/downloadsV2/removeLinks",
            &[json!(link_ids), json!(package_ids)],
        )
        .await
        .context("Failed to remove downloads")?;
        Ok(())
    }

    async fn pause_downloads(&self, pause: bool) -> Result<bool> {
        self.action_bool("/downloadcontroller/pause", &[json!(pause)])
            .await
            .context("Failed to pause downloads")
    }

    async fn stop_downloads(&self) -> Result<bool> {
        self.action_bool("/downloadcontroller/stop", &[])
            .await
            .context("Failed to stop downloads")
    }

    async fn start_downloads(&self) -> Result<bool> {
        self.action_bool("/downloadcontroller/start", &[])
            .await
            .context("Failed to start downloads")
    }

    async fn download_state(&self) -> Result<String> {
        self.action::<String>("/downloadcontroller/getCurrentState", &[])
            .await
            .context("Failed to get download state")?
            .ok_or_else(|| InvalidResponse("No state received".into()).into())
    }

    async fn download_speed(&self) -> Result<Option<f64>> {
        self.action("/downloadcontroller/getSpeedInBps", &[])
            .await
            .context("Failed to get download speed")
    }

    async fn add_links(&self, query: &AddLinksQuery) -> Result<LinkCollectingJob> {
        debug!("Adding links, autostart: {}", query.autostart);
        self.action("/linkgrabberv2/addLinks", &[serde_json::to_value(query)?])
            .await
            .context("Failed to add links")?
            .ok_or_else(|| InvalidResponse("No job received".into()).into())
    }

    async fn collector_links(&self) -> Result<Vec<CollectorLink>> {
        let query = json!({
            "bytesTotal": true,
            "url": true,
            "status": true,
            "availability": true,
            "enabled": true,
        });
        let links = self
            .action("/linkgrabberv2/queryLinks", &[query])
            .await
            .context("Failed to query link collector")?;
        Ok(links.unwrap_or_default())
    }
}

fn next_rid(rid: &AtomicI64) -> i64 {
    rid.fetch_add(1, Ordering::Relaxed)
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn check_rid(expected: i64, actual: i64) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(InvalidResponse(format!("request id mismatch: sent {expected}, got {actual}")).into())
    }
}

/// Reads and decrypts a response body, mapping non-2xx statuses to [`Api`] errors
async fn read_response(response: Response, key: &Secret, log_payload: bool) -> Result<String> {
    let status = response.status();
    debug!("API request status: {status}");

    let body = response
        .text()
        .await
        .context("Failed to read API response")?;

    if !status.is_success() {
        return Err(api_error(status, &body, key));
    }

    let plain = crypto::decrypt(key, &body).context("Failed to decrypt API response")?;
    if log_payload {
        debug!("API response payload: {plain}");
    }
    Ok(plain)
}

/// Error bodies come either as plain JSON or encrypted with the request key
fn api_error(status: StatusCode, body: &str, key: &Secret) -> anyhow::Error {
    let error = serde_json::from_str::<ErrorResponse>(body).ok().or_else(|| {
        crypto::decrypt(key, body)
            .ok()
            .and_then(|plain| serde_json::from_str::<ErrorResponse>(&plain).ok())
    });

    match error {
        Some(error) => Api {
            source_name: error.src,
            kind: error.kind,
        }
        .into(),
        None => Api {
            source_name: String::from("HTTP"),
            kind: format!(
                "{} ({})",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        }
        .into(),
    }
}

/// Builder for [`MyJd`] client
#[derive(Default)]
pub struct MyJdBuilder {
    api_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    app_key: Option<String>,
    timeout: Option<u64>,
    debug: bool,
}

impl MyJdBuilder {
    /// Sets the API base URL
    #[must_use]
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Sets the account email
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the account password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the application key
    #[must_use]
    pub fn app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = Some(app_key.into());
        self
    }

    /// Sets the request timeout in milliseconds
    #[must_use]
    pub fn timeout(mut self, timeout_millis: u64) -> Self {
        self.timeout = Some(timeout_millis);
        self
    }

    /// Logs decrypted payloads at debug level
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds the [`MyJd`] client
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email or password is not provided or empty
    /// - API URL doesn't start with "http://" or "https://"
    pub fn build(self) -> Result<MyJd> {
        let email = self
            .email
            .ok_or_else(|| Config("Email is required".into()))?;
        let password = self
            .password
            .ok_or_else(|| Config("Password is required".into()))?;

        let api_url = self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let app_key = self.app_key.unwrap_or_else(|| DEFAULT_APP_KEY.to_string());
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);

        let mut client = MyJd::new(api_url, email, password, app_key, timeout)?;
        client.debug = self.debug;

        Ok(client)
    }
}
