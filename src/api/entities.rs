use serde::{Deserialize, Serialize};

/// Response from a My.JDownloader server call, after decryption
#[derive(Deserialize, Debug)]
pub struct ServerResponse<D> {
    pub rid: i64,
    #[serde(flatten)]
    pub data: D,
}

/// Response from a device call, after decryption
#[derive(Deserialize, Debug)]
pub struct DeviceResponse<D> {
    pub rid: i64,
    pub data: Option<D>,
}

/// Body of a device call, before encryption
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRequest<'a> {
    pub url: &'a str,
    /// Each parameter is itself JSON-encoded
    pub params: Vec<String>,
    pub rid: i64,
    pub api_ver: u8,
}

/// Error object returned with non-2xx responses
#[derive(Deserialize, Debug)]
pub struct ErrorResponse {
    #[serde(default)]
    pub src: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Server response carrying nothing besides the request id
#[derive(Deserialize, Debug)]
pub struct Acknowledged {}

/// Session tokens returned by `/my/connect`
#[derive(Deserialize, Debug)]
pub struct ConnectData {
    pub sessiontoken: String,
    pub regaintoken: String,
}

/// Payload of `/my/listdevices`
#[derive(Deserialize, Debug)]
pub struct DeviceList {
    pub list: Vec<DeviceInfo>,
}

/// Device registered with the account
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Link in the download list
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub uuid: i64,
    pub name: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub bytes_total: Option<i64>,
    pub bytes_loaded: Option<i64>,
    /// Remaining time in seconds
    pub eta: Option<i64>,
    /// Bytes per second
    pub speed: Option<f64>,
    pub finished: Option<bool>,
    pub running: Option<bool>,
    pub enabled: Option<bool>,
    pub package_uuid: Option<i64>,
}

/// Package in the download list
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPackage {
    pub uuid: i64,
    pub name: Option<String>,
    pub status: Option<String>,
    pub save_to: Option<String>,
    pub bytes_total: Option<i64>,
    pub bytes_loaded: Option<i64>,
    pub eta: Option<i64>,
    pub speed: Option<f64>,
    pub child_count: Option<i32>,
    pub finished: Option<bool>,
    pub running: Option<bool>,
    pub enabled: Option<bool>,
}

/// Link staged in the link collector
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CollectorLink {
    pub uuid: i64,
    pub name: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub availability: Option<String>,
    pub bytes_total: Option<i64>,
    pub package_uuid: Option<i64>,
    pub enabled: Option<bool>,
}

/// Parameters of `linkgrabberv2/addLinks`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddLinksQuery {
    pub autostart: bool,
    /// URLs separated by newlines
    pub links: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_folder: Option<String>,
}

impl AddLinksQuery {
    #[must_use]
    pub fn new(links: &[String]) -> Self {
        Self {
            links: links.join("\n"),
            ..Default::default()
        }
    }
}

/// Job created by the link collector for added links
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCollectingJob {
    pub id: i64,
}
