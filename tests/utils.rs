use jdcli::api::crypto::{self, DEVICE_DOMAIN, SERVER_DOMAIN, Secret};
use serde_json::{Value, json};
use wiremock::{Match, Request, Respond, ResponseTemplate};

pub const EMAIL: &str = "bob@example.com";
pub const PASSWORD: &str = "test123";
pub const SESSION_TOKEN: &str = "0a1b2c3d4e5f";
pub const REGAIN_TOKEN: &str = "f5e4d3c2b1a0";
pub const DEVICE_ID: &str = "dev1";

#[must_use]
pub fn login_secret() -> Secret {
    crypto::secret(EMAIL, PASSWORD, SERVER_DOMAIN)
}

/// # Panics
///
/// Will panic if the session token is not hex
#[must_use]
pub fn server_token() -> Secret {
    crypto::update_token(&login_secret(), SESSION_TOKEN).expect("valid session token")
}

/// # Panics
///
/// Will panic if the session token is not hex
#[must_use]
pub fn device_token() -> Secret {
    let secret = crypto::secret(EMAIL, PASSWORD, DEVICE_DOMAIN);
    crypto::update_token(&secret, SESSION_TOKEN).expect("valid session token")
}

fn decrypt_json(key: &Secret, body: &[u8]) -> Option<Value> {
    let body = std::str::from_utf8(body).ok()?;
    let plain = crypto::decrypt(key, body).ok()?;
    serde_json::from_str(&plain).ok()
}

fn encrypted(key: &Secret, body: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(crypto::encrypt(key, &body.to_string()).unwrap())
}

/// Matches server calls whose `signature` is the HMAC of the rest of the query
pub struct SignatureMatcher(Secret);

/// Shorthand for [`SignatureMatcher`].
pub fn signed_with(key: Secret) -> SignatureMatcher {
    SignatureMatcher(key)
}

impl Match for SignatureMatcher {
    fn matches(&self, request: &Request) -> bool {
        let Some((unsigned, signature)) = request
            .url
            .query()
            .and_then(|query| query.rsplit_once("&signature="))
        else {
            return false;
        };
        let data = format!("{}?{}", request.url.path(), unsigned);
        crypto::sign(&self.0, &data).is_ok_and(|expected| expected == signature)
    }
}

/// Matches device calls by the encrypted action url and, optionally, its params
pub struct ActionMatcher {
    url: String,
    params: Option<Vec<Value>>,
}

/// Shorthand for an [`ActionMatcher`] ignoring params.
pub fn action(url: &str) -> ActionMatcher {
    ActionMatcher {
        url: url.to_string(),
        params: None,
    }
}

/// Shorthand for an [`ActionMatcher`] checking params.
pub fn action_with_params(url: &str, params: Vec<Value>) -> ActionMatcher {
    ActionMatcher {
        url: url.to_string(),
        params: Some(params),
    }
}

impl Match for ActionMatcher {
    fn matches(&self, request: &Request) -> bool {
        let Some(body) = decrypt_json(&device_token(), &request.body) else {
            return false;
        };
        if body["url"] != self.url.as_str() || body["apiVer"] != 1 {
            return false;
        }
        let Some(expected) = &self.params else {
            return true;
        };
        let params: Vec<Value> = body["params"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|param| param.as_str())
            .filter_map(|param| serde_json::from_str(param).ok())
            .collect();
        &params == expected
    }
}

/// Answers a server call with `body`, echoing the request id, encrypted with `key`
pub struct ServerResponder {
    key: Secret,
    body: Value,
}

impl ServerResponder {
    pub fn new(key: Secret, body: Value) -> Self {
        Self { key, body }
    }
}

impl Respond for ServerResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let rid: i64 = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "rid")
            .and_then(|(_, value)| value.parse().ok())
            .expect("request id in query");
        let mut body = self.body.clone();
        body["rid"] = json!(rid);
        encrypted(&self.key, &body)
    }
}

/// Answers a device call with `{rid, data}` encrypted with the device token
pub struct DeviceResponder {
    data: Value,
    rid_offset: i64,
}

impl DeviceResponder {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            rid_offset: 0,
        }
    }

    /// Replies with a request id that doesn't match the request
    pub fn with_wrong_rid(data: Value) -> Self {
        Self {
            data,
            rid_offset: 1,
        }
    }
}

impl Respond for DeviceResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let token = device_token();
        let rid = decrypt_json(&token, &request.body)
            .and_then(|body| body["rid"].as_i64())
            .expect("request id in body");
        encrypted(
            &token,
            &json!({ "rid": rid + self.rid_offset, "data": self.data }),
        )
    }
}
