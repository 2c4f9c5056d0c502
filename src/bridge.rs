//! Communication with the lighting bridge.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::Value;

use crate::errors::Error;
use crate::history::{RequestHistory, RequestMethod};
use crate::light::{Light, LightRecord};
use crate::payload::LightState;
use crate::runtime::BoxFuture;
use crate::types::LightId;

type Result<T> = std::result::Result<T, Error>;

/// The operations the scene engine needs from a bridge.
///
/// Implementations are shared between concurrently running scene workers.
pub trait Bridge: Send + Sync {
    /// Apply a state to one light. Delivery to the physical light is not
    /// confirmed by the bridge.
    fn send_light_state<'a>(
        &'a self,
        light_id: LightId,
        state: &'a LightState,
    ) -> BoxFuture<'a, Result<()>>;

    /// Query the current description of one light.
    fn query_light(&self, light_id: LightId) -> BoxFuture<'_, Result<Light>>;

    /// All lights known to the bridge, ordered by id.
    fn list_lights(&self) -> BoxFuture<'_, Result<Vec<Light>>>;
}

/// REST client for a Hue bridge.
///
/// ```
/// use lively_lights::HueBridge;
///
/// let bridge = HueBridge::new("192.168.1.2", "username").unwrap();
/// assert_eq!(bridge.base_url(), "http://192.168.1.2");
/// ```
#[derive(Debug, Clone)]
pub struct HueBridge {
    base_url: String,
    username: String,
    client: Client,
    history: Arc<Mutex<RequestHistory>>,
}

impl HueBridge {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// `address` is a host (`192.168.1.2`) or a base URL (`http://host:port`).
    pub fn new(address: &str, username: &str) -> Result<Self> {
        Self::with_timeout(address, username, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(address: &str, username: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http("build client", e))?;

        let address = address.trim_end_matches('/');
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        Ok(HueBridge {
            base_url,
            username: username.to_string(),
            client,
            history: Arc::new(Mutex::new(RequestHistory::new())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn history(&self) -> RequestHistory {
        self.history.lock().clone()
    }

    fn address(&self, resource: &str) -> String {
        format!("/api/{}{}", self.username, resource)
    }

    async fn get(&self, resource: &str) -> Result<Value> {
        let address = self.address(resource);
        self.history
            .lock()
            .record(RequestMethod::Get, &address, None);
        debug!("GET {resource}");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, address))
            .send()
            .await
            .and_then(|response| response.error_for_status());
        self.read_reply(resource, response).await
    }

    async fn put(&self, resource: &str, body: &Value) -> Result<Value> {
        let address = self.address(resource);
        self.history
            .lock()
            .record(RequestMethod::Put, &address, Some(body));
        debug!("PUT {resource} {body}");

        let response = self
            .client
            .put(format!("{}{}", self.base_url, address))
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status());
        self.read_reply(resource, response).await
    }

    async fn read_reply(
        &self,
        resource: &str,
        response: reqwest::Result<reqwest::Response>,
    ) -> Result<Value> {
        let result = match response {
            Ok(response) => response
                .json::<Value>()
                .await
                .map_err(|e| Error::http("decode", e))
                .and_then(check_reply),
            Err(e) => Err(Error::http("request", e)),
        };

        match &result {
            Ok(value) => debug!("response from {resource}: {value}"),
            Err(e) => self.history.lock().record_error(&e.to_string()),
        }
        result
    }
}

impl Bridge for HueBridge {
    fn send_light_state<'a>(
        &'a self,
        light_id: LightId,
        state: &'a LightState,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if !state.is_valid() {
                return Err(Error::NoAttribute);
            }
            let body = serde_json::to_value(state).map_err(Error::JsonDump)?;
            self.put(&format!("/lights/{light_id}/state"), &body)
                .await
                .map(|_| ())
        })
    }

    fn query_light(&self, light_id: LightId) -> BoxFuture<'_, Result<Light>> {
        Box::pin(async move {
            let reply = self.get(&format!("/lights/{light_id}")).await?;
            let record: LightRecord = serde_json::from_value(reply).map_err(Error::JsonLoad)?;
            Ok(Light::from_record(light_id, record))
        })
    }

    fn list_lights(&self) -> BoxFuture<'_, Result<Vec<Light>>> {
        Box::pin(async move {
            let reply = self.get("/lights").await?;
            let records: HashMap<String, LightRecord> =
                serde_json::from_value(reply).map_err(Error::JsonLoad)?;

            let mut lights = Vec::with_capacity(records.len());
            for (key, record) in records {
                match key.parse::<LightId>() {
                    Ok(light_id) => lights.push(Light::from_record(light_id, record)),
                    Err(_) => debug!("ignoring light with unexpected id {key:?}"),
                }
            }
            lights.sort_by_key(Light::light_id);
            Ok(lights)
        })
    }
}

/// The bridge reports failures as `[{"error": {"address": .., "description": ..}}]`
/// with a successful HTTP status.
fn check_reply(reply: Value) -> Result<Value> {
    let error = reply
        .as_array()
        .and_then(|items| items.iter().find_map(|item| item.get("error")))
        .map(|error| {
            let field = |name: &str| {
                error
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Error::Bridge {
                address: field("address"),
                description: field("description"),
            }
        });

    match error {
        Some(error) => Err(error),
        None => Ok(reply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_reply_success() {
        let reply = json!([{"success": {"/lights/1/state/on": true}}]);
        assert_eq!(check_reply(reply.clone()).unwrap(), reply);
    }

    #[test]
    fn test_check_reply_error() {
        let reply = json!([{"error": {
            "type": 3,
            "address": "/lights/9",
            "description": "resource, /lights/9, not available"
        }}]);
        let err = check_reply(reply).unwrap_err();
        assert_eq!(
            err,
            Error::Bridge {
                address: "/lights/9".to_string(),
                description: "resource, /lights/9, not available".to_string(),
            }
        );
        assert!(err.is_transient());
    }

    #[test]
    fn test_base_url() {
        let bridge = HueBridge::new("http://127.0.0.1:8080/", "user").unwrap();
        assert_eq!(bridge.base_url(), "http://127.0.0.1:8080");
        assert_eq!(bridge.address("/lights"), "/api/user/lights");
    }
}
