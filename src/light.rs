//! Individual light descriptions.

use serde::{Deserialize, Serialize};

use crate::status::LightStatus;
use crate::types::LightId;

/// A light known to the bridge.
///
/// A `Light` is a snapshot of what the bridge reported at the time it was
/// queried; it is refreshed by asking the bridge again, never mutated locally.
///
/// ```
/// use lively_lights::{Light, LightId};
///
/// let light = Light::new(LightId::create(1).unwrap(), Some("Kitchen"), true);
/// assert_eq!(light.light_id().value(), 1);
/// assert!(light.reachable());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Light {
    light_id: LightId,
    name: Option<String>,
    status: LightStatus,
}

/// A light as described in the body of `GET /lights/<id>`; the id is only
/// part of the URL.
#[derive(Debug, Deserialize)]
pub(crate) struct LightRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: LightStatus,
}

impl Light {
    pub fn new(light_id: LightId, name: Option<&str>, reachable: bool) -> Self {
        Light {
            light_id,
            name: name.map(String::from),
            status: LightStatus::with_reachable(reachable),
        }
    }

    pub(crate) fn from_record(light_id: LightId, record: LightRecord) -> Self {
        Light {
            light_id,
            name: record.name,
            status: record.state,
        }
    }

    pub fn light_id(&self) -> LightId {
        self.light_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn status(&self) -> &LightStatus {
        &self.status
    }

    pub fn reachable(&self) -> bool {
        self.status.reachable()
    }
}
