//! Operate topics and the `Create` envelope.

use std::collections::BTreeMap;
use std::fmt;

use opsync_core::category::Category;
use opsync_core::h5::H5Properties;
use opsync_core::material::Material;
use opsync_core::plan::Plan;
use opsync_core::position::MaterialPosition;
use opsync_core::scope::ScopeEnv;
use serde::{Deserialize, Serialize};

use crate::api::{ApiCategory, ApiH5PropertiesWithName, ApiMaterial, ApiMaterialPosition, ApiPlan};
use crate::PublishError;

pub const MATERIALS_SERVICE: &str = "operational-materials-svc";
pub const H5_SERVICE: &str = "operational-h5-svc";

pub const OPERATE_CREATE: &str = "Create";

pub const HEADER_SCOPE: &str = "scope";
pub const HEADER_ENV: &str = "env";
pub const HEADER_TRACK_ID: &str = "trackId";

/// Appended to the document id to form the trace id of migration events.
pub const TRACE_SUFFIX: &str = "sync_by_cli";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Material,
    Category,
    Position,
    Plan,
    H5Properties,
}

impl Entity {
    pub fn service(self) -> &'static str {
        match self {
            Self::H5Properties => H5_SERVICE,
            _ => MATERIALS_SERVICE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Category => "category",
            Self::Position => "position",
            Self::Plan => "plan",
            Self::H5Properties => "properties",
        }
    }

    /// `{service}.{entity}.operate`.
    pub fn topic(self) -> String {
        format!("{}.{}.operate", self.service(), self.as_str())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of every operate message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperateEvent<T> {
    pub data: Vec<T>,
    pub operate_type: &'static str,
    pub operated_at: i64,
}

impl<T> OperateEvent<T> {
    pub fn create(item: T) -> Self {
        Self {
            data: vec![item],
            operate_type: OPERATE_CREATE,
            operated_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// A message ready for a producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub topic: String,
    pub key: String,
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded [`OperateEvent`].
    pub payload: String,
}

impl OutboundMessage {
    pub fn track_id(&self) -> Option<&str> {
        self.headers.get(HEADER_TRACK_ID).map(String::as_str)
    }
}

/// A document that is announced on an operate topic.
pub trait Publishable {
    type Wire: Serialize;
    const ENTITY: Entity;

    /// Message key, the document id as hex.
    fn key(&self) -> String;

    fn to_wire(&self) -> Self::Wire;

    /// Encode as a `Create` message with scope, env and trace headers.
    fn to_message(&self, scope_env: &ScopeEnv) -> Result<OutboundMessage, PublishError> {
        let key = self.key();
        let payload = serde_json::to_string(&OperateEvent::create(self.to_wire()))?;
        let headers = BTreeMap::from([
            (HEADER_SCOPE.to_string(), scope_env.scope.clone()),
            (HEADER_ENV.to_string(), scope_env.env.clone()),
            (HEADER_TRACK_ID.to_string(), format!("{key}{TRACE_SUFFIX}")),
        ]);
        Ok(OutboundMessage {
            topic: Self::ENTITY.topic(),
            key,
            headers,
            payload,
        })
    }
}

impl Publishable for Material {
    type Wire = ApiMaterial;
    const ENTITY: Entity = Entity::Material;

    fn key(&self) -> String {
        self.id.to_hex()
    }

    fn to_wire(&self) -> ApiMaterial {
        ApiMaterial::from(self)
    }
}

impl Publishable for Category {
    type Wire = ApiCategory;
    const ENTITY: Entity = Entity::Category;

    fn key(&self) -> String {
        self.id.to_hex()
    }

    fn to_wire(&self) -> ApiCategory {
        ApiCategory::from(self)
    }
}

impl Publishable for MaterialPosition {
    type Wire = ApiMaterialPosition;
    const ENTITY: Entity = Entity::Position;

    fn key(&self) -> String {
        self.id.to_hex()
    }

    fn to_wire(&self) -> ApiMaterialPosition {
        ApiMaterialPosition::from(self)
    }
}

impl Publishable for Plan {
    type Wire = ApiPlan;
    const ENTITY: Entity = Entity::Plan;

    fn key(&self) -> String {
        self.id.to_hex()
    }

    fn to_wire(&self) -> ApiPlan {
        ApiPlan::from(self)
    }
}

/// h5 properties announced with the name of their activity.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedH5Properties {
    pub properties: H5Properties,
    pub activity_name: String,
}

impl Publishable for NamedH5Properties {
    type Wire = ApiH5PropertiesWithName;
    const ENTITY: Entity = Entity::H5Properties;

    fn key(&self) -> String {
        self.properties.id.to_hex()
    }

    fn to_wire(&self) -> ApiH5PropertiesWithName {
        ApiH5PropertiesWithName::new(&self.properties, &self.activity_name)
    }
}
