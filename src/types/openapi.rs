use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const OPENAPI_VERSION: &str = "3.1.0";

/// 生成的 OpenAPI 3.1 文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSpecDocument {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: Map<String, Value>,
    pub components: Components,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: Map<String, Value>,
}

impl ApiSpecDocument {
    /// 某路径下的 POST operation
    pub fn operation(&self, path: &str) -> Option<&Value> {
        self.paths.get(path).and_then(|item| item.get("post"))
    }

    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.components.schemas.get(name)
    }
}
