//! OpenAPI 3.1 文档生成
//!
//! 每次 `serialize` 都在调用内部新建一个 `SpecBuilder`，返回自有的文档值；
//! `SpecSerializer` 本身只持有构造时的配置，可在多个请求间共享。

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{ActionError, Result};
use crate::provider::{FunctionProvider, DEFAULT_IDENTIFIER};
use crate::types::{ApiSpecDocument, Components, FunctionDefinition, Info, Server, OPENAPI_VERSION};

pub const RESPONSE_SCHEMA: &str = "Response";

#[derive(Debug, Clone)]
pub struct SpecSerializer {
    title: String,
    version: String,
    server_url: String,
    identifier: String,
}

impl Default for SpecSerializer {
    fn default() -> Self {
        SpecSerializer::new("Action API", "1.0.0", "https://api.example.com", None)
    }
}

impl SpecSerializer {
    pub fn new(
        title: impl Into<String>,
        version: impl Into<String>,
        server_url: impl Into<String>,
        identifier: Option<String>,
    ) -> Self {
        SpecSerializer {
            title: title.into(),
            version: version.into(),
            server_url: server_url.into(),
            identifier: identifier.unwrap_or_else(|| DEFAULT_IDENTIFIER.to_string()),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 使用构造时配置的 identifier 生成文档
    pub fn serialize(&self, provider: &dyn FunctionProvider) -> Result<ApiSpecDocument> {
        self.serialize_for(&self.identifier, provider)
    }

    /// 使用显式 identifier 生成文档
    pub fn serialize_for(
        &self,
        identifier: &str,
        provider: &dyn FunctionProvider,
    ) -> Result<ApiSpecDocument> {
        let definitions = provider.list_definitions();
        debug!(
            identifier,
            functions = definitions.len(),
            "building action spec document"
        );

        let mut builder = SpecBuilder::new(identifier);
        for definition in &definitions {
            builder.add_function(definition)?;
        }

        let info = Info {
            title: self.title.clone(),
            version: self.version.clone(),
        };
        let server = Server {
            url: self.server_url.clone(),
        };
        Ok(builder.finish(info, server))
    }

    /// 文档的格式化 JSON 字符串
    pub fn to_json(&self, provider: &dyn FunctionProvider) -> Result<String> {
        let document = self.serialize(provider)?;
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

/// 单次生成过程的工作区
struct SpecBuilder<'a> {
    identifier: &'a str,
    paths: Map<String, Value>,
    schemas: Map<String, Value>,
}

impl<'a> SpecBuilder<'a> {
    fn new(identifier: &'a str) -> Self {
        SpecBuilder {
            identifier,
            paths: Map::new(),
            schemas: Map::new(),
        }
    }

    fn add_function(&mut self, definition: &FunctionDefinition) -> Result<()> {
        let function_name = definition.name.as_str();
        if function_name.is_empty() {
            return Err(ActionError::malformed(function_name, "function name is empty"));
        }
        if function_name.contains('/') {
            return Err(ActionError::malformed(
                function_name,
                "function name must not contain '/'",
            ));
        }

        let path = format!("/actions/{}/{}", self.identifier, function_name);
        if self.paths.contains_key(&path) {
            return Err(ActionError::malformed(
                function_name,
                "function name is not unique within the provider",
            ));
        }

        let schema_name = definition.parameters.as_ref().map(|parameters| {
            let schema_name = format!("{}Request", function_name);
            self.schemas.insert(schema_name.clone(), parameters.clone());
            schema_name
        });

        let mut operation = json!({
            "summary": definition.description,
            "operationId": function_name,
            "x-openai-isConsequential": false,
            "responses": {
                "200": {
                    "description": "Successful response",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": schema_ref(RESPONSE_SCHEMA) }
                        }
                    }
                }
            }
        });

        if let Some(schema_name) = schema_name {
            operation["requestBody"] = json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": schema_ref(&schema_name) }
                    }
                }
            });
        }

        self.paths.insert(path, json!({ "post": operation }));
        Ok(())
    }

    fn finish(mut self, info: Info, server: Server) -> ApiSpecDocument {
        self.schemas
            .insert(RESPONSE_SCHEMA.to_string(), response_schema());

        ApiSpecDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            servers: vec![server],
            paths: self.paths,
            components: Components {
                schemas: self.schemas,
            },
        }
    }
}

fn schema_ref(name: &str) -> String {
    format!("#/components/schemas/{}", name)
}

/// 所有 action 共用的响应信封 schema
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "isError": {
                "type": "boolean",
                "default": false,
                "description": "Indicates if the response represents an error"
            },
            "content": {
                "oneOf": [
                    { "type": "string" },
                    {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                ],
                "description": "Response content, can be a string or an array of strings"
            }
        },
        "required": ["isError", "content"]
    })
}
