use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::provider::DEFAULT_IDENTIFIER;
use crate::serializer::SpecSerializer;

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: std::env::var("ACTION_GATEWAY_BIND")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}

/// OpenAPI 文档配置，构造时固定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecConfig {
    pub title: String,
    pub version: String,
    pub server_url: String,
    pub identifier: String,
}

impl Default for SpecConfig {
    fn default() -> Self {
        SpecConfig {
            title: "Action API".to_string(),
            version: "1.0.0".to_string(),
            server_url: std::env::var("ACTION_GATEWAY_SERVER_URL")
                .unwrap_or_else(|_| "https://api.example.com".to_string()),
            identifier: DEFAULT_IDENTIFIER.to_string(),
        }
    }
}

impl SpecConfig {
    pub fn serializer(&self) -> SpecSerializer {
        SpecSerializer::new(
            self.title.clone(),
            self.version.clone(),
            self.server_url.clone(),
            Some(self.identifier.clone()),
        )
    }
}

/// Workspace 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            root: base_dir().join("workspace"),
        }
    }
}

/// 统一配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub spec: SpecConfig,
    pub workspace: WorkspaceConfig,
}

fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".action-gateway")
}

impl Config {
    pub fn default_path() -> PathBuf {
        base_dir().join("config.toml")
    }

    /// 从文件加载配置，文件不存在时使用默认值
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path())
    }

    /// 确保 workspace 目录存在
    pub fn ensure_workspace(&self) -> Result<()> {
        fs::create_dir_all(&self.workspace.root).with_context(|| {
            format!(
                "failed to create workspace: {}",
                self.workspace.root.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.spec.identifier, "default");
        assert_eq!(config.spec.title, "Action API");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[spec]\ntitle = \"Billing\"\nidentifier = \"billing\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.spec.title, "Billing");
        assert_eq!(config.spec.identifier, "billing");
        assert_eq!(config.spec.version, "1.0.0");
        assert_eq!(config.spec.serializer().identifier(), "billing");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.server.bind_addr = "127.0.0.1:8080".to_string();
        config.workspace.root = dir.path().join("ws");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(loaded.workspace.root, dir.path().join("ws"));

        loaded.ensure_workspace().unwrap();
        assert!(dir.path().join("ws").is_dir());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[spec\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
