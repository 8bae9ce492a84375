use std::path::{Path, PathBuf};
use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo};
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_KEY_ROOT: &str = "redishop";

/// 连接凭据，字段与 node_redis 的连接对象保持一致（JSON），也接受 TOML
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// 给了 url 就忽略其余字段
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    #[serde(alias = "auth_pass")]
    pub password: Option<String>,
    pub db: Option<i64>,
}

impl Credentials {
    /// `.json` 走 serde_json，其余按 TOML
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read(path)?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.display().to_string(),
                source,
            })
        } else {
            toml::from_str(&text).map_err(|source| ConfigError::Toml {
                path: path.display().to_string(),
                source,
            })
        }
    }

    pub fn connection_info(&self) -> Result<ConnectionInfo, ConfigError> {
        if let Some(url) = &self.url {
            return Ok(url.as_str().into_connection_info()?);
        }
        Ok(ConnectionInfo {
            addr: ConnectionAddr::Tcp(
                self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string()),
                self.port.unwrap_or(6379),
            ),
            redis: RedisConnectionInfo {
                db: self.db.unwrap_or(0),
                username: self.username.clone(),
                password: self.password.clone(),
                ..Default::default()
            },
        })
    }
}

/// key 空间与查询参数（可选 TOML 文件，CLI 覆盖）
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub key_root: Option<String>,
    pub index_key: Option<String>,
    pub temp_prefix: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read(path)?;
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }

    /// `~/.config/redishop-range/config.toml`，不存在则 None
    pub fn default_path() -> Option<PathBuf> {
        let p = dirs::config_dir()?.join("redishop-range").join("config.toml");
        p.exists().then_some(p)
    }

    pub fn key_root(&self) -> &str {
        self.key_root.as_deref().unwrap_or(DEFAULT_KEY_ROOT)
    }

    pub fn index_key(&self) -> String {
        self.index_key
            .clone()
            .unwrap_or_else(|| format!("{}:priceIndex", self.key_root()))
    }

    /// item hash 前缀：`<root>:items`，模式为 `<root>:items:*`
    pub fn namespace(&self) -> String {
        format!("{}:items", self.key_root())
    }

    pub fn temp_prefix(&self) -> String {
        self.temp_prefix
            .clone()
            .unwrap_or_else(|| format!("{}:tmp:between", self.key_root()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}
