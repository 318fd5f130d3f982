// 搜索客户端配置
//
// 配置来源：
// - 环境变量（支持 .env 文件）
// - JSON 配置文件

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use url::Url;

use super::error::ConfigError;
use crate::models::LoggedInUser;

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// 录像服务器地址
    pub server_url: String,

    /// 单次请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 已登录用户（由外部登录检查得到）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,

    #[serde(default)]
    pub viewer_is_sysop: bool,
}

fn default_timeout_secs() -> u64 {
    ClientConfig::DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: Self::DEFAULT_SERVER_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            viewer: None,
            viewer_is_sysop: false,
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_SERVER_URL: &'static str = "https://replay.pokemonshowdown.com";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// 从环境变量读取配置
    ///
    /// - `REPLAY_SERVER_URL`
    /// - `REPLAY_TIMEOUT_SECS`
    /// - `REPLAY_VIEWER`
    /// - `REPLAY_VIEWER_SYSOP`（任意非空值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值查找函数读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("REPLAY_SERVER_URL").filter(|v| !v.is_empty()) {
            config.server_url = url;
        }

        if let Some(raw) = lookup("REPLAY_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            config.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "REPLAY_TIMEOUT_SECS".to_string(),
                value: raw.clone(),
            })?;
        }

        config.viewer = lookup("REPLAY_VIEWER").filter(|v| !v.trim().is_empty());
        config.viewer_is_sysop = lookup("REPLAY_VIEWER_SYSOP").map_or(false, |v| !v.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载配置
    ///
    /// 文件不存在时使用默认配置；文件损坏时返回错误。
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("配置文件不存在，使用默认配置: {:?}", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::info!("成功加载配置: {:?}", path);
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.server_url).map_err(|_| ConfigError::InvalidUrl(self.server_url.clone()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 注入给控制器的登录身份
    pub fn logged_in_user(&self) -> Option<LoggedInUser> {
        self.viewer.as_ref().map(|userid| LoggedInUser {
            userid: userid.trim().to_string(),
            is_sysop: self.viewer_is_sysop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, ClientConfig::DEFAULT_SERVER_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.logged_in_user().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("REPLAY_SERVER_URL", "http://localhost:8080"),
            ("REPLAY_TIMEOUT_SECS", "5"),
            ("REPLAY_VIEWER", "Zarel"),
            ("REPLAY_VIEWER_SYSOP", "1"),
        ]))
        .unwrap();

        assert_eq!(config.server_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
            config.logged_in_user(),
            Some(LoggedInUser {
                userid: "Zarel".to_string(),
                is_sysop: true,
            })
        );
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = ClientConfig::from_lookup(lookup_from(&[("REPLAY_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = ClientConfig::from_lookup(lookup_from(&[("REPLAY_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = ClientConfig {
            server_url: "ftp://replay.example.com".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let config = ClientConfig {
            server_url: "replay.example.com".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ClientConfig::load(temp_dir.path().join("missing.json"))
            .await
            .unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("replay_search.json");
        tokio::fs::write(
            &path,
            r#"{"server_url": "http://127.0.0.1:9000", "viewer": "alice"}"#,
        )
        .await
        .unwrap();

        let config = ClientConfig::load(&path).await.unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout_secs, ClientConfig::DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.viewer.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_load_corrupted_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("replay_search.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result = ClientConfig::load(&path).await;
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
