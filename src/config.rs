use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::abi::{EncodeOptions, FixedBytesInput, FunctionLookup};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub codec: CodecConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub max_body_size: usize,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Used when a request carries no `X-Node-Address` header
    pub default_rpc_url: String,
    pub request_timeout_secs: u64,
    pub default_gas_limit: u64,
    /// Used for signing when the node reports a chain id of zero
    pub default_chain_id: u64,
    pub max_blocks_per_request: u64,
    /// Providers kept for distinct node addresses, least recently used evicted first
    #[serde(default = "default_max_cached_providers")]
    pub max_cached_providers: usize,
}

fn default_max_cached_providers() -> usize {
    16
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub fixed_bytes_input: FixedBytesInput,
    #[serde(default)]
    pub function_lookup: FunctionLookup,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            node: NodeConfig::default(),
            codec: CodecConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_body_size: 10 * 1024 * 1024, // 10MB
            enable_cors: true,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            default_rpc_url: "http://localhost:8545".to_string(),
            request_timeout_secs: 30,
            default_gas_limit: 100_000,
            default_chain_id: 1,
            max_blocks_per_request: 50,
            max_cached_providers: default_max_cached_providers(),
        }
    }
}

impl NodeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl CodecConfig {
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            fixed_bytes_input: self.fixed_bytes_input,
            function_lookup: self.function_lookup,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow!("Failed to create config directory {:?}: {}", parent, e)
                })?;
            }
        }

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path, e))?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub async fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Self {
        let mut config = match path {
            Some(path) => match Self::load_from_file(path).await {
                Ok(config) => {
                    tracing::info!("Loaded configuration from file");
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load config file, using defaults: {}", e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        config.apply_env_vars();
        config
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("GATEWAY_NODE_URL") {
            tracing::info!("Using GATEWAY_NODE_URL environment variable as default node");
            self.node.default_rpc_url = url;
        }

        if let Ok(addr) = std::env::var("GATEWAY_LISTEN_ADDR") {
            match addr.parse() {
                Ok(addr) => self.server.listen_addr = addr,
                Err(e) => tracing::warn!("Ignoring invalid GATEWAY_LISTEN_ADDR '{}': {}", addr, e),
            }
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> Result<std::path::PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("chain-gateway").join("config.toml"))
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let sample_config = r#"# Chain Gateway Configuration File

[server]
listen_addr = "0.0.0.0:8080"
max_body_size = 10485760  # 10MB
enable_cors = true

[node]
# JSON-RPC endpoint used when a request has no X-Node-Address header
default_rpc_url = "http://localhost:8545"
request_timeout_secs = 30
default_gas_limit = 100000
default_chain_id = 1
max_blocks_per_request = 50
max_cached_providers = 16

[codec]
# How string arguments for bytesN parameters are converted:
#   "raw" copies the UTF-8 bytes of the string, "hex" decodes it as hex
fixed_bytes_input = "raw"
# "exact_then_substring", "exact" or "substring"
function_lookup = "exact_then_substring"

# Environment variables that can be used:
# GATEWAY_NODE_URL - overrides node.default_rpc_url
# GATEWAY_LISTEN_ADDR - overrides server.listen_addr
"#;
        sample_config.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert_eq!(config.node.default_rpc_url, "http://localhost:8545");
        assert_eq!(config.node.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.codec.fixed_bytes_input, FixedBytesInput::Raw);
        assert_eq!(config.codec.function_lookup, FunctionLookup::ExactThenSubstring);
        assert_eq!(config.node.max_cached_providers, 16);
    }

    #[test]
    fn test_node_section_without_cache_size() {
        let config: Config = toml::from_str(
            r#"
            [node]
            default_rpc_url = "http://node.internal:8545"
            request_timeout_secs = 10
            default_gas_limit = 50000
            default_chain_id = 5
            max_blocks_per_request = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.node.max_cached_providers, 16);
        assert_eq!(config.node.default_chain_id, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [codec]
            fixed_bytes_input = "hex"
            function_lookup = "exact"
            "#,
        )
        .unwrap();
        assert_eq!(config.node.default_gas_limit, 100_000);
        assert!(config.server.enable_cors);
        let options = config.codec.encode_options();
        assert_eq!(options.fixed_bytes_input, FixedBytesInput::Hex);
        assert_eq!(options.function_lookup, FunctionLookup::Exact);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.node.default_rpc_url = "http://node.internal:8545".to_string();
        config.node.max_blocks_per_request = 10;
        config.save_to_file(&path).await.unwrap();

        let loaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.node.default_rpc_url, "http://node.internal:8545");
        assert_eq!(loaded.node.max_blocks_per_request, 10);
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("absent.toml");
        let config = Config::load_or_default(Some(&path)).await;
        assert_eq!(config.server.max_body_size, 10 * 1024 * 1024);
    }
}
