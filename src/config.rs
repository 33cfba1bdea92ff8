//! 网络参数配置模块
//!
//! 显式列出地址编码所需的全部网络参数，WIF 与地址编码均以
//! 调用方传入的网络为准（不允许任何一步退回硬编码主网）

use std::collections::HashMap;

use bitcoin::Network;

use crate::error::WalletError;

/// BIP32 硬化派生偏移量 (0')
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// 网络参数
#[derive(Debug, Clone)]
pub struct NetworkParams {
    /// 网络名称
    pub name: String,
    /// rust-bitcoin 网络标识（WIF 版本字节与地址编码均由此决定）
    pub network: Network,
    /// bech32/bech32m 可读前缀
    pub bech32_hrp: String,
    /// base58 公钥哈希地址版本字节
    pub pubkey_hash_version: u8,
    /// base58 脚本哈希地址版本字节
    pub script_hash_version: u8,
}

/// 网络参数注册表
pub struct NetworkRegistry {
    params: HashMap<String, NetworkParams>,
}

impl NetworkRegistry {
    /// 创建预配置的注册表
    pub fn new() -> Self {
        let mut registry = Self {
            params: HashMap::new(),
        };

        registry.register_default_networks();
        registry
    }

    /// 注册默认支持的网络
    fn register_default_networks(&mut self) {
        self.register(NetworkParams {
            name: "mainnet".to_string(),
            network: Network::Bitcoin,
            bech32_hrp: "bc".to_string(),
            pubkey_hash_version: 0x00,
            script_hash_version: 0x05,
        });

        self.register(NetworkParams {
            name: "testnet".to_string(),
            network: Network::Testnet,
            bech32_hrp: "tb".to_string(),
            pubkey_hash_version: 0x6f,
            script_hash_version: 0xc4,
        });

        self.register(NetworkParams {
            name: "regtest".to_string(),
            network: Network::Regtest,
            bech32_hrp: "bcrt".to_string(),
            pubkey_hash_version: 0x6f,
            script_hash_version: 0xc4,
        });
    }

    /// 注册网络参数
    pub fn register(&mut self, params: NetworkParams) {
        self.params.insert(params.name.to_lowercase(), params);
    }

    /// 按名称获取网络参数
    pub fn get(&self, name: &str) -> Option<&NetworkParams> {
        self.params.get(&name.to_lowercase())
    }

    /// 按名称解析网络参数，未知网络返回错误
    pub fn resolve(&self, name: &str) -> Result<&NetworkParams, WalletError> {
        self.get(name)
            .ok_or_else(|| WalletError::UnknownNetwork(name.to_string()))
    }

    /// 列出所有支持的网络
    pub fn list_all(&self) -> Vec<&NetworkParams> {
        self.params.values().collect()
    }

    /// 验证注册表完整性
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, params) in &self.params {
            if params.name.is_empty() {
                errors.push(format!("Network {} has empty name", name));
            }
            if params.bech32_hrp.is_empty() {
                errors.push(format!("Network {} has empty bech32 HRP", params.name));
            }
            if params.pubkey_hash_version == params.script_hash_version {
                errors.push(format!(
                    "Network {} has identical pubkey-hash and script-hash versions",
                    params.name
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_registry() {
        let registry = NetworkRegistry::new();

        let mainnet = registry.get("mainnet").unwrap();
        assert_eq!(mainnet.network, Network::Bitcoin);
        assert_eq!(mainnet.bech32_hrp, "bc");

        // 大小写不敏感
        let testnet = registry.get("Testnet").unwrap();
        assert_eq!(testnet.network, Network::Testnet);
        assert_eq!(testnet.bech32_hrp, "tb");

        assert!(registry.get("signet").is_none());
    }

    #[test]
    fn test_resolve_unknown_network() {
        let registry = NetworkRegistry::new();

        let err = registry.resolve("florin").unwrap_err();
        assert!(matches!(err, WalletError::UnknownNetwork(ref name) if name == "florin"));
    }

    #[test]
    fn test_validate_default_registry() {
        let registry = NetworkRegistry::new();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.list_all().len(), 3);
    }

    #[test]
    fn test_hardened_offset() {
        assert_eq!(HARDENED_OFFSET, 0x8000_0000);
        assert_eq!(HARDENED_OFFSET | 84, 0x8000_0054);
    }
}
