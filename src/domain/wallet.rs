//! HD 钱包：种子、主密钥与路径缓存派生引擎
//!
//! 缓存由钱包实例独占持有，键为规范路径字符串。写锁内二次检查，
//! 保证同一路径至多派生一次；缓存只增不减，随钱包一起释放。

use std::collections::HashMap;
use std::sync::RwLock;

use bip39::{Language, Mnemonic};
use bitcoin::bip32::Xpriv;
use bitcoin::secp256k1::{All, Secp256k1};
use bitcoin::Network;
use once_cell::sync::OnceCell;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::domain::path::Coordinate;
use crate::error::WalletError;

/// 主密钥的规范路径
const MASTER_PATH: &str = "m";

/// 路径缓存
///
/// 读路径并发，插入独占。get_or_try_insert 在写锁内重新检查，
/// 两个并发调用方竞争同一未缓存路径时只有一方执行派生。
struct KeyCache {
    keys: RwLock<HashMap<String, Xpriv>>,
}

impl KeyCache {
    fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }

    fn get(&self, path: &str) -> Option<Xpriv> {
        self.keys
            .read()
            .expect("key cache lock poisoned")
            .get(path)
            .copied()
    }

    /// 原子 get-or-insert：命中直接返回，未命中在写锁内派生后插入
    fn get_or_try_insert<F>(&self, path: &str, derive: F) -> Result<Xpriv, WalletError>
    where
        F: FnOnce() -> Result<Xpriv, WalletError>,
    {
        if let Some(key) = self.get(path) {
            return Ok(key);
        }

        let mut keys = self.keys.write().expect("key cache lock poisoned");
        if let Some(key) = keys.get(path) {
            return Ok(*key);
        }

        let key = derive()?;
        keys.insert(path.to_string(), key);
        Ok(key)
    }

    fn len(&self) -> usize {
        self.keys.read().expect("key cache lock poisoned").len()
    }
}

/// 派生出的密钥句柄：规范路径 + 扩展私钥
///
/// 创建后不可变；自身不含任何密码学行为，签名与编码均交给
/// rust-bitcoin 协作者完成。
#[derive(Debug, Clone)]
pub struct DerivedKey {
    path: String,
    xpriv: Xpriv,
}

impl DerivedKey {
    /// 产生该密钥的规范路径
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn xpriv(&self) -> &Xpriv {
        &self.xpriv
    }
}

/// HD 钱包
///
/// 持有助记词、密码、惰性计算的种子与路径缓存。种子在钱包生命周期内
/// 只计算一次；缓存中任一密钥的完整祖先链必然也在缓存中。
pub struct HdWallet {
    mnemonic: Mnemonic,
    password: String,
    network: Network,
    seed: OnceCell<Zeroizing<[u8; 64]>>,
    cache: KeyCache,
    secp: Secp256k1<All>,
}

impl HdWallet {
    /// 创建钱包
    ///
    /// `mnemonic` 缺省或为空白时，从系统熵生成新的 24 词英文助记词。
    /// `network` 决定扩展密钥的版本字节；地址编码的网络在物化时单独传入。
    pub fn new(
        network: Network,
        password: impl Into<String>,
        mnemonic: Option<&str>,
    ) -> Result<Self, WalletError> {
        let mnemonic = match mnemonic {
            Some(phrase) if !phrase.trim().is_empty() => {
                Mnemonic::parse_in(Language::English, phrase)?
            }
            _ => {
                let mut entropy = [0u8; 32];
                rand::rngs::OsRng.fill_bytes(&mut entropy);
                Mnemonic::from_entropy_in(Language::English, &entropy)?
            }
        };

        Ok(Self {
            mnemonic,
            password: password.into(),
            network,
            seed: OnceCell::new(),
            cache: KeyCache::new(),
            secp: Secp256k1::new(),
        })
    }

    /// 助记词
    pub fn mnemonic(&self) -> String {
        self.mnemonic.to_string()
    }

    /// 密码（可为空串）
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// BIP39 种子，首次访问时计算，此后不变
    pub fn seed(&self) -> &[u8] {
        let seed = self
            .seed
            .get_or_init(|| Zeroizing::new(self.mnemonic.to_seed(&self.password)));
        &seed[..]
    }

    /// 主密钥（路径 `m`）
    ///
    /// 首次调用从种子派生并写入缓存；种子被拒绝（如长度非法）时
    /// 返回错误，不重试。
    pub fn master_key(&self) -> Result<Xpriv, WalletError> {
        self.cache.get_or_try_insert(MASTER_PATH, || {
            Xpriv::new_master(self.network, self.seed()).map_err(WalletError::MasterKey)
        })
    }

    /// 派生叶子坐标对应的密钥
    ///
    /// 缓存命中立即返回；未命中时自最浅的缺失祖先起逐级派生，
    /// 每级在其规范路径下写入缓存。任一级失败则整个请求失败，
    /// 已缓存的路径保持有效。
    pub fn derive_key(&self, coord: Coordinate) -> Result<DerivedKey, WalletError> {
        let leaf_path = coord.leaf_path();

        if let Some(key) = self.cache.get(&leaf_path) {
            tracing::trace!(path = %leaf_path, "key cache hit");
            return Ok(DerivedKey {
                path: leaf_path,
                xpriv: key,
            });
        }

        let steps = coord.steps().map_err(|source| WalletError::ChildKey {
            path: leaf_path.clone(),
            source,
        })?;

        let mut key = self.master_key()?;
        for step in steps {
            let parent = key;
            key = self.cache.get_or_try_insert(&step.path, || {
                tracing::trace!(path = %step.path, "deriving child key");
                parent
                    .derive_priv(&self.secp, &[step.child])
                    .map_err(|source| WalletError::ChildKey {
                        path: step.path.clone(),
                        source,
                    })
            })?;
        }

        Ok(DerivedKey {
            path: leaf_path,
            xpriv: key,
        })
    }

    /// 当前缓存的密钥数量（含主密钥）
    pub fn cached_key_count(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::bip32::ChildNumber;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_wallet() -> HdWallet {
        HdWallet::new(Network::Bitcoin, "", Some(TEST_MNEMONIC)).unwrap()
    }

    #[test]
    fn test_seed_memoized() {
        let wallet = test_wallet();
        let first = wallet.seed().to_vec();
        let second = wallet.seed().to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_generated_mnemonic_is_24_words() {
        let wallet = HdWallet::new(Network::Bitcoin, "", None).unwrap();
        assert_eq!(wallet.mnemonic().split_whitespace().count(), 24);

        // 空白字符串等同于缺省
        let wallet = HdWallet::new(Network::Bitcoin, "", Some("   ")).unwrap();
        assert_eq!(wallet.mnemonic().split_whitespace().count(), 24);
    }

    #[test]
    fn test_invalid_mnemonic_rejected() {
        let result = HdWallet::new(Network::Bitcoin, "", Some("not a valid phrase"));
        assert!(matches!(result, Err(WalletError::Mnemonic(_))));
    }

    #[test]
    fn test_master_key_cached() {
        let wallet = test_wallet();
        assert_eq!(wallet.cached_key_count(), 0);

        let first = wallet.master_key().unwrap();
        assert_eq!(wallet.cached_key_count(), 1);

        let second = wallet.master_key().unwrap();
        assert_eq!(first, second);
        assert_eq!(wallet.cached_key_count(), 1);
    }

    #[test]
    fn test_derive_key_deterministic_across_wallets() {
        let coord = Coordinate::new(0x8000_0054, 0x8000_0000, 0, 0, 0);

        let a = test_wallet().derive_key(coord).unwrap();
        let b = test_wallet().derive_key(coord).unwrap();

        assert_eq!(a.path(), "m/84'/0'/0'/0/0");
        assert_eq!(a.xpriv().private_key, b.xpriv().private_key);
    }

    #[test]
    fn test_derive_key_caches_whole_ancestor_chain() {
        let wallet = test_wallet();
        let coord = Coordinate::new(0x8000_0054, 0x8000_0000, 0, 0, 0);

        wallet.derive_key(coord).unwrap();
        // m + 5 级
        assert_eq!(wallet.cached_key_count(), 6);

        for path in ["m", "m/84'", "m/84'/0'", "m/84'/0'/0'", "m/84'/0'/0'/0"] {
            assert!(wallet.cache.get(path).is_some(), "missing ancestor {path}");
        }
    }

    #[test]
    fn test_derive_key_idempotent() {
        let wallet = test_wallet();
        let coord = Coordinate::new(0x8000_0031, 0x8000_0000, 0, 0, 3);

        let first = wallet.derive_key(coord).unwrap();
        let count = wallet.cached_key_count();

        let second = wallet.derive_key(coord).unwrap();
        assert_eq!(first.xpriv().private_key, second.xpriv().private_key);
        // 第二次调用不产生新的派生工作
        assert_eq!(wallet.cached_key_count(), count);
    }

    #[test]
    fn test_sibling_reuses_ancestors() {
        let wallet = test_wallet();
        wallet
            .derive_key(Coordinate::new(0x8000_0054, 0x8000_0000, 0, 0, 0))
            .unwrap();
        assert_eq!(wallet.cached_key_count(), 6);

        // 兄弟叶子只新增一个缓存项
        wallet
            .derive_key(Coordinate::new(0x8000_0054, 0x8000_0000, 0, 0, 1))
            .unwrap();
        assert_eq!(wallet.cached_key_count(), 7);
    }

    #[test]
    fn test_hierarchy_consistency() {
        let wallet = test_wallet();
        let coord = Coordinate::new(0x8000_0054, 0x8000_0000, 0, 0, 5);
        let leaf = wallet.derive_key(coord).unwrap();

        // 叶子必须等于 change 级密钥在 index 处的子密钥
        let change = wallet.cache.get("m/84'/0'/0'/0").unwrap();
        let secp = Secp256k1::new();
        let expected = change
            .derive_priv(&secp, &[ChildNumber::from_normal_idx(5).unwrap()])
            .unwrap();
        assert_eq!(leaf.xpriv().private_key, expected.private_key);

        // change 级又必须等于 account 级的子密钥
        let account = wallet.cache.get("m/84'/0'/0'").unwrap();
        let expected_change = account
            .derive_priv(&secp, &[ChildNumber::from_normal_idx(0).unwrap()])
            .unwrap();
        assert_eq!(change.private_key, expected_change.private_key);
    }

    #[test]
    fn test_concurrent_derivation_single_entry() {
        let wallet = test_wallet();
        let coord = Coordinate::new(0x8000_0056, 0x8000_0000, 0, 0, 0);

        let keys: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| wallet.derive_key(coord).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // 所有线程拿到相同密钥材料
        let reference = keys[0].xpriv().private_key;
        for key in &keys {
            assert_eq!(key.xpriv().private_key, reference);
        }

        // 每条路径恰好一个缓存项：m + 5 级
        assert_eq!(wallet.cached_key_count(), 6);
    }
}
