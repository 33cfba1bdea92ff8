//! 地址物化：派生密钥 → (WIF, 地址)
//!
//! 三种方案共用同一 WIF 推导，仅末端编码不同。相对派生而言物化开销
//! 很小，本层不做缓存，重复调用各自独立重算。WIF 与地址编码使用
//! 同一个网络参数（不存在某一步退回主网的情况）。

use std::fmt;

use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, PrivateKey, PublicKey};

use crate::config::NetworkParams;
use crate::domain::path::AddressScheme;
use crate::domain::wallet::DerivedKey;
use crate::error::WalletError;

impl DerivedKey {
    /// 按方案物化为 (WIF 导出串, 地址串)
    ///
    /// 任一步失败即整体失败，没有部分结果。
    pub fn materialize(
        &self,
        scheme: AddressScheme,
        params: &NetworkParams,
        compress: bool,
    ) -> Result<(String, String), WalletError> {
        match scheme {
            AddressScheme::SegwitNested => self.segwit_nested(params, compress),
            AddressScheme::NativeSegwit => self.native_segwit(params, compress),
            AddressScheme::Taproot => self.taproot(params, compress),
        }
    }

    /// SegWit (P2WPKH-nested-in-P2SH)
    ///
    /// 压缩公钥哈希 → 见证地址 → 其脚本作为赎回脚本 → 脚本哈希地址
    pub fn segwit_nested(
        &self,
        params: &NetworkParams,
        compress: bool,
    ) -> Result<(String, String), WalletError> {
        let (privkey, pubkey) = self.key_pair(params, compress);

        let witness = Address::p2wpkh(&pubkey, params.network)
            .map_err(|e| self.encode_error(e))?;
        let redeem = witness.script_pubkey();
        let nested = Address::p2sh(&redeem, params.network).map_err(|e| self.encode_error(e))?;

        Ok((privkey.to_wif(), nested.to_string()))
    }

    /// SegWit (P2WPKH, bech32)
    pub fn native_segwit(
        &self,
        params: &NetworkParams,
        compress: bool,
    ) -> Result<(String, String), WalletError> {
        let (privkey, pubkey) = self.key_pair(params, compress);

        let witness = Address::p2wpkh(&pubkey, params.network)
            .map_err(|e| self.encode_error(e))?;

        Ok((privkey.to_wif(), witness.to_string()))
    }

    /// Taproot (P2TR, bech32m)
    ///
    /// 无脚本内部密钥经 BIP341 输出密钥调整后以 bech32m 编码
    pub fn taproot(
        &self,
        params: &NetworkParams,
        compress: bool,
    ) -> Result<(String, String), WalletError> {
        let (privkey, pubkey) = self.key_pair(params, compress);

        let secp = Secp256k1::new();
        let (internal_key, _parity) = pubkey.inner.x_only_public_key();
        let taproot = Address::p2tr(&secp, internal_key, None, params.network);

        Ok((privkey.to_wif(), taproot.to_string()))
    }

    /// 从密钥材料重建 (私钥, 公钥) 对
    fn key_pair(&self, params: &NetworkParams, compress: bool) -> (PrivateKey, PublicKey) {
        let secp = Secp256k1::new();
        let privkey = if compress {
            PrivateKey::new(self.xpriv().private_key, params.network)
        } else {
            PrivateKey::new_uncompressed(self.xpriv().private_key, params.network)
        };
        let pubkey = privkey.public_key(&secp);
        (privkey, pubkey)
    }

    fn encode_error(&self, err: impl fmt::Display) -> WalletError {
        WalletError::Address {
            path: self.path().to_string(),
            reason: err.to_string(),
        }
    }
}
