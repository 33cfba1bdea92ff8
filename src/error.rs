//! 钱包核心错误类型
//!
//! 每个核心操作返回显式的成功/失败结果；错误不在内部重试或吞掉

use thiserror::Error;

/// 钱包核心错误
#[derive(Debug, Error)]
pub enum WalletError {
    /// 助记词解析失败
    #[error("invalid mnemonic: {0}")]
    Mnemonic(#[from] bip39::Error),

    /// 主密钥派生失败（种子被派生算法拒绝）
    #[error("master key derivation failed: {0}")]
    MasterKey(#[source] bitcoin::bip32::Error),

    /// 子密钥派生失败（该坐标下的子密钥无效）
    #[error("child key derivation failed at {path}: {source}")]
    ChildKey {
        path: String,
        #[source]
        source: bitcoin::bip32::Error,
    },

    /// 地址编码失败（编码器拒绝密钥字节或网络参数）
    #[error("address encoding failed for {path}: {reason}")]
    Address { path: String, reason: String },

    /// 未知网络名称
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
