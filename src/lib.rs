//! IronWallet - Bitcoin HD 钱包派生工具
//!
//! 单种子五级层级（purpose/coin_type/account/change/index）的确定性派生，
//! 带路径缓存，并将叶子密钥物化为三种地址编码（BIP49/BIP84/BIP86）

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

// 重新导出常用类型
pub use error::WalletError;

// 统一模块导出
pub mod prelude {
    pub use crate::{
        config::{NetworkParams, NetworkRegistry, HARDENED_OFFSET},
        domain::{AddressScheme, Coordinate, DerivedKey, HdWallet},
        error::WalletError,
    };
}
