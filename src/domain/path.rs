//! 派生路径与层级坐标
//!
//! 规范化路径字符串是缓存键：同一逻辑坐标必须生成字节一致的字符串。
//! 硬化/非硬化的分层策略（purpose/coin_type/account 硬化，change/index
//! 普通派生）是层级的固定约定，不由调用方选择。

use std::fmt;

use bitcoin::bip32::{self, ChildNumber};

use crate::config::HARDENED_OFFSET;

/// 五级层级坐标
///
/// `purpose` 与 `coin_type` 以偏移编码传入（如 `0x80000054` 表示 `84'`），
/// `account` 在派生时内部做硬化，`change` 与 `index` 为普通派生。
/// 路径字符串展示时去掉偏移量并以 `'` 标记硬化层。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub purpose: u32,
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    pub index: u32,
}

/// 一步派生：该节点的规范路径 + 从父节点派生它的子编号
#[derive(Debug, Clone)]
pub struct DerivationStep {
    pub path: String,
    pub child: ChildNumber,
}

impl Coordinate {
    pub fn new(purpose: u32, coin_type: u32, account: u32, change: u32, index: u32) -> Self {
        Self {
            purpose,
            coin_type,
            account,
            change,
            index,
        }
    }

    /// 规范化叶子路径，如 `m/84'/0'/0'/0/0`
    pub fn leaf_path(&self) -> String {
        format!(
            "m/{}'/{}'/{}'/{}/{}",
            self.purpose & !HARDENED_OFFSET,
            self.coin_type & !HARDENED_OFFSET,
            self.account & !HARDENED_OFFSET,
            self.change,
            self.index
        )
    }

    /// 从 `m` 之下到叶子的有序派生步骤（浅 → 深，共 5 步）
    ///
    /// 派生总是从最浅的缺失祖先推进到叶子；不存在其它顺序。
    pub fn steps(&self) -> Result<Vec<DerivationStep>, bip32::Error> {
        let purpose = self.purpose & !HARDENED_OFFSET;
        let coin_type = self.coin_type & !HARDENED_OFFSET;
        let account = self.account & !HARDENED_OFFSET;

        let purpose_path = format!("m/{}'", purpose);
        let coin_path = format!("{}/{}'", purpose_path, coin_type);
        let account_path = format!("{}/{}'", coin_path, account);
        let change_path = format!("{}/{}", account_path, self.change);
        let leaf_path = format!("{}/{}", change_path, self.index);

        Ok(vec![
            DerivationStep {
                path: purpose_path,
                child: ChildNumber::from_hardened_idx(purpose)?,
            },
            DerivationStep {
                path: coin_path,
                child: ChildNumber::from_hardened_idx(coin_type)?,
            },
            DerivationStep {
                path: account_path,
                child: ChildNumber::from_hardened_idx(account)?,
            },
            DerivationStep {
                path: change_path,
                child: ChildNumber::from_normal_idx(self.change)?,
            },
            DerivationStep {
                path: leaf_path,
                child: ChildNumber::from_normal_idx(self.index)?,
            },
        ])
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.leaf_path())
    }
}

/// 地址编码方案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScheme {
    /// BIP49: SegWit (P2WPKH-nested-in-P2SH)
    SegwitNested,
    /// BIP84: SegWit (P2WPKH, bech32)
    NativeSegwit,
    /// BIP86: Taproot (P2TR, bech32m)
    Taproot,
}

impl AddressScheme {
    /// 该方案的偏移编码 purpose 常量
    pub const fn purpose(self) -> u32 {
        match self {
            Self::SegwitNested => HARDENED_OFFSET | 49,
            Self::NativeSegwit => HARDENED_OFFSET | 84,
            Self::Taproot => HARDENED_OFFSET | 86,
        }
    }

    /// 派生标准名称
    pub const fn standard(self) -> &'static str {
        match self {
            Self::SegwitNested => "BIP49",
            Self::NativeSegwit => "BIP84",
            Self::Taproot => "BIP86",
        }
    }

    /// 展示层使用的方案描述
    pub const fn description(self) -> &'static str {
        match self {
            Self::SegwitNested => "SegWit (P2WPKH-nested-in-P2SH)",
            Self::NativeSegwit => "SegWit (P2WPKH, bech32)",
            Self::Taproot => "Taproot (P2TR, bech32m)",
        }
    }

    pub const ALL: [AddressScheme; 3] = [
        AddressScheme::SegwitNested,
        AddressScheme::NativeSegwit,
        AddressScheme::Taproot,
    ];
}

impl fmt::Display for AddressScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.standard())
    }
}
