//! 地址簿服务
//!
//! 面向展示层的批量派生：按方案产出有序的 (路径, 地址, WIF) 行

use serde::Serialize;

use crate::config::{NetworkParams, HARDENED_OFFSET};
use crate::domain::{AddressScheme, Coordinate, HdWallet};
use crate::error::WalletError;

/// 展示层一行
#[derive(Debug, Clone, Serialize)]
pub struct AddressRow {
    pub path: String,
    pub address: String,
    pub wif: String,
}

/// 批量派生请求
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest {
    pub scheme: AddressScheme,
    /// 偏移编码的 coin type（比特币主链为 0x80000000）
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    /// 派生 index 0..count
    pub count: u32,
    pub compress: bool,
}

impl BatchRequest {
    /// 比特币外部地址（coin 0'，account 0'，change 0）的标准请求
    pub fn bitcoin(scheme: AddressScheme, count: u32) -> Self {
        Self {
            scheme,
            coin_type: HARDENED_OFFSET,
            account: 0,
            change: 0,
            count,
            compress: true,
        }
    }
}

/// 派生一批地址行，index 从 0 递增
///
/// 任一索引失败即整体失败；已成功缓存的前缀路径保持可复用。
pub fn derive_rows(
    wallet: &HdWallet,
    req: &BatchRequest,
    params: &NetworkParams,
) -> Result<Vec<AddressRow>, WalletError> {
    let mut rows = Vec::with_capacity(req.count as usize);

    for index in 0..req.count {
        let coord = Coordinate::new(
            req.scheme.purpose(),
            req.coin_type,
            req.account,
            req.change,
            index,
        );
        let key = wallet.derive_key(coord)?;
        let (wif, address) = key.materialize(req.scheme, params, req.compress)?;
        rows.push(AddressRow {
            path: key.path().to_string(),
            address,
            wif,
        });
    }

    tracing::debug!(scheme = %req.scheme, rows = rows.len(), "derived address batch");
    Ok(rows)
}
