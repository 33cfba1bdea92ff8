//! Domain 模块
//!
//! 包含层级坐标、派生引擎与地址物化的领域模型

pub mod address;
pub mod path;
pub mod wallet;

// 重新导出常用类型
pub use path::{AddressScheme, Coordinate};
pub use wallet::{DerivedKey, HdWallet};
