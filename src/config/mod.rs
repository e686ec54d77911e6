//! 配置管理
//!
//! 分层加载：默认值 → config 文件 → 环境特定文件 → 环境变量。

mod r#impl;
mod structs;

pub use structs::*;
