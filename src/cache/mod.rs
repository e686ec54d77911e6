//! 缓存层
//!
//! 目前只提供进程内的 Moka 后端，会话数据存放于此。

pub mod object_cache;

use async_trait::async_trait;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    // 读取原始字符串
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    // 写入原始字符串
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    // 删除键
    async fn remove(&self, key: &str);
}
