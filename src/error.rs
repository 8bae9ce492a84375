use std::time::Duration;

/// 查询错误：任何一种都让整次查询失败，不返回部分结果
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// 连接 / 协议 / 命令失败（Redis 侧）
    #[error("store transaction failed: {0}")]
    Store(#[from] redis::RedisError),

    /// 命令级失败（MemoryStore 侧，语义对齐 Redis 的错误回复）
    #[error("store command failed: {0}")]
    Command(String),

    /// SORT 回复长度不是投影宽度的整数倍，或 member 为 nil
    #[error("malformed SORT reply: {len} values for projection width {width}")]
    MalformedReply { len: usize, width: usize },

    #[error("store round trip exceeded deadline of {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid connection settings: {0}")]
    Connection(#[from] redis::RedisError),
}
