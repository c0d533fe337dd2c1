use std::io;

/// 存储层统一错误类型。
///
/// 调用方通过 `is_not_exist()` / `is_decode()` 区分语义，不依赖具体变体。
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// 数据文件或请求的 chirp 不存在
    #[error("resource does not exist")]
    NotExist,

    #[error("snapshot decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// JSON 合法，但 key 与记录内 id 不一致
    #[error("snapshot corrupt: key {key} holds chirp with id {id}")]
    Corrupt { key: u64, id: u64 },

    /// `len + 1` 撞上已有 key（文件中 id 不连续）
    #[error("chirp id {0} already in use")]
    IdInUse(u64),

    #[error("snapshot encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl DbError {
    pub fn is_not_exist(&self) -> bool {
        matches!(self, DbError::NotExist)
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, DbError::Decode(_) | DbError::Corrupt { .. })
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
