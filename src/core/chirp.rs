use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// 单条 chirp 记录
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u64,
    pub body: String,
    pub author_id: i64,
}

/// 完整的存储快照（整文件读写的单位）。
///
/// 磁盘格式：`{"chirps": {"<id>": {"id": <id>, "body": "...", "author_id": <n>}}}`
/// - map key 为 id 的十进制字符串（serde_json 对整数 key 的默认编码）
/// - value 内冗余保存 `id`，保持与既有文件兼容
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub chirps: BTreeMap<u64, Chirp>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chirps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chirps.is_empty()
    }

    /// 下一个 id = 当前条数 + 1
    pub fn next_id(&self) -> u64 {
        self.chirps.len() as u64 + 1
    }

    /// 以 `chirp.id` 为 key 插入；同 id 覆盖旧值。
    pub fn insert(&mut self, chirp: Chirp) -> Option<Chirp> {
        self.chirps.insert(chirp.id, chirp)
    }

    pub fn get(&self, id: u64) -> Option<&Chirp> {
        self.chirps.get(&id)
    }

    /// 校验 key == value.id
    pub fn validate(&self) -> Result<()> {
        for (key, chirp) in &self.chirps {
            if *key != chirp.id {
                return Err(DbError::Corrupt {
                    key: *key,
                    id: chirp.id,
                });
            }
        }
        Ok(())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let snap: Snapshot = serde_json::from_slice(bytes).map_err(DbError::Decode)?;
        snap.validate()?;
        Ok(snap)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(DbError::Encode)
    }
}
