use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::Snapshot;

/// 存储概况
#[derive(Clone, Debug, Default, Serialize)]
pub struct StoreReport {
    pub path: PathBuf,
    /// chirp 总数
    pub chirp_count: usize,
    /// 不同 author_id 数量
    pub author_count: usize,
    /// 下一次 create 将分配的 id
    pub next_id: u64,
    /// 数据文件大小（字节）
    pub file_bytes: u64,
}

impl StoreReport {
    pub fn from_snapshot(snap: &Snapshot, path: PathBuf, file_bytes: u64) -> Self {
        let authors: BTreeSet<i64> = snap.chirps.values().map(|c| c.author_id).collect();
        Self {
            path,
            chirp_count: snap.len(),
            author_count: authors.len(),
            next_id: snap.next_id(),
            file_bytes,
        }
    }
}

fn human_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

impl fmt::Display for StoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           chirpy-store Report                    ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(f, "║ file: {}", self.path.display())?;
        writeln!(f, "╠──────────────────────────────────────────────────╣")?;
        writeln!(
            f,
            "║   chirps:       {:>10}                       ║",
            self.chirp_count
        )?;
        writeln!(
            f,
            "║   authors:      {:>10}                       ║",
            self.author_count
        )?;
        writeln!(
            f,
            "║   next id:      {:>10}                       ║",
            self.next_id
        )?;
        writeln!(
            f,
            "║   file size:    {:>10}                       ║",
            human_bytes(self.file_bytes)
        )?;
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}
