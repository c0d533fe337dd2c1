use std::path::PathBuf;
use std::sync::Arc;

use crate::core::Chirp;
use crate::error::{DbError, Result};
use crate::stats::StoreReport;
use crate::storage::{Database, DatabaseOptions};

/// Chirp 记录级操作。
///
/// 每个操作都是一次独立的 load / store 事务；写操作走 `Database::update`，
/// 并发 create 不会分到同一个 id。
#[derive(Clone)]
pub struct ChirpRepository {
    db: Arc<Database>,
}

impl ChirpRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(Arc::new(Database::open(path)?)))
    }

    pub fn open_with(path: impl Into<PathBuf>, opts: DatabaseOptions) -> Result<Self> {
        Ok(Self::new(Arc::new(Database::open_with(path, opts)?)))
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn create_chirp(&self, body: &str, author_id: i64) -> Result<Chirp> {
        let chirp = self.db.update(|snap| {
            let id = snap.next_id();
            if snap.get(id).is_some() {
                tracing::warn!("Chirp id {} already taken, refusing to overwrite", id);
                return Err(DbError::IdInUse(id));
            }
            let chirp = Chirp {
                id,
                body: body.to_string(),
                author_id,
            };
            snap.insert(chirp.clone());
            Ok(chirp)
        })?;
        tracing::debug!("Created chirp {} (author {})", chirp.id, chirp.author_id);
        Ok(chirp)
    }

    pub fn get_chirp(&self, id: u64) -> Result<Chirp> {
        let mut snap = self.db.load()?;
        snap.chirps.remove(&id).ok_or(DbError::NotExist)
    }

    /// 全部 chirp。当前实现按 id 升序返回，但调用方不应依赖顺序。
    pub fn get_chirps(&self) -> Result<Vec<Chirp>> {
        let snap = self.db.load()?;
        Ok(snap.chirps.into_values().collect())
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.db.load()?.len())
    }

    pub fn stats(&self) -> Result<StoreReport> {
        let snap = self.db.load()?;
        let file_bytes = self.db.file_size()?;
        Ok(StoreReport::from_snapshot(
            &snap,
            self.db.path().to_path_buf(),
            file_bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_tmp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("chirpy-repo-{}-{}", tag, nanos))
    }

    fn fresh(tag: &str) -> ChirpRepository {
        let path = unique_tmp_dir(tag).join("database.json");
        ChirpRepository::open_with(path, DatabaseOptions { sync: false }).unwrap()
    }

    #[test]
    fn create_assigns_count_plus_one() {
        let repo = fresh("ids");
        for i in 1..=5u64 {
            let c = repo.create_chirp(&format!("chirp {i}"), i as i64).unwrap();
            assert_eq!(c.id, i);
        }
        assert_eq!(repo.count().unwrap(), 5);
    }

    #[test]
    fn get_returns_stored_fields() {
        let repo = fresh("get");
        let created = repo.create_chirp("hello", 42).unwrap();
        assert_eq!(repo.get_chirp(created.id).unwrap(), created);
    }

    #[test]
    fn unknown_id_is_not_exist() {
        let repo = fresh("missing");
        assert!(repo.get_chirp(1).unwrap_err().is_not_exist());
        repo.create_chirp("only", 1).unwrap();
        assert!(repo.get_chirp(0).unwrap_err().is_not_exist());
        assert!(repo.get_chirp(2).unwrap_err().is_not_exist());
    }

    #[test]
    fn corrupt_file_blocks_create() {
        let repo = fresh("corrupt");
        let path = repo.database().path().to_path_buf();
        std::fs::write(&path, b"{oops").unwrap();

        assert!(repo.create_chirp("x", 1).unwrap_err().is_decode());
        assert!(repo.get_chirps().unwrap_err().is_decode());
        // 解码失败时文件保持原样
        assert_eq!(std::fs::read(&path).unwrap(), b"{oops");
    }

    #[test]
    fn create_never_overwrites_gapped_id() {
        let repo = fresh("gapped");
        let path = repo.database().path().to_path_buf();
        let raw = br#"{"chirps":{"1":{"id":1,"body":"a","author_id":1},"3":{"id":3,"body":"c","author_id":1}}}"#;
        std::fs::write(&path, raw).unwrap();

        let err = repo.create_chirp("new", 2).unwrap_err();
        assert!(matches!(err, DbError::IdInUse(3)));
        assert_eq!(repo.get_chirp(3).unwrap().body, "c");
        assert_eq!(std::fs::read(&path).unwrap(), raw);
    }

    #[test]
    fn stats_counts_authors() {
        let repo = fresh("stats");
        repo.create_chirp("a", 1).unwrap();
        repo.create_chirp("b", 1).unwrap();
        repo.create_chirp("c", 2).unwrap();

        let r = repo.stats().unwrap();
        assert_eq!(r.chirp_count, 3);
        assert_eq!(r.author_count, 2);
        assert_eq!(r.next_id, 4);
        assert!(r.file_bytes > 0);
    }
}
