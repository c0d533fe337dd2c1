use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::Snapshot;
use crate::error::{DbError, Result};

#[derive(Clone, Copy, Debug)]
pub struct DatabaseOptions {
    /// rename 前 fsync(tmp)，rename 后 fsync(dir)
    pub sync: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self { sync: true }
    }
}

/// 整文件快照存储（load / mutate / persist）
///
/// 并发约束：
/// - 所有 load / store / update 共用同一把互斥锁，锁覆盖整个读或写过程（不只是字节 I/O）
/// - 没有独立的读锁路径：快照必须完整反序列化后才能放锁
/// - `update` 在一次持锁内完成 load -> 修改 -> store，写操作不会互相覆盖
///
/// 落盘流程（atomic replacement）：
/// 1) 序列化到 `<file>.tmp`
/// 2) fsync(tmpfile)
/// 3) rename(tmp, target) — POSIX 保证原子性
/// 4) fsync(dir)
///
/// 任何时刻读者看到的要么是旧快照，要么是新快照，不会是半截文件。
pub struct Database {
    path: PathBuf,
    opts: DatabaseOptions,
    lock: Mutex<()>,
}

impl Database {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, DatabaseOptions::default())
    }

    /// 打开数据库；文件不存在则立即写入空快照。已存在的文件不做任何读取或校验。
    pub fn open_with(path: impl Into<PathBuf>, opts: DatabaseOptions) -> Result<Self> {
        let db = Self {
            path: path.into(),
            opts,
            lock: Mutex::new(()),
        };
        db.ensure()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure(&self) -> Result<()> {
        match fs::metadata(&self.path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let _guard = self.lock.lock();
                self.write_unlocked(&Snapshot::empty())?;
                tracing::info!("Bootstrapped empty database at {:?}", self.path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 读取完整快照。返回值是独立副本，调用方可随意修改。
    pub fn load(&self) -> Result<Snapshot> {
        let _guard = self.lock.lock();
        self.read_unlocked()
    }

    /// 原子写入完整快照
    pub fn store(&self, snap: &Snapshot) -> Result<()> {
        let _guard = self.lock.lock();
        self.write_unlocked(snap)
    }

    /// 持锁执行 read-modify-write。
    ///
    /// `f` 返回 `Err` 时不落盘，文件保持原样。
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let _guard = self.lock.lock();
        let mut snap = self.read_unlocked()?;
        let out = f(&mut snap)?;
        self.write_unlocked(&snap)?;
        Ok(out)
    }

    /// 当前文件大小（字节）
    pub fn file_size(&self) -> Result<u64> {
        let _guard = self.lock.lock();
        match fs::metadata(&self.path) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DbError::NotExist),
            Err(e) => Err(e.into()),
        }
    }

    fn read_unlocked(&self) -> Result<Snapshot> {
        let data = match fs::read(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(DbError::NotExist),
            Err(e) => return Err(e.into()),
        };
        Snapshot::decode(&data)
    }

    fn write_unlocked(&self, snap: &Snapshot) -> Result<()> {
        let data = snap.encode()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.tmp_path();
        {
            let mut file = open_tmp(&tmp_path)?;
            file.write_all(&data)?;
            if self.opts.sync {
                file.sync_all()?;
            }
        }

        fs::rename(&tmp_path, &self.path)?;

        if self.opts.sync {
            if let Some(parent) = self.path.parent() {
                let dir = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                // 部分平台不支持对目录 fsync，忽略失败
                if let Ok(dir) = File::open(dir) {
                    let _ = dir.sync_all();
                }
            }
        }

        tracing::debug!(
            "Snapshot written: {} chirps, {} bytes",
            snap.len(),
            data.len()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "database.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// 以 0600 新建 tmp 文件；残留的旧 tmp 先删除，避免沿用其权限
fn open_tmp(path: &Path) -> io::Result<File> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)
}
