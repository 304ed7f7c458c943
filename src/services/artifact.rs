//! 临时图片目录
//!
//! 每次绘图请求分配一个随机命名的目录，图片写入其中并通过静态路径对外提供。
//! 回复送出后调用 `release`，目录在延迟之后由后台任务删除，
//! 留出时间让 LINE 平台取图。

use crate::errors::Result;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

/// 目录编号取值范围 [0, ARTIFACT_ID_SPACE)
pub const ARTIFACT_ID_SPACE: u32 = 10_000_000;

/// 一次请求独占的临时目录
///
/// 不可复制；`ArtifactStore::release` 取走所有权，保证每个目录只清理一次
#[derive(Debug)]
pub struct ArtifactHandle {
    id: u32,
    base_path: PathBuf,
    /// 对外路径，如 `/static/1234567/`
    url_path: String,
}

impl ArtifactHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 本地目录
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}{}", self.url_path, name)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    url_prefix: String,
    cleanup_delay: Duration,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str, cleanup_delay: Duration) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            cleanup_delay,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 分配新目录
    ///
    /// 先跳过已存在的编号，再用非递归建目录；并发请求抢到同一编号时
    /// 后到者会得到 `AlreadyExists`，换一个编号重试
    pub async fn allocate(&self) -> Result<ArtifactHandle> {
        tokio::fs::create_dir_all(&self.root).await?;

        loop {
            let id = rand::rng().random_range(0..ARTIFACT_ID_SPACE);
            let base_path = self.root.join(id.to_string());

            if tokio::fs::try_exists(&base_path).await? {
                log::debug!("临时目录 {} 已存在，重新选号", id);
                continue;
            }

            match tokio::fs::create_dir(&base_path).await {
                Ok(()) => {
                    log::debug!("分配临时目录 {}", base_path.display());
                    return Ok(ArtifactHandle {
                        id,
                        base_path,
                        url_path: format!("{}/{}/", self.url_prefix, id),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    log::debug!("临时目录 {} 被并发请求抢先建立，重新选号", id);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 清除上次运行遗留的编号目录
    ///
    /// 进程退出时尚未执行的延迟清理会丢失，启动时统一补删；非编号命名的项目不动
    pub async fn sweep_stale(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let numbered = name
                .to_str()
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
            if !numbered || !entry.file_type().await?.is_dir() {
                continue;
            }
            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("清除遗留目录 {} 失败: {}", entry.path().display(), e),
            }
        }

        if removed > 0 {
            log::info!("🧹 清除 {} 个遗留临时目录", removed);
        }
        Ok(removed)
    }

    /// 延迟删除目录，不阻塞调用方
    ///
    /// 目录已不存在或删除失败都只记录日志。返回的 `JoinHandle` 可忽略。
    pub fn release(&self, handle: ArtifactHandle) -> JoinHandle<()> {
        let delay = self.cleanup_delay;
        let path = handle.base_path;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match tokio::fs::remove_dir_all(&path).await {
                Ok(()) => log::debug!("已清理临时目录 {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!("临时目录 {} 已不存在", path.display())
                }
                Err(e) => log::warn!("清理临时目录 {} 失败: {}", path.display(), e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn store(root: &Path, delay: Duration) -> ArtifactStore {
        ArtifactStore::new(root.join("static"), "/static/", delay)
    }

    #[tokio::test]
    async fn test_allocate_creates_directory() {
        println!("\n========== 测试临时目录分配 ==========");
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), Duration::from_secs(60));

        let handle = store.allocate().await.unwrap();
        println!("  编号: {} 路径: {}", handle.id(), handle.base_path().display());

        assert!(handle.id() < ARTIFACT_ID_SPACE);
        assert!(handle.base_path().is_dir());
        assert_eq!(handle.url_for("plot.jpg"), format!("/static/{}/plot.jpg", handle.id()));
        assert_eq!(handle.file_path("plot.jpg"), handle.base_path().join("plot.jpg"));
        println!("✅ 临时目录分配测试通过！");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_allocations_are_unique() {
        println!("\n========== 测试并发分配唯一性 ==========");
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), Duration::from_secs(60));

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.allocate().await.unwrap() })
            })
            .collect();

        let mut paths = HashSet::new();
        for handle in futures::future::join_all(tasks).await {
            let handle = handle.unwrap();
            assert!(paths.insert(handle.base_path().to_path_buf()));
        }
        assert_eq!(paths.len(), 64);
        println!("✅ 并发分配唯一性测试通过！");
    }

    #[tokio::test]
    async fn test_release_removes_non_empty_directory_after_delay() {
        println!("\n========== 测试延迟清理 ==========");
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), Duration::from_millis(200));

        let handle = store.allocate().await.unwrap();
        let dir = handle.base_path().to_path_buf();
        std::fs::write(handle.file_path("plot.jpg"), b"jpeg").unwrap();

        let cleanup = store.release(handle);
        // release 立即返回，目录仍在
        assert!(dir.exists());

        cleanup.await.unwrap();
        assert!(!dir.exists());
        println!("✅ 延迟清理测试通过！");
    }

    #[tokio::test]
    async fn test_sweep_removes_leftover_directories() {
        println!("\n========== 测试启动时清除遗留目录 ==========");
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), Duration::from_secs(60));
        let root = store.root().to_path_buf();

        // 根目录不存在时无事可做
        assert_eq!(store.sweep_stale().await.unwrap(), 0);

        std::fs::create_dir_all(root.join("1234567")).unwrap();
        std::fs::write(root.join("1234567").join("plot.jpg"), b"jpeg").unwrap();
        std::fs::create_dir_all(root.join("42")).unwrap();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("999"), b"not a directory").unwrap();

        let removed = store.sweep_stale().await.unwrap();
        println!("  清除 {} 个目录", removed);
        assert_eq!(removed, 2);
        assert!(!root.join("1234567").exists());
        assert!(!root.join("42").exists());
        assert!(root.join("assets").is_dir());
        assert!(root.join("999").is_file());
        println!("✅ 启动时清除遗留目录测试通过！");
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), Duration::from_millis(10));

        let handle = store.allocate().await.unwrap();
        std::fs::remove_dir_all(handle.base_path()).unwrap();

        store.release(handle).await.unwrap();
    }
}
