use crate::domain::model::VerifiedVoter;
use crate::domain::ports::SessionStore;
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 記憶體內的工作階段，對應瀏覽器的 sessionStorage
#[derive(Debug, Clone, Default)]
pub struct InMemorySession {
    voter: Arc<Mutex<Option<VerifiedVoter>>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voter(voter: VerifiedVoter) -> Self {
        Self {
            voter: Arc::new(Mutex::new(Some(voter))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<VerifiedVoter>> {
        // 鎖中毒時仍沿用原本的資料
        self.voter.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for InMemorySession {
    async fn load(&self) -> Result<Option<VerifiedVoter>> {
        Ok(self.slot().clone())
    }

    async fn save(&self, voter: &VerifiedVoter) -> Result<()> {
        *self.slot() = Some(voter.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// 以 JSON 檔案保存的工作階段，讓 CLI 的多次呼叫共用同一位選民
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SessionStore for FileSession {
    async fn load(&self) -> Result<Option<VerifiedVoter>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, voter: &VerifiedVoter) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_vec_pretty(voter)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
