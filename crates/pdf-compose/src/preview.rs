use crate::assemble::save_pdf;
use crate::types::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

static NEXT_PREVIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a preview buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(pub u64);

/// Revocable handle to an assembled document held in memory.
///
/// Clones share the same buffer. Once revoked, every clone reports
/// `ComposeError::PreviewRevoked` and the bytes are released.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    id: PreviewId,
    filename: String,
    page_count: usize,
    buffer: Arc<RwLock<Option<Arc<[u8]>>>>,
}

impl PreviewHandle {
    pub(crate) fn new(filename: String, page_count: usize, bytes: Vec<u8>) -> Self {
        Self {
            id: PreviewId(NEXT_PREVIEW_ID.fetch_add(1, Ordering::SeqCst)),
            filename,
            page_count,
            buffer: Arc::new(RwLock::new(Some(bytes.into()))),
        }
    }

    pub fn id(&self) -> PreviewId {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The document bytes, shared rather than copied
    pub fn bytes(&self) -> Result<Arc<[u8]>> {
        let guard = self
            .buffer
            .read()
            .map_err(|_| ComposeError::PreviewRevoked)?;
        guard.clone().ok_or(ComposeError::PreviewRevoked)
    }

    pub fn is_revoked(&self) -> bool {
        self.buffer.read().map(|b| b.is_none()).unwrap_or(true)
    }

    /// Release the buffer. Idempotent.
    pub fn revoke(&self) {
        if let Ok(mut guard) = self.buffer.write() {
            if guard.take().is_some() {
                log::debug!("Revoked preview {:?}", self.id);
            }
        }
    }

    /// Write the previewed bytes to `dir/<filename>` without re-assembling
    pub async fn download(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let bytes = self.bytes()?;
        let path = dir.as_ref().join(&self.filename);
        save_pdf(&bytes, &path).await?;
        Ok(path)
    }
}
