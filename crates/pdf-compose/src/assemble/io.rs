//! Output file I/O

use crate::types::*;
use std::path::Path;

/// Write a finished document to `path`.
///
/// Bytes go to a sibling temporary file that is renamed into place, so a
/// failed write never leaves a truncated document behind.
pub async fn save_pdf(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");

    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    tokio::fs::rename(&partial, path).await?;

    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
