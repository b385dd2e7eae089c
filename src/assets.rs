use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

// Uploads are routed by declared content type: videos into content/mov,
// everything else (images included) into content/img.
pub fn destination_for(content_type: &str) -> &'static str {
    if content_type.starts_with("video/") {
        "content/mov"
    } else {
        "content/img"
    }
}

/// Strips any path components from a client-supplied filename and replaces
/// whitespace with underscores.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();
    if base.is_empty() {
        return "upload".to_string();
    }
    base.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

// Reserves a final filename with create_new so two uploads landing in the
// same millisecond with the same sanitized name still get distinct files.
async fn reserve_target(dir: &Path, stem: &str) -> io::Result<(PathBuf, String)> {
    let ts = epoch_millis();
    for attempt in 0u32..1000 {
        let name = if attempt == 0 {
            format!("{}_{}", ts, stem)
        } else {
            format!("{}-{}_{}", ts, attempt, stem)
        };
        let path = dir.join(&name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => return Ok((path, name)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "could not reserve a unique upload filename",
    ))
}

/// An asset being written under `<root>/<subdir>` as
/// `<epoch-ms>_<sanitized name>`. Content is streamed chunk-by-chunk into a
/// dot-prefixed temp file and renamed over the reservation on commit, so a
/// partially-written upload is never visible under its final name and large
/// files are never held in memory whole.
pub struct PendingAsset {
    subdir: String,
    final_path: PathBuf,
    final_name: String,
    tmp_path: PathBuf,
    file: tokio::fs::File,
}

impl PendingAsset {
    pub async fn create(root: &Path, subdir: &str, original_name: &str) -> io::Result<Self> {
        let dir = root.join(subdir);
        tokio::fs::create_dir_all(&dir).await?;

        let stem = sanitize_filename(original_name);
        let (final_path, final_name) = reserve_target(&dir, &stem).await?;

        let tmp_path = dir.join(format!(".{}.tmp", final_name));
        let file = match tokio::fs::File::create(&tmp_path).await {
            Ok(f) => f,
            Err(e) => {
                let _ = tokio::fs::remove_file(&final_path).await;
                return Err(e);
            }
        };

        Ok(PendingAsset {
            subdir: subdir.to_string(),
            final_path,
            final_name,
            tmp_path,
            file,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.file.write_all(chunk).await
    }

    /// Moves the temp file under its final name and returns the relative
    /// path. Leaves nothing behind on failure.
    pub async fn commit(self) -> io::Result<String> {
        use tokio::io::AsyncWriteExt;
        let PendingAsset {
            subdir,
            final_path,
            final_name,
            tmp_path,
            mut file,
        } = self;

        let flushed = file.flush().await;
        // close the handle before the rename
        drop(file);
        let moved = match flushed {
            Ok(()) => tokio::fs::rename(&tmp_path, &final_path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = moved {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            let _ = tokio::fs::remove_file(&final_path).await;
            return Err(e);
        }

        Ok(format!("{}/{}", subdir, final_name))
    }

    /// Abandons the upload, removing the temp file and the name reservation.
    pub async fn discard(self) {
        let PendingAsset {
            final_path,
            tmp_path,
            file,
            ..
        } = self;
        drop(file);
        let _ = tokio::fs::remove_file(&tmp_path).await;
        let _ = tokio::fs::remove_file(&final_path).await;
    }
}

/// One-shot convenience over [`PendingAsset`] for content already in memory.
pub async fn store_file(
    root: &Path,
    subdir: &str,
    original_name: &str,
    data: &[u8],
) -> io::Result<String> {
    let mut pending = PendingAsset::create(root, subdir, original_name).await?;
    if let Err(e) = pending.write_chunk(data).await {
        pending.discard().await;
        return Err(e);
    }
    pending.commit().await
}

/// Removes the asset backing a deleted metadata record. "Already gone" is not
/// an error; any other failure is logged and swallowed, the metadata delete
/// has already succeeded.
pub async fn remove_asset(root: &Path, src: &str) {
    if src.starts_with('/') || src.contains("..") {
        tracing::warn!("refusing to remove asset outside the static root: {}", src);
        return;
    }
    let path = root.join(src);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("failed to remove asset {}: {}", path.display(), e);
        }
    }
}
