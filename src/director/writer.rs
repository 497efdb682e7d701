//! Atomic file finalization: write to `<name>.part`, then rename.

use bytes::Bytes;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Removes the temp file when dropped before [`PartialFile::commit`].
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn write_then_rename(final_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp = temp_path(final_path);
    let guard = PartialFile::new(temp.clone());

    fs::write(&temp, bytes)?;
    fs::rename(&temp, final_path)?;

    guard.commit();
    Ok(())
}

/// Writes `bytes` to `final_path` so that the final path either does not
/// exist or holds the complete body.
///
/// The blocking write runs to completion even if the caller is dropped, so
/// cancellation never strands a `.part` file.
pub async fn write_atomic(final_path: PathBuf, bytes: Bytes) -> io::Result<()> {
    tokio::task::spawn_blocking(move || write_then_rename(&final_path, &bytes))
        .await
        .map_err(io::Error::other)?
}
