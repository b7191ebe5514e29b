//! Exported key files.
//!
//! Key files hold the raw SPKI/PKCS#8 DER bytes with no extra framing.

use super::{CryptoResult, ExportKey, KeyKind};
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

pub const KEY_FILE_MIME: &str = "application/x-ckey-file";

/// One exported key ready to be saved by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDownload {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl KeyDownload {
    /// Writes the key into `dir` under its file name, replacing any previous
    /// file, and returns the written path.
    pub fn save_into(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name);
        fs::write(&path, &self.bytes)?;
        info!(
            "event=key_file_saved module=crypto status=ok file={} bytes={}",
            self.file_name,
            self.bytes.len()
        );
        Ok(path)
    }
}

impl Drop for KeyDownload {
    fn drop(&mut self) {
        // Private halves travel through this buffer.
        self.bytes.zeroize();
    }
}

/// Exports `which` half of `pair` and packages it as `pub.key`/`priv.key`.
pub fn key_downloader(which: KeyKind, pair: &impl ExportKey) -> CryptoResult<KeyDownload> {
    let file_name = match which {
        KeyKind::Public => "pub.key",
        KeyKind::Private => "priv.key",
    };
    Ok(KeyDownload {
        file_name,
        mime_type: KEY_FILE_MIME,
        bytes: pair.export(which)?,
    })
}
