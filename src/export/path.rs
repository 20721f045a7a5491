//! Output file locations.

use std::path::{Path, PathBuf};

use crate::error::{PstError, Result};

/// Default output directory name, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Where report files go and how folder names become file names.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    dir: PathBuf,
    sanitize: bool,
}

impl OutputLayout {
    /// Layout rooted at `dir`. A relative `dir` is resolved against the
    /// current working directory.
    pub fn new(dir: impl AsRef<Path>, sanitize: bool) -> Result<Self> {
        let dir = dir.as_ref();
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| PstError::io(dir, e))?
                .join(dir)
        };
        Ok(Self { dir, sanitize })
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute path of `file_name` inside the output directory.
    ///
    /// Creates the directory (and parents) if missing. `file_name` is used
    /// as given.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PstError::io(&self.dir, e))?;
        Ok(self.dir.join(file_name))
    }

    /// `folder_report_<folder>.csv`
    pub fn report_path(&self, folder_name: &str) -> Result<PathBuf> {
        self.resolve(&format!("folder_report_{}.csv", self.file_part(folder_name)))
    }

    /// `message_body_<folder>.txt`
    pub fn body_dump_path(&self, folder_name: &str) -> Result<PathBuf> {
        self.resolve(&format!("message_body_{}.txt", self.file_part(folder_name)))
    }

    fn file_part(&self, folder_name: &str) -> String {
        if self.sanitize {
            sanitize_folder_name(folder_name)
        } else {
            folder_name.to_string()
        }
    }
}

/// Longest sanitized folder name, in bytes. Leaves room for the
/// `folder_report_` prefix and extension within a 255-byte file name.
pub const MAX_FOLDER_NAME_BYTES: usize = 200;

/// Make a folder name safe to embed in a file name.
///
/// Path separators, characters reserved on Windows and control characters
/// become `_`. Everything else (spaces, non-ASCII letters) is kept. The
/// result is cut at a character boundary to at most
/// [`MAX_FOLDER_NAME_BYTES`] bytes.
pub fn sanitize_folder_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len().min(MAX_FOLDER_NAME_BYTES));
    for c in name.chars() {
        let c = match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        };
        if sanitized.len() + c.len_utf8() > MAX_FOLDER_NAME_BYTES {
            break;
        }
        sanitized.push(c);
    }

    match sanitized.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => sanitized,
    }
}
