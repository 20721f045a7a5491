//! Open a container file and hand it to the matching backend.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use crate::error::{PstError, Result};

use super::memory::MemoryContainer;
use super::MailContainer;

/// Magic bytes at the start of every PST/OST file.
const PST_MAGIC: &[u8; 4] = b"!BDN";

/// Which backend reads the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKind {
    /// Pick by file extension, then by content.
    #[default]
    Auto,
    /// JSON snapshot of a folder tree.
    Snapshot,
    /// Native PST/OST file.
    Pst,
}

impl FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "snapshot" | "json" => Ok(Self::Snapshot),
            "pst" | "ost" => Ok(Self::Pst),
            other => Err(format!(
                "unknown container kind '{other}' (expected auto, snapshot, pst)"
            )),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Snapshot => "snapshot",
            Self::Pst => "pst",
        };
        f.write_str(s)
    }
}

/// A container opened by one of the available backends.
pub enum LoadedContainer {
    Snapshot(MemoryContainer),
    #[cfg(feature = "pst")]
    Pst(super::pst::PstContainer),
}

/// Operation that runs against any backend.
pub trait ContainerVisitor {
    type Output;

    fn visit<C: MailContainer>(self, container: &C) -> Result<Self::Output>;
}

impl LoadedContainer {
    /// Run `visitor` against the concrete backend.
    pub fn accept<V: ContainerVisitor>(&self, visitor: V) -> Result<V::Output> {
        match self {
            Self::Snapshot(c) => visitor.visit(c),
            #[cfg(feature = "pst")]
            Self::Pst(c) => visitor.visit(c),
        }
    }

    /// Backend name, for logs.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Snapshot(_) => ContainerKind::Snapshot,
            #[cfg(feature = "pst")]
            Self::Pst(_) => ContainerKind::Pst,
        }
    }
}

/// Open the container at `path`.
///
/// The file is opened read-only in binary mode. Every handle opened here is
/// closed before this function returns, on success and on error.
pub fn open(path: &Path, kind: ContainerKind) -> Result<LoadedContainer> {
    if !path.exists() {
        return Err(PstError::FileNotFound(path.to_path_buf()));
    }

    let kind = match kind {
        ContainerKind::Auto => detect_kind(path)?,
        other => other,
    };
    info!(path = %path.display(), kind = %kind, "Opening container");

    match kind {
        ContainerKind::Snapshot => open_snapshot(path).map(LoadedContainer::Snapshot),
        _ => open_pst(path),
    }
}

/// Read a JSON snapshot.
pub fn open_snapshot(path: &Path) -> Result<MemoryContainer> {
    let file = File::open(path).map_err(|e| PstError::io(path, e))?;
    MemoryContainer::from_reader(BufReader::new(file)).map_err(|e| PstError::InvalidContainer {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(feature = "pst")]
fn open_pst(path: &Path) -> Result<LoadedContainer> {
    super::pst::PstContainer::open(path).map(LoadedContainer::Pst)
}

#[cfg(not(feature = "pst"))]
fn open_pst(path: &Path) -> Result<LoadedContainer> {
    Err(PstError::UnsupportedContainer(format!(
        "{}: native PST/OST reading requires building with `--features pst`",
        path.display()
    )))
}

/// Guess the backend from the extension, falling back to the first bytes.
fn detect_kind(path: &Path) -> Result<ContainerKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => return Ok(ContainerKind::Snapshot),
        Some("pst") | Some("ost") => return Ok(ContainerKind::Pst),
        _ => {}
    }

    let mut head = [0u8; 4];
    let read = File::open(path)
        .and_then(|f| f.take(4).read(&mut head))
        .map_err(|e| PstError::io(path, e))?;
    let head = &head[..read];
    debug!(path = %path.display(), ?head, "Sniffing container type");

    if head == PST_MAGIC {
        Ok(ContainerKind::Pst)
    } else if head.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
        Ok(ContainerKind::Snapshot)
    } else {
        Err(PstError::UnsupportedContainer(path.display().to_string()))
    }
}
