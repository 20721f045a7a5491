//! Whole-file operations: open a container, then walk or inventory it.

use std::path::Path;

use tracing::debug;

use crate::container::loader::{self, ContainerKind, ContainerVisitor};
use crate::container::MailContainer;
use crate::error::Result;
use crate::export::FolderExporter;
use crate::inventory::{inventory, FolderNode};
use crate::traverse::{ExclusionList, Traversal, TraversalSummary};

/// Write the reports for every folder of the container at `path`.
///
/// The container is closed before this returns.
pub fn export_file(
    path: &Path,
    kind: ContainerKind,
    traversal: &Traversal,
    exporter: &FolderExporter,
    progress: &dyn Fn(&str),
) -> Result<TraversalSummary> {
    let container = loader::open(path, kind)?;
    debug!(path = %path.display(), kind = %container.kind(), "Container opened");
    container.accept(ExportRun {
        traversal,
        exporter,
        progress,
    })
}

/// Build the folder inventory of the container at `path`.
pub fn inventory_file(
    path: &Path,
    kind: ContainerKind,
    exclusions: &ExclusionList,
) -> Result<FolderNode> {
    let container = loader::open(path, kind)?;
    container.accept(InventoryRun { exclusions })
}

/// Traversal plus export, runnable against any backend.
pub struct ExportRun<'a> {
    pub traversal: &'a Traversal,
    pub exporter: &'a FolderExporter,
    pub progress: &'a dyn Fn(&str),
}

impl ContainerVisitor for ExportRun<'_> {
    type Output = TraversalSummary;

    fn visit<C: MailContainer>(self, container: &C) -> Result<Self::Output> {
        let root = container.root_folder()?;
        self.traversal.run(&root, self.exporter, self.progress)
    }
}

/// Inventory, runnable against any backend.
pub struct InventoryRun<'a> {
    pub exclusions: &'a ExclusionList,
}

impl ContainerVisitor for InventoryRun<'_> {
    type Output = FolderNode;

    fn visit<C: MailContainer>(self, container: &C) -> Result<Self::Output> {
        inventory(&container.root_folder()?, self.exclusions)
    }
}
