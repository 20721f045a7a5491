//! Depth-first walk of the folder tree, exporting one folder at a time.
//!
//! For every child of the starting folder, its own sub-folders are walked
//! first and then its messages are exported. The starting folder itself is
//! the store root and has no report of its own.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::container::MailFolder;
use crate::error::Result;
use crate::export::{ExportOutcome, FolderExporter};
use crate::model::record::MessageRecord;

/// Folder names skipped by default: system, trash, junk and calendar folders.
pub const DEFAULT_EXCLUDED_FOLDERS: [&str; 6] = [
    "Deleted Items",
    "Detected Items",
    "Calendar",
    "Junk Email",
    "Recipient Cache",
    "חגים בישראל",
];

/// Folder names whose own messages are never exported. Matching is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionList {
    names: BTreeSet<String>,
}

impl ExclusionList {
    /// No folder is excluded.
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }
}

impl Default for ExclusionList {
    fn default() -> Self {
        DEFAULT_EXCLUDED_FOLDERS.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraversalSummary {
    pub folders_visited: usize,
    pub folders_exported: usize,
    pub folders_excluded: usize,
    /// Folders processed without producing files.
    pub folders_empty: usize,
    pub messages: usize,
    pub messages_with_body: usize,
    pub files_written: usize,
    pub bytes_written: u64,
    /// One entry per processed (non-excluded) folder, in processing order.
    pub outcomes: Vec<ExportOutcome>,
}

impl TraversalSummary {
    fn record(&mut self, outcome: ExportOutcome) {
        self.messages += outcome.messages;
        self.messages_with_body += outcome.with_body;
        self.files_written += outcome.files_written();
        self.bytes_written += outcome.bytes_written;
        if outcome.files_written() > 0 {
            self.folders_exported += 1;
        } else {
            self.folders_empty += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Traversal settings.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    exclusions: ExclusionList,
    skip_excluded_children: bool,
}

impl Traversal {
    /// `skip_excluded_children = false` still walks into an excluded
    /// folder's sub-folders and only skips the excluded folder's own
    /// messages. `true` prunes the whole subtree.
    pub fn new(exclusions: ExclusionList, skip_excluded_children: bool) -> Self {
        Self {
            exclusions,
            skip_excluded_children,
        }
    }

    /// Walk everything below `base`.
    ///
    /// `progress` is called with each folder name right before its messages
    /// are read. The first error stops the walk.
    pub fn run<F: MailFolder>(
        &self,
        base: &F,
        exporter: &FolderExporter,
        progress: &dyn Fn(&str),
    ) -> Result<TraversalSummary> {
        let mut summary = TraversalSummary::default();
        self.walk(base, exporter, progress, &mut summary, 0)?;
        info!(
            folders = summary.folders_visited,
            exported = summary.folders_exported,
            messages = summary.messages,
            "Traversal complete"
        );
        Ok(summary)
    }

    fn walk<F: MailFolder>(
        &self,
        base: &F,
        exporter: &FolderExporter,
        progress: &dyn Fn(&str),
        summary: &mut TraversalSummary,
        depth: usize,
    ) -> Result<()> {
        for folder in base.sub_folders()? {
            let name = folder.name()?;
            let excluded = self.exclusions.contains(&name);
            summary.folders_visited += 1;

            if folder.number_of_sub_folders()? > 0 {
                if excluded && self.skip_excluded_children {
                    debug!(folder = %name, depth, "Not descending into excluded folder");
                } else {
                    self.walk(&folder, exporter, progress, summary, depth + 1)?;
                }
            }

            if excluded {
                debug!(folder = %name, "Skipping excluded folder");
                summary.folders_excluded += 1;
                continue;
            }

            info!(folder = %name, depth, "Processing folder");
            progress(&name);
            let records = project_messages(&folder)?;
            summary.record(exporter.export(records, &name)?);
        }
        Ok(())
    }
}

/// Project every message of `folder`, in order.
pub fn project_messages<F: MailFolder>(folder: &F) -> Result<Vec<MessageRecord>> {
    folder
        .sub_messages()?
        .iter()
        .map(MessageRecord::project)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::container::memory::{MemoryContainer, MemoryFolder, MemoryMessage};
    use crate::container::MailContainer;
    use crate::export::OutputLayout;

    fn run(
        container: &MemoryContainer,
        traversal: &Traversal,
        dir: &std::path::Path,
    ) -> (TraversalSummary, Vec<String>) {
        let exporter = FolderExporter::with_layout(OutputLayout::new(dir, true).unwrap());
        let seen = RefCell::new(Vec::new());
        let root = container.root_folder().unwrap();
        let summary = traversal
            .run(&root, &exporter, &|name| seen.borrow_mut().push(name.to_string()))
            .unwrap();
        (summary, seen.into_inner())
    }

    #[test]
    fn test_children_before_parent() {
        let container = MemoryContainer::new(
            MemoryFolder::new("Root")
                .with_folder(
                    MemoryFolder::new("Inbox")
                        .with_folder(
                            MemoryFolder::new("Projects").with_folder(MemoryFolder::new("Alpha")),
                        )
                        .with_folder(MemoryFolder::new("Receipts")),
                )
                .with_folder(MemoryFolder::new("Sent Items")),
        );
        let tmp = tempfile::tempdir().unwrap();
        let (summary, order) = run(&container, &Traversal::default(), tmp.path());
        assert_eq!(
            order,
            ["Alpha", "Projects", "Receipts", "Inbox", "Sent Items"]
        );
        assert_eq!(summary.folders_visited, 5);
        assert_eq!(summary.folders_empty, 5);
        assert_eq!(summary.files_written, 0);
    }

    #[test]
    fn test_excluded_folder_children_still_walked() {
        let container = MemoryContainer::new(
            MemoryFolder::new("Root").with_folder(
                MemoryFolder::new("Deleted Items")
                    .with_message(MemoryMessage::with_body("gone"))
                    .with_folder(
                        MemoryFolder::new("Old").with_message(MemoryMessage::with_body("kept")),
                    ),
            ),
        );
        let tmp = tempfile::tempdir().unwrap();
        let (summary, order) = run(&container, &Traversal::default(), tmp.path());
        assert_eq!(order, ["Old"]);
        assert_eq!(summary.folders_excluded, 1);
        assert_eq!(summary.folders_exported, 1);
        assert!(tmp.path().join("folder_report_Old.csv").exists());
        assert!(!tmp.path().join("folder_report_Deleted Items.csv").exists());
    }

    #[test]
    fn test_skip_excluded_children() {
        let container = MemoryContainer::new(
            MemoryFolder::new("Root").with_folder(
                MemoryFolder::new("Deleted Items")
                    .with_folder(
                        MemoryFolder::new("Old").with_message(MemoryMessage::with_body("x")),
                    ),
            ),
        );
        let tmp = tempfile::tempdir().unwrap();
        let traversal = Traversal::new(ExclusionList::default(), true);
        let (summary, order) = run(&container, &traversal, tmp.path());
        assert!(order.is_empty());
        assert_eq!(summary.folders_visited, 1);
        assert_eq!(summary.files_written, 0);
    }

    #[test]
    fn test_outcomes_cover_folders_without_bodies() {
        let container = MemoryContainer::new(
            MemoryFolder::new("Root")
                .with_folder(MemoryFolder::new("Drafts").with_message(MemoryMessage::without_body()))
                .with_folder(MemoryFolder::new("Outbox"))
                .with_folder(MemoryFolder::new("Inbox").with_message(MemoryMessage::with_body("hi"))),
        );
        let tmp = tempfile::tempdir().unwrap();
        let (summary, _) = run(&container, &Traversal::default(), tmp.path());

        let counts: Vec<(&str, usize, usize)> = summary
            .outcomes
            .iter()
            .map(|o| (o.folder.as_str(), o.messages, o.with_body))
            .collect();
        assert_eq!(counts, [("Drafts", 1, 0), ("Outbox", 0, 0), ("Inbox", 1, 1)]);
        assert_eq!(summary.folders_empty, 2);
    }

    #[test]
    fn test_exclusion_is_exact_match() {
        let list = ExclusionList::default();
        assert!(list.contains("Junk Email"));
        assert!(!list.contains("junk email"));
        assert!(!list.contains("Junk Email "));
        assert!(list.contains("חגים בישראל"));

        let custom: ExclusionList = ["Archive"].into_iter().collect();
        assert!(custom.contains("Archive"));
        assert!(!custom.contains("Calendar"));
    }

    #[test]
    fn test_root_messages_not_exported() {
        let container = MemoryContainer::new(
            MemoryFolder::new("Root").with_message(MemoryMessage::with_body("top")),
        );
        let tmp = tempfile::tempdir().unwrap();
        let (summary, order) = run(&container, &Traversal::default(), tmp.path());
        assert!(order.is_empty());
        assert_eq!(summary.folders_visited, 0);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
