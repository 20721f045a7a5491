//! Read-only inventory of a container's folder tree.

use serde::Serialize;

use crate::container::MailFolder;
use crate::error::Result;
use crate::traverse::ExclusionList;

/// One folder in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderNode {
    pub name: String,
    pub messages: usize,
    /// Whether a report run would skip this folder's own messages.
    pub excluded: bool,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Messages in this folder and all folders below it.
    pub fn total_messages(&self) -> usize {
        self.messages + self.children.iter().map(FolderNode::total_messages).sum::<usize>()
    }

    /// Number of folders below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Render as an indented tree, one folder per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.name);
        out.push_str(&format!(" ({})", self.messages));
        if self.excluded {
            out.push_str(" [excluded]");
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

/// Build the inventory of `folder` and everything below it.
///
/// Message handles are counted, not projected.
pub fn inventory<F: MailFolder>(folder: &F, exclusions: &ExclusionList) -> Result<FolderNode> {
    let name = folder.name()?;
    let mut children = Vec::new();
    if folder.number_of_sub_folders()? > 0 {
        for child in folder.sub_folders()? {
            children.push(inventory(&child, exclusions)?);
        }
    }
    Ok(FolderNode {
        excluded: exclusions.contains(&name),
        messages: folder.sub_messages()?.len(),
        name,
        children,
    })
}
