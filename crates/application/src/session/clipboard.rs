//! Cut/copy/paste of collection nodes.

use httpiness_domain::collection::{CollectionTree, NodeId};
use httpiness_domain::document::NodeDocument;
use httpiness_domain::{DomainError, DomainResult};
use tracing::debug;

/// Holds one exported subtree. Pasting works across collections since the
/// content is kept as a document, not as arena handles.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<NodeDocument>,
}

impl Clipboard {
    /// Creates an empty clipboard.
    #[must_use]
    pub const fn new() -> Self {
        Self { content: None }
    }

    /// Returns true if nothing has been copied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// The current content.
    #[must_use]
    pub const fn content(&self) -> Option<&NodeDocument> {
        self.content.as_ref()
    }

    /// Drops the content.
    pub fn clear(&mut self) {
        self.content = None;
    }

    /// Copies a subtree.
    ///
    /// # Errors
    /// `RootNode` for the root, `NodeNotFound` for a dead handle.
    pub fn copy(&mut self, tree: &CollectionTree, node: NodeId) -> DomainResult<()> {
        if node == tree.root() {
            return Err(DomainError::RootNode);
        }
        let document = tree
            .export_node(node)
            .ok_or(DomainError::NodeNotFound(node))?;
        debug!(name = document.name(), "copied to clipboard");
        self.content = Some(document);
        Ok(())
    }

    /// Copies a subtree, then removes and frees it.
    ///
    /// # Errors
    /// See [`Clipboard::copy`]; also fails for a detached node.
    pub fn cut(&mut self, tree: &mut CollectionTree, node: NodeId) -> DomainResult<()> {
        self.copy(tree, node)?;
        tree.delete(node)
    }

    /// Pastes the content under `parent`. If the name is taken the pasted
    /// node is renamed `"<name> copy"`, then `"<name> copy 2"` and so on.
    ///
    /// Returns `None` when the clipboard is empty.
    ///
    /// # Errors
    /// `NotADirectory` if `parent` is not a directory.
    pub fn paste(
        &self,
        tree: &mut CollectionTree,
        parent: NodeId,
    ) -> DomainResult<Option<NodeId>> {
        let Some(content) = &self.content else {
            return Ok(None);
        };
        tree.directory(parent)?;
        let mut document = content.clone();
        let name = free_name(tree, parent, document.name());
        document.set_name(name);
        tree.import_node(parent, document).map(Some)
    }
}

fn free_name(tree: &CollectionTree, parent: NodeId, name: &str) -> String {
    if !tree.has_child_named(parent, name) {
        return name.to_string();
    }
    let mut candidate = format!("{name} copy");
    let mut n = 2;
    while tree.has_child_named(parent, &candidate) {
        candidate = format!("{name} copy {n}");
        n += 1;
    }
    candidate
}
