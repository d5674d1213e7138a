//! Arena-backed collection tree.
//!
//! Nodes are owned by the arena and referenced through [`NodeId`] handles.
//! Ownership flows parent to child through the directory child lists; the
//! `parent` handle of a node is a lookup key only.

use crate::auth::AuthTemplate;
use crate::error::{DomainError, DomainResult};

use super::events::{CollectionEvent, EventHub, SubscriptionId};
use super::node::{AuthBinding, Directory, Node, NodeId, NodeKind, RequestTemplate};

/// Name of the auth a directory's requests inherit when they have no own auth.
pub const DEFAULT_AUTH_NAME: &str = "Default Auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Directory,
    Request,
    Auth,
}

/// A tree of directories, request templates and auth templates.
#[derive(Debug)]
pub struct CollectionTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    dirty: bool,
    events: EventHub,
}

impl CollectionTree {
    /// Creates a tree holding only a root directory.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Node {
            name: root_name.into(),
            parent: None,
            kind: NodeKind::Directory(Directory::default()),
        };
        Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
            dirty: false,
            events: EventHub::default(),
        }
    }

    /// The root directory.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node for `id`, if it is live.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Returns the name of a live node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(Node::name)
    }

    /// Returns the parent handle of a live node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Returns the directory payload of `id`.
    ///
    /// # Errors
    /// `NodeNotFound` or `NotADirectory`.
    pub fn directory(&self, id: NodeId) -> DomainResult<&Directory> {
        self.live(id)?
            .as_directory()
            .ok_or(DomainError::NotADirectory(id))
    }

    /// Returns the request payload of `id`.
    ///
    /// # Errors
    /// `NodeNotFound` or `NotARequest`.
    pub fn request(&self, id: NodeId) -> DomainResult<&RequestTemplate> {
        self.live(id)?
            .as_request()
            .ok_or(DomainError::NotARequest(id))
    }

    /// Returns the auth payload of `id`.
    ///
    /// # Errors
    /// `NodeNotFound` or `NotAnAuth`.
    pub fn auth(&self, id: NodeId) -> DomainResult<&AuthTemplate> {
        self.live(id)?.as_auth().ok_or(DomainError::NotAnAuth(id))
    }

    fn live(&self, id: NodeId) -> DomainResult<&Node> {
        self.node(id).ok_or(DomainError::NodeNotFound(id))
    }

    fn live_mut(&mut self, id: NodeId) -> DomainResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(DomainError::NodeNotFound(id))
    }

    fn directory_mut(&mut self, id: NodeId) -> DomainResult<&mut Directory> {
        match &mut self.live_mut(id)?.kind {
            NodeKind::Directory(dir) => Ok(dir),
            _ => Err(DomainError::NotADirectory(id)),
        }
    }

    fn request_mut(&mut self, id: NodeId) -> DomainResult<&mut RequestTemplate> {
        match &mut self.live_mut(id)?.kind {
            NodeKind::Request(request) => Ok(request),
            _ => Err(DomainError::NotARequest(id)),
        }
    }

    // ------------------------------------------------------------------
    // Dirty tracking and notifications
    // ------------------------------------------------------------------

    /// Returns true if the tree has unsaved changes.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flags the owning collection as needing a save.
    pub fn mark_dirty(&mut self) {
        if !self.dirty {
            self.dirty = true;
            self.events.emit(&CollectionEvent::DirtyChanged { dirty: true });
        }
    }

    /// Clears the dirty flag. Only a successful save should call this.
    pub fn mark_clean(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.events
                .emit(&CollectionEvent::DirtyChanged { dirty: false });
        }
    }

    /// Registers an event handler.
    pub fn subscribe(
        &mut self,
        handler: impl Fn(&CollectionEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    /// Removes an event handler.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Delivers an event to every subscriber.
    pub fn emit(&self, event: &CollectionEvent) {
        self.events.emit(event);
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    fn alloc(&mut self, name: String, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            name,
            parent: None,
            kind,
        }));
        id
    }

    /// Creates a detached, empty directory.
    ///
    /// # Errors
    /// `InvalidName` if the name is empty or contains `/`.
    pub fn create_directory(&mut self, name: impl Into<String>) -> DomainResult<NodeId> {
        let name = validate_name(name.into())?;
        Ok(self.alloc(name, NodeKind::Directory(Directory::default())))
    }

    /// Creates a detached request template.
    ///
    /// # Errors
    /// `InvalidName` if the name is empty or contains `/`.
    pub fn create_request(
        &mut self,
        name: impl Into<String>,
        template: RequestTemplate,
    ) -> DomainResult<NodeId> {
        let name = validate_name(name.into())?;
        let mut template = template;
        // Bindings only make sense for nodes of this arena; embedded auths
        // must be created through `set_embedded_auth`.
        if matches!(template.auth, AuthBinding::Embedded(_)) {
            template.auth = AuthBinding::None;
        }
        Ok(self.alloc(name, NodeKind::Request(template)))
    }

    /// Creates a detached auth template.
    ///
    /// # Errors
    /// `InvalidName` if the name is empty or contains `/`.
    pub fn create_auth(
        &mut self,
        name: impl Into<String>,
        template: AuthTemplate,
    ) -> DomainResult<NodeId> {
        let name = validate_name(name.into())?;
        Ok(self.alloc(name, NodeKind::Auth(template)))
    }

    /// Overwrites the parent handle of `child` without touching child lists.
    ///
    /// # Errors
    /// `NodeNotFound` if `child` is not live.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> DomainResult<()> {
        self.live_mut(child)?.parent = parent;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Add / remove
    // ------------------------------------------------------------------

    /// Returns the child of `parent` named `name`, across all child kinds.
    #[must_use]
    pub fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let dir = self.directory(parent).ok()?;
        dir.children().find(|&c| self.name(c) == Some(name))
    }

    /// Returns true if `parent` already has a child named `name`.
    #[must_use]
    pub fn has_child_named(&self, parent: NodeId, name: &str) -> bool {
        self.child_named(parent, name).is_some()
    }

    fn is_attached(&self, id: NodeId) -> bool {
        self.parent(id)
            .and_then(|p| self.directory(p).ok())
            .is_some_and(|dir| dir.contains(id))
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, slot: Slot) -> DomainResult<()> {
        if child == self.root {
            return Err(DomainError::RootNode);
        }
        let node = self.live(child)?;
        let kind_matches = match slot {
            Slot::Directory => node.as_directory().is_some(),
            Slot::Request => node.as_request().is_some(),
            Slot::Auth => node.as_auth().is_some(),
        };
        if !kind_matches {
            return Err(match slot {
                Slot::Directory => DomainError::NotADirectory(child),
                Slot::Request => DomainError::NotARequest(child),
                Slot::Auth => DomainError::NotAnAuth(child),
            });
        }
        let name = node.name.clone();
        self.directory(parent)?;
        if self.is_attached(child) {
            return Err(DomainError::AlreadyAttached(child));
        }
        if self.has_child_named(parent, &name) {
            return Err(DomainError::DuplicateName(name));
        }
        if slot == Slot::Directory && self.is_ancestor_or_self(child, parent) {
            return Err(DomainError::WouldCreateCycle(child));
        }

        let dir = self.directory_mut(parent)?;
        match slot {
            Slot::Directory => dir.directories.push(child),
            Slot::Request => dir.requests.push(child),
            Slot::Auth => dir.auths.push(child),
        }
        self.live_mut(child)?.parent = Some(parent);
        self.mark_dirty();
        Ok(())
    }

    /// Attaches a detached directory under `parent`.
    ///
    /// # Errors
    /// `DuplicateName` if a sibling of any kind has the same name, plus the
    /// structural errors of a wrong kind, a cycle or an attached child.
    pub fn add_directory(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.attach(parent, child, Slot::Directory)
    }

    /// Attaches a detached request under `parent`.
    ///
    /// # Errors
    /// See [`Self::add_directory`].
    pub fn add_request(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.attach(parent, child, Slot::Request)
    }

    /// Attaches a detached auth under `parent`.
    ///
    /// # Errors
    /// See [`Self::add_directory`].
    pub fn add_auth(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.attach(parent, child, Slot::Auth)
    }

    /// Creates and attaches a directory.
    ///
    /// # Errors
    /// See [`Self::add_directory`].
    pub fn insert_directory(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> DomainResult<NodeId> {
        let id = self.create_directory(name)?;
        self.add_directory(parent, id).inspect_err(|_| self.free(id))?;
        Ok(id)
    }

    /// Creates and attaches a request template.
    ///
    /// # Errors
    /// See [`Self::add_directory`].
    pub fn insert_request(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        template: RequestTemplate,
    ) -> DomainResult<NodeId> {
        let id = self.create_request(name, template)?;
        self.add_request(parent, id).inspect_err(|_| self.free(id))?;
        Ok(id)
    }

    /// Creates and attaches an auth template.
    ///
    /// # Errors
    /// See [`Self::add_directory`].
    pub fn insert_auth(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        template: AuthTemplate,
    ) -> DomainResult<NodeId> {
        let id = self.create_auth(name, template)?;
        self.add_auth(parent, id).inspect_err(|_| self.free(id))?;
        Ok(id)
    }

    fn free(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = None;
        }
    }

    fn detach(&mut self, parent: NodeId, child: NodeId, slot: Slot) -> DomainResult<()> {
        let dir = self.directory(parent)?;
        let listed = match slot {
            Slot::Directory => dir.directories.contains(&child),
            Slot::Request => dir.requests.contains(&child),
            Slot::Auth => dir.auths.contains(&child),
        };
        if !listed {
            return Err(DomainError::NotAChild { parent, child });
        }

        let removed = self.descendants(child);
        for &node in &removed {
            self.events.emit(&CollectionEvent::AboutToBeDeleted { node });
        }
        self.clear_links_to(&removed);

        let dir = self.directory_mut(parent)?;
        match slot {
            Slot::Directory => dir.directories.retain(|&c| c != child),
            Slot::Request => dir.requests.retain(|&c| c != child),
            Slot::Auth => dir.auths.retain(|&c| c != child),
        }
        // The removed node keeps its stale parent handle; reuse goes
        // through `set_parent` or an add operation.
        self.mark_dirty();
        Ok(())
    }

    /// Unlinks a child directory, notifying subscribers first.
    ///
    /// The subtree stays allocated so it can be re-attached; pair with
    /// [`CollectionTree::discard`], or use [`CollectionTree::delete`], once
    /// it is no longer needed.
    ///
    /// # Errors
    /// `NotAChild` if `child` is not a directory listed under `parent`.
    pub fn remove_directory(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.detach(parent, child, Slot::Directory)
    }

    /// Unlinks a child request, notifying subscribers first. Like
    /// [`CollectionTree::remove_directory`] the node stays allocated until
    /// discarded.
    ///
    /// # Errors
    /// `NotAChild` if `child` is not a request listed under `parent`.
    pub fn remove_request(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.detach(parent, child, Slot::Request)
    }

    /// Unlinks a child auth, notifying subscribers first. Requests linked to
    /// it lose their binding. The node stays allocated until discarded.
    ///
    /// # Errors
    /// `NotAChild` if `child` is not an auth listed under `parent`.
    pub fn remove_auth(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.detach(parent, child, Slot::Auth)
    }

    /// Unlinks any attached node from its parent, keeping it allocated.
    ///
    /// # Errors
    /// `RootNode` for the root, `NotAChild` for a detached node.
    pub fn remove(&mut self, id: NodeId) -> DomainResult<()> {
        if id == self.root {
            return Err(DomainError::RootNode);
        }
        let node = self.live(id)?;
        let parent = node.parent.ok_or(DomainError::NotAChild {
            parent: self.root,
            child: id,
        })?;
        let slot = match node.kind {
            NodeKind::Directory(_) => Slot::Directory,
            NodeKind::Request(_) => Slot::Request,
            NodeKind::Auth(_) => Slot::Auth,
        };
        self.detach(parent, id, slot)
    }

    /// Frees a detached subtree.
    ///
    /// # Errors
    /// `AlreadyAttached` if the node is still listed under its parent.
    pub fn discard(&mut self, id: NodeId) -> DomainResult<()> {
        if id == self.root {
            return Err(DomainError::RootNode);
        }
        self.live(id)?;
        if self.is_attached(id) {
            return Err(DomainError::AlreadyAttached(id));
        }
        for node in self.descendants(id) {
            self.free(node);
        }
        Ok(())
    }

    /// Unlinks a node and frees its subtree. Its handles become invalid.
    ///
    /// # Errors
    /// See [`CollectionTree::remove`].
    pub fn delete(&mut self, id: NodeId) -> DomainResult<()> {
        self.remove(id)?;
        self.discard(id)
    }

    fn clear_links_to(&mut self, removed: &[NodeId]) {
        for node in self.nodes.iter_mut().flatten() {
            if let NodeKind::Request(request) = &mut node.kind
                && let AuthBinding::Linked {
                    target: Some(target),
                    ..
                } = request.auth
                && removed.contains(&target)
            {
                request.auth = AuthBinding::None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutation of payloads
    // ------------------------------------------------------------------

    /// Renames a node, enforcing sibling uniqueness.
    ///
    /// # Errors
    /// `InvalidName`, `DuplicateName` or `NodeNotFound`.
    pub fn rename(&mut self, id: NodeId, new_name: impl Into<String>) -> DomainResult<()> {
        let new_name = validate_name(new_name.into())?;
        let node = self.live(id)?;
        if node.name == new_name {
            return Ok(());
        }
        if self.is_attached(id)
            && let Some(parent) = node.parent
            && self.has_child_named(parent, &new_name)
        {
            return Err(DomainError::DuplicateName(new_name));
        }
        let old_name = std::mem::replace(&mut self.live_mut(id)?.name, new_name.clone());
        self.events.emit(&CollectionEvent::NameChanged {
            node: id,
            old_name,
            new_name,
        });
        self.mark_dirty();
        Ok(())
    }

    /// Applies `edit` to a request template and marks the tree dirty.
    ///
    /// # Errors
    /// `NodeNotFound` or `NotARequest`.
    pub fn update_request<R>(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut RequestTemplate) -> R,
    ) -> DomainResult<R> {
        let result = edit(self.request_mut(id)?);
        self.mark_dirty();
        Ok(result)
    }

    /// Applies `edit` to an auth template and marks the tree dirty.
    ///
    /// # Errors
    /// `NodeNotFound` or `NotAnAuth`.
    pub fn update_auth<R>(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut AuthTemplate) -> R,
    ) -> DomainResult<R> {
        let result = match &mut self.live_mut(id)?.kind {
            NodeKind::Auth(auth) => edit(auth),
            _ => return Err(DomainError::NotAnAuth(id)),
        };
        self.mark_dirty();
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Auth bindings
    // ------------------------------------------------------------------

    /// Gives a request its own embedded auth, replacing any previous binding.
    ///
    /// # Errors
    /// `NotARequest`, `NodeNotFound` or `InvalidName`.
    pub fn set_embedded_auth(
        &mut self,
        request: NodeId,
        name: impl Into<String>,
        template: AuthTemplate,
    ) -> DomainResult<NodeId> {
        let previous = self.request(request)?.auth.clone();
        let auth = self.create_auth(name, template)?;
        self.live_mut(auth)?.parent = Some(request);
        self.request_mut(request)?.auth = AuthBinding::Embedded(auth);
        if let AuthBinding::Embedded(old) = previous {
            self.free(old);
        }
        self.mark_dirty();
        Ok(auth)
    }

    /// Links a request to a shared auth node.
    ///
    /// # Errors
    /// `NotARequest`, `NotAnAuth` or `NodeNotFound`.
    pub fn link_auth(&mut self, request: NodeId, auth: NodeId) -> DomainResult<()> {
        self.auth(auth)?;
        let path = self.absolute_path(auth);
        self.bind(
            request,
            AuthBinding::Linked {
                path,
                target: Some(auth),
            },
        )
    }

    /// Stores an unresolved path link, bound later by [`Self::init_sym_links`].
    ///
    /// # Errors
    /// `NotARequest` or `NodeNotFound`.
    pub fn link_auth_path(&mut self, request: NodeId, path: impl Into<String>) -> DomainResult<()> {
        self.bind(
            request,
            AuthBinding::Linked {
                path: path.into(),
                target: None,
            },
        )
    }

    /// Removes the request's own auth so it inherits again.
    ///
    /// # Errors
    /// `NotARequest` or `NodeNotFound`.
    pub fn clear_auth(&mut self, request: NodeId) -> DomainResult<()> {
        self.bind(request, AuthBinding::None)
    }

    fn bind(&mut self, request: NodeId, binding: AuthBinding) -> DomainResult<()> {
        let previous = std::mem::replace(&mut self.request_mut(request)?.auth, binding);
        if let AuthBinding::Embedded(old) = previous {
            self.free(old);
        }
        self.mark_dirty();
        Ok(())
    }

    /// Returns the path a linked request currently points at: the bound
    /// target's live path, or the stored path while unbound.
    #[must_use]
    pub fn linked_path(&self, request: NodeId) -> Option<String> {
        match &self.request(request).ok()?.auth {
            AuthBinding::Linked {
                target: Some(target),
                ..
            } if self.node(*target).is_some() => Some(self.absolute_path(*target)),
            AuthBinding::Linked { path, .. } => Some(path.clone()),
            _ => None,
        }
    }

    /// Binds every unresolved request link by absolute path lookup.
    ///
    /// Runs top-down once the whole tree exists, since links may point at
    /// auths that appear later in document order. Returns the requests whose
    /// link could not be bound.
    pub fn init_sym_links(&mut self) -> Vec<NodeId> {
        let mut unresolved = Vec::new();
        for id in self.descendants(self.root) {
            let path = match self.request(id).map(RequestTemplate::auth) {
                Ok(AuthBinding::Linked { path, target: None }) => path.clone(),
                _ => continue,
            };
            let target = self
                .find_from_absolute_path(self.root, &path)
                .filter(|&t| self.auth(t).is_ok());
            match target {
                Some(target) => {
                    if let Ok(request) = self.request_mut(id) {
                        request.auth = AuthBinding::Linked {
                            path,
                            target: Some(target),
                        };
                    }
                }
                None => unresolved.push(id),
            }
        }
        unresolved
    }

    /// Requests whose stored link path is not bound to a live auth.
    #[must_use]
    pub fn unbound_links(&self) -> Vec<NodeId> {
        self.all_requests()
            .into_iter()
            .filter(|&id| {
                matches!(
                    self.request(id).map(RequestTemplate::auth),
                    Ok(AuthBinding::Linked { target: None, .. })
                )
            })
            .collect()
    }

    /// Returns the auth that applies to `request` at send time.
    ///
    /// Own embedded or bound linked auth wins; otherwise the nearest
    /// ancestor directory holding an auth named [`DEFAULT_AUTH_NAME`].
    #[must_use]
    pub fn effective_auth(&self, request: NodeId) -> Option<NodeId> {
        match &self.request(request).ok()?.auth {
            AuthBinding::Embedded(id)
            | AuthBinding::Linked {
                target: Some(id), ..
            } if self.auth(*id).is_ok() => return Some(*id),
            _ => {}
        }
        let mut current = self.parent(request);
        while let Some(dir_id) = current {
            if let Ok(dir) = self.directory(dir_id)
                && let Some(found) = dir
                    .auths
                    .iter()
                    .copied()
                    .find(|&a| self.name(a) == Some(DEFAULT_AUTH_NAME))
            {
                return Some(found);
            }
            current = self.parent(dir_id);
        }
        None
    }

    // ------------------------------------------------------------------
    // Paths and traversal
    // ------------------------------------------------------------------

    /// Returns `/`-joined ancestor names; the root contributes no segment.
    #[must_use]
    pub fn absolute_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                break;
            }
            let Some(node) = self.node(node_id) else {
                break;
            };
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.iter().rev().fold(String::new(), |mut path, name| {
            path.push('/');
            path.push_str(name);
            path
        })
    }

    /// Resolves a `/`-separated path relative to directory `dir`.
    ///
    /// At each level subdirectories are tried first, then requests, then
    /// auths. An empty path resolves to `dir` itself.
    #[must_use]
    pub fn find_relative(&self, dir: NodeId, path: &str) -> Option<NodeId> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut current = dir;
        for (i, &segment) in segments.iter().enumerate() {
            let directory = self.directory(current).ok()?;
            if let Some(&sub) = directory
                .directories
                .iter()
                .find(|&&d| self.name(d) == Some(segment))
            {
                current = sub;
                continue;
            }
            if i + 1 != segments.len() {
                return None;
            }
            return directory
                .requests
                .iter()
                .chain(&directory.auths)
                .copied()
                .find(|&n| self.name(n) == Some(segment));
        }
        Some(current)
    }

    /// Resolves an absolute path from `from`, whose own absolute path must
    /// prefix `path`.
    #[must_use]
    pub fn find_from_absolute_path(&self, from: NodeId, path: &str) -> Option<NodeId> {
        let prefix = self.absolute_path(from);
        let rest = path.strip_prefix(prefix.as_str())?;
        if !prefix.is_empty() && !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        self.find_relative(from, rest)
    }

    /// Returns `id` and every node it owns, parents before children.
    /// Embedded auths follow their request.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        out.push(id);
        match &node.kind {
            NodeKind::Directory(dir) => {
                for child in dir.children() {
                    self.collect_descendants(child, out);
                }
            }
            NodeKind::Request(request) => {
                if let AuthBinding::Embedded(auth) = request.auth {
                    self.collect_descendants(auth, out);
                }
            }
            NodeKind::Auth(_) => {}
        }
    }

    /// Every request template reachable from the root, in tree order.
    #[must_use]
    pub fn all_requests(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.request(id).is_ok())
            .collect()
    }

    /// Deep-copies a subtree into a new detached node.
    ///
    /// Linked bindings keep pointing at the same shared auth. The copy is
    /// meant to be attached with an add operation; otherwise discard it.
    ///
    /// # Errors
    /// `NodeNotFound` or `RootNode`.
    pub fn duplicate(&mut self, id: NodeId) -> DomainResult<NodeId> {
        if id == self.root {
            return Err(DomainError::RootNode);
        }
        self.clone_subtree(id, None)
    }

    fn clone_subtree(&mut self, id: NodeId, parent: Option<NodeId>) -> DomainResult<NodeId> {
        let node = self.live(id)?.clone();
        let copy = self.alloc(node.name, NodeKind::Directory(Directory::default()));
        self.live_mut(copy)?.parent = parent;
        match node.kind {
            NodeKind::Directory(dir) => {
                let mut cloned = Directory::default();
                for &child in &dir.directories {
                    cloned.directories.push(self.clone_subtree(child, Some(copy))?);
                }
                for &child in &dir.requests {
                    cloned.requests.push(self.clone_subtree(child, Some(copy))?);
                }
                for &child in &dir.auths {
                    cloned.auths.push(self.clone_subtree(child, Some(copy))?);
                }
                self.live_mut(copy)?.kind = NodeKind::Directory(cloned);
            }
            NodeKind::Request(mut request) => {
                if let AuthBinding::Embedded(auth) = request.auth {
                    request.auth = AuthBinding::Embedded(self.clone_subtree(auth, Some(copy))?);
                }
                self.live_mut(copy)?.kind = NodeKind::Request(request);
            }
            NodeKind::Auth(auth) => {
                self.live_mut(copy)?.kind = NodeKind::Auth(auth);
            }
        }
        Ok(copy)
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    if name.is_empty() || name.contains('/') {
        Err(DomainError::InvalidName(name))
    } else {
        Ok(name)
    }
}
