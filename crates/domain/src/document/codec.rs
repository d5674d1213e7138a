//! Conversion between the document model and the arena.

use std::path::PathBuf;

use serde_json::Value;

use super::error::DocumentError;
use super::migration::migrate;
use super::model::{
    AuthDocument, AuthReference, CollectionDocument, DirectoryDocument, NodeDocument,
    RequestDocument,
};
use crate::auth::AuthTemplate;
use crate::collection::{AuthBinding, Collection, CollectionTree, NodeId, NodeKind, RequestTemplate};
use crate::error::DomainResult;
use crate::id::{generate_collection_uuid, is_valid_uuid};

/// Parses document text, migrating older versions to the current model.
///
/// # Errors
/// `Malformed` for invalid JSON or a shape that does not fit the model,
/// otherwise the version errors of [`migrate`].
pub fn parse_document(text: &str) -> Result<CollectionDocument, DocumentError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DocumentError::Malformed(e.to_string()))?;
    document_from_value(value)
}

/// Like [`parse_document`] for an already parsed JSON value.
///
/// # Errors
/// See [`parse_document`].
pub fn document_from_value(mut value: Value) -> Result<CollectionDocument, DocumentError> {
    migrate(&mut value)?;
    serde_json::from_value(value).map_err(|e| DocumentError::Malformed(e.to_string()))
}

impl Collection {
    /// Builds a collection from a document, then binds auth links.
    ///
    /// A document without a valid UUID is given a fresh one and comes back
    /// dirty so the new identity gets persisted.
    ///
    /// # Errors
    /// `Malformed` if the tree violates a structural rule such as sibling
    /// name uniqueness.
    pub fn from_document(
        document: CollectionDocument,
        name: impl Into<String>,
        file_path: Option<PathBuf>,
    ) -> Result<Self, DocumentError> {
        let fresh_uuid = !is_valid_uuid(&document.uuid);
        let uuid = if fresh_uuid {
            generate_collection_uuid()
        } else {
            document.uuid
        };

        let mut collection = Self::with_uuid(name, uuid);
        collection.restore(document.parameters, document.parameter_presets, file_path);

        let root = collection.tree.root();
        build_children(
            &mut collection.tree,
            root,
            document.auth_children,
            document.dir_children,
            document.reqt_children,
        )
        .map_err(|e| DocumentError::Malformed(e.to_string()))?;
        collection.tree.init_sym_links();

        collection.tree.mark_clean();
        if fresh_uuid {
            collection.mark_dirty();
        }
        Ok(collection)
    }

    /// Serializes the collection at the current version. Links are written as
    /// the target's current absolute path.
    #[must_use]
    pub fn to_document(&self) -> CollectionDocument {
        let mut document = CollectionDocument::new(self.uuid());
        let root = directory_document(&self.tree, self.tree.root());
        if let Some(root) = root {
            document.auth_children = root.auth_children;
            document.dir_children = root.dir_children;
            document.reqt_children = root.reqt_children;
        }
        document.parameters = self.variables().clone();
        document.parameter_presets = self.presets().to_vec();
        document
    }
}

impl CollectionTree {
    /// Captures a subtree as a standalone document.
    #[must_use]
    pub fn export_node(&self, id: NodeId) -> Option<NodeDocument> {
        match self.node(id)?.kind() {
            NodeKind::Directory(_) => directory_document(self, id).map(NodeDocument::Directory),
            NodeKind::Request(_) => request_document(self, id).map(NodeDocument::Request),
            NodeKind::Auth(_) => auth_document(self, id).map(NodeDocument::Auth),
        }
    }

    /// Rebuilds an exported subtree under `parent` and binds any links it
    /// carries that resolve in this tree.
    ///
    /// # Errors
    /// `DuplicateName` if `parent` already has a child with the top node's
    /// name; nothing is attached in that case.
    pub fn import_node(&mut self, parent: NodeId, document: NodeDocument) -> DomainResult<NodeId> {
        self.directory(parent)?;
        let id = match document {
            NodeDocument::Directory(dir) => build_directory(self, parent, dir)?,
            NodeDocument::Request(request) => build_request(self, parent, request)?,
            NodeDocument::Auth(auth) => build_auth(self, parent, auth)?,
        };
        self.init_sym_links();
        Ok(id)
    }
}

fn build_children(
    tree: &mut CollectionTree,
    parent: NodeId,
    auths: Vec<AuthDocument>,
    dirs: Vec<DirectoryDocument>,
    requests: Vec<RequestDocument>,
) -> DomainResult<()> {
    for auth in auths {
        build_auth(tree, parent, auth)?;
    }
    for dir in dirs {
        build_directory(tree, parent, dir)?;
    }
    for request in requests {
        build_request(tree, parent, request)?;
    }
    Ok(())
}

fn build_directory(
    tree: &mut CollectionTree,
    parent: NodeId,
    document: DirectoryDocument,
) -> DomainResult<NodeId> {
    let id = tree.insert_directory(parent, document.name)?;
    build_children(
        tree,
        id,
        document.auth_children,
        document.dir_children,
        document.reqt_children,
    )?;
    Ok(id)
}

fn build_request(
    tree: &mut CollectionTree,
    parent: NodeId,
    document: RequestDocument,
) -> DomainResult<NodeId> {
    let template = RequestTemplate::new(document.request).with_default_body(document.default_body);
    let id = tree.insert_request(parent, document.name, template)?;
    match document.auth {
        None => {}
        Some(AuthReference::Link(path)) => tree.link_auth_path(id, path)?,
        Some(AuthReference::Embedded(auth)) => {
            tree.set_embedded_auth(id, auth.name, auth_template(auth.definition, auth.location))?;
        }
    }
    Ok(id)
}

fn build_auth(
    tree: &mut CollectionTree,
    parent: NodeId,
    document: AuthDocument,
) -> DomainResult<NodeId> {
    tree.insert_auth(
        parent,
        document.name,
        auth_template(document.definition, document.location),
    )
}

fn auth_template(
    definition: crate::auth::AuthDefinition,
    location: Option<crate::auth::AuthLocation>,
) -> AuthTemplate {
    AuthTemplate {
        definition,
        location,
    }
}

fn directory_document(tree: &CollectionTree, id: NodeId) -> Option<DirectoryDocument> {
    let dir = tree.directory(id).ok()?;
    Some(DirectoryDocument {
        name: tree.name(id)?.to_string(),
        auth_children: dir
            .auths()
            .iter()
            .filter_map(|&a| auth_document(tree, a))
            .collect(),
        dir_children: dir
            .directories()
            .iter()
            .filter_map(|&d| directory_document(tree, d))
            .collect(),
        reqt_children: dir
            .requests()
            .iter()
            .filter_map(|&r| request_document(tree, r))
            .collect(),
    })
}

fn request_document(tree: &CollectionTree, id: NodeId) -> Option<RequestDocument> {
    let template = tree.request(id).ok()?;
    let auth = match template.auth() {
        AuthBinding::None => None,
        AuthBinding::Embedded(auth) => auth_document(tree, *auth).map(AuthReference::Embedded),
        AuthBinding::Linked { .. } => tree.linked_path(id).map(AuthReference::Link),
    };
    Some(RequestDocument {
        name: tree.name(id)?.to_string(),
        request: template.request().clone(),
        default_body: template.default_body().cloned(),
        auth,
    })
}

fn auth_document(tree: &CollectionTree, id: NodeId) -> Option<AuthDocument> {
    let auth = tree.auth(id).ok()?;
    Some(AuthDocument {
        name: tree.name(id)?.to_string(),
        location: auth.location,
        definition: auth.definition.clone(),
    })
}
