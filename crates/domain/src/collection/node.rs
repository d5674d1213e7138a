//! Collection tree nodes.

use std::fmt;

use crate::auth::AuthTemplate;
use crate::request::{HttpMethod, RawRequest, RequestBody};

/// Non-owning handle to a node in a [`super::CollectionTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A directory's ordered child lists. The directory owns its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub(crate) directories: Vec<NodeId>,
    pub(crate) requests: Vec<NodeId>,
    pub(crate) auths: Vec<NodeId>,
}

impl Directory {
    /// Child directories in order.
    #[must_use]
    pub fn directories(&self) -> &[NodeId] {
        &self.directories
    }

    /// Child request templates in order.
    #[must_use]
    pub fn requests(&self) -> &[NodeId] {
        &self.requests
    }

    /// Child auth templates in order.
    #[must_use]
    pub fn auths(&self) -> &[NodeId] {
        &self.auths
    }

    /// All children: directories, then requests, then auths.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.directories
            .iter()
            .chain(&self.requests)
            .chain(&self.auths)
            .copied()
    }

    /// Returns true if `id` is listed as a child.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.children().any(|c| c == id)
    }
}

/// How a request template obtains its own auth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthBinding {
    /// No own auth; the effective auth is inherited.
    #[default]
    None,
    /// An auth node owned by the request itself.
    Embedded(NodeId),
    /// A shared auth elsewhere in the tree, referenced by absolute path.
    /// `target` stays `None` until the link pass binds it.
    Linked {
        /// Absolute path as stored in the document.
        path: String,
        /// Bound auth node.
        target: Option<NodeId>,
    },
}

/// A stored, parameterized HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTemplate {
    request: RawRequest,
    default_body: Option<RequestBody>,
    pub(crate) auth: AuthBinding,
}

impl RequestTemplate {
    /// Creates a template from a raw request, dropping the body when the
    /// method carries none.
    #[must_use]
    pub fn new(mut request: RawRequest) -> Self {
        let mut default_body = None;
        if !request.method.has_body() {
            default_body = request.body.take();
        }
        Self {
            request,
            default_body,
            auth: AuthBinding::None,
        }
    }

    /// Creates a template restoring a previously cached default body.
    #[must_use]
    pub fn with_default_body(mut self, default_body: Option<RequestBody>) -> Self {
        if default_body.is_some() {
            self.default_body = default_body;
        }
        self
    }

    /// The raw request.
    #[must_use]
    pub const fn request(&self) -> &RawRequest {
        &self.request
    }

    /// Body cached for restoring after a method switch.
    #[must_use]
    pub const fn default_body(&self) -> Option<&RequestBody> {
        self.default_body.as_ref()
    }

    /// How this template's own auth is bound.
    #[must_use]
    pub const fn auth(&self) -> &AuthBinding {
        &self.auth
    }

    /// Switches the HTTP method.
    ///
    /// Leaving POST/PUT caches the body and clears it; entering POST/PUT
    /// with no body restores the cached one.
    pub fn set_method(&mut self, method: HttpMethod) {
        let had_body = self.request.method.has_body();
        if had_body && !method.has_body() {
            if let Some(body) = self.request.body.take() {
                self.default_body = Some(body);
            }
        } else if !had_body && method.has_body() && self.request.body.is_none() {
            self.request.body.clone_from(&self.default_body);
        }
        self.request.method = method;
    }

    /// Sets the URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.request.url = url.into();
    }

    /// Mutable access to the header list.
    pub fn headers_mut(&mut self) -> &mut Vec<crate::request::Header> {
        &mut self.request.headers
    }

    /// Sets the body. Returns false (and leaves the body untouched) when the
    /// current method carries no body.
    pub fn set_body(&mut self, body: Option<RequestBody>) -> bool {
        if !self.request.method.has_body() {
            return false;
        }
        self.request.body = body;
        true
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A directory (or the collection root).
    Directory(Directory),
    /// A request template.
    Request(RequestTemplate),
    /// An auth template.
    Auth(AuthTemplate),
}

/// A node of the collection arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    /// The node name, unique among its siblings.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent handle. May be stale after removal until re-parented.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the directory payload, if this is a directory.
    #[must_use]
    pub const fn as_directory(&self) -> Option<&Directory> {
        match &self.kind {
            NodeKind::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    /// Returns the request payload, if this is a request.
    #[must_use]
    pub const fn as_request(&self) -> Option<&RequestTemplate> {
        match &self.kind {
            NodeKind::Request(request) => Some(request),
            _ => None,
        }
    }

    /// Returns the auth payload, if this is an auth.
    #[must_use]
    pub const fn as_auth(&self) -> Option<&AuthTemplate> {
        match &self.kind {
            NodeKind::Auth(auth) => Some(auth),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn post() -> RequestTemplate {
        RequestTemplate::new(
            RawRequest::new(HttpMethod::Post, "https://x").with_body(RequestBody::regular("{}")),
        )
    }

    #[test]
    fn test_switching_off_post_clears_body() {
        let mut template = post();
        template.set_method(HttpMethod::Get);
        assert!(template.request().body.is_none());
        assert_eq!(template.default_body(), Some(&RequestBody::regular("{}")));
    }

    #[test]
    fn test_switching_back_restores_body() {
        let mut template = post();
        template.set_method(HttpMethod::Delete);
        template.set_method(HttpMethod::Put);
        assert_eq!(template.request().body, Some(RequestBody::regular("{}")));
    }

    #[test]
    fn test_set_body_rejected_without_body_method() {
        let mut template = RequestTemplate::new(RawRequest::new(HttpMethod::Get, "https://x"));
        assert!(!template.set_body(Some(RequestBody::regular("a"))));
        assert!(template.request().body.is_none());
    }

    #[test]
    fn test_new_moves_body_of_get_into_cache() {
        let mut raw = RawRequest::new(HttpMethod::Get, "https://x");
        raw.body = Some(RequestBody::regular("stale"));
        let template = RequestTemplate::new(raw);
        assert!(template.request().body.is_none());
        assert_eq!(template.default_body(), Some(&RequestBody::regular("stale")));
    }
}
