//! Collection model: arena tree, nodes, variables and events.

mod events;
mod model;
mod node;
mod tree;
mod variables;

pub use events::{CollectionEvent, EventHub, SubscriptionId};
pub use model::{Collection, SECRET_SERVICE};
pub use node::{AuthBinding, Directory, Node, NodeId, NodeKind, RequestTemplate};
pub use tree::{CollectionTree, DEFAULT_AUTH_NAME};
pub use variables::{Preset, PresetEntry, SENSITIVE_SENTINEL};
