//! Application use cases (business logic orchestration).

mod open_collection;
mod save_collection;
mod send_request;

pub use open_collection::*;
pub use save_collection::*;
pub use send_request::*;
