//! HTTP request template types

mod body;
mod header;
mod method;
mod raw;

pub use body::{FormEncoding, FormRecord, RequestBody};
pub use header::{Header, find_header};
pub use method::HttpMethod;
pub use raw::{FORM_URLENCODED_CONTENT_TYPE, RawRequest};
