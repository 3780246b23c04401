//! Request and response types shared by the engine.
mod request;
mod response;


pub use request::{Assertions, DEFAULT_BACKOFF_MS, Multimap, RequestSpec, RequestTemplate};
pub use response::Response;
