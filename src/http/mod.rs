//! HTTP transport, response verification, retries and concurrent dispatch.
mod client;
mod dispatch;
mod retry;
mod transport;
mod verify;


pub use client::{ClientSettings, build_client};
pub use dispatch::{DispatchReport, WorkQueue, dispatch};
pub use retry::{
    Attempt, MAX_BACKOFF_CEILING, SendContext, Sleeper, TokioSleeper, UnitOutcome, backoff_cap,
    backoff_delay, send_and_verify, send_with_retries,
};
pub use transport::{ReqwestTransport, Transport, build_header_map, canonical_header_name};
pub use verify::verify;
