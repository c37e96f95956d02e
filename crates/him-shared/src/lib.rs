//! Types shared by every HIM admin console crate: backend entity schemas,
//! request bodies, console routes and redirect error codes.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod session;
pub mod types;

pub use error::{describe_error, ErrorCode, MutationAction};
pub use routes::{LoginStep, Route};
pub use session::Session;
