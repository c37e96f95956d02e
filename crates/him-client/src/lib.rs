//! Client-rendered HIM admin console: the session store, typed admin API
//! calls, and one controller per console page.

pub mod admin;
pub mod lifecycle;
pub mod pages;
pub mod session;

pub use admin::AdminApi;
pub use lifecycle::{Mount, MountHandle};
pub use pages::{Mutation, PageError, PageOutcome};
pub use session::{Credentials, LoginError, OtpChallenge, SessionStore};
