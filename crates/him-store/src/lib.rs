//! # him-store
//!
//! Session persistence for the HIM admin console.
//!
//! The client-rendered console keeps its tokens in a browser-style
//! [`LocalStorage`] backed by SQLite; the server-rendered console keeps them
//! in httpOnly cookies managed through a [`CookieJar`]. Both implement
//! [`SessionBackend`].

pub mod backend;
pub mod cookies;
pub mod database;
pub mod local_storage;
pub mod migrations;

mod error;

pub use backend::{CookieBackend, SessionBackend};
pub use cookies::{Cookie, CookieJar, SameSite};
pub use database::LocalStorage;
pub use error::{Result, StoreError};
