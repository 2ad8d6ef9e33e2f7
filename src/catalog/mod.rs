//! Space-Track catalog client.
//!
//! Retrieves two-line element sets from `https://www.space-track.org`.
//! The service uses cookie-based sessions: a form login at
//! `/ajaxauth/login`, followed by read-only queries under
//! `/basicspacedata/query/` whose filters are encoded as path segments.
//!
//! - [`CatalogClient`] — session lifecycle and queries
//! - [`TleQuery`] — filter criteria and path encoding
//! - [`CatalogResponse`] / [`ElementSet`] — response shapes
//! - [`HttpSession`] / [`SessionFactory`] — the HTTP seam

mod client;
mod error;
mod query;
mod records;
mod session;

pub use client::{CatalogClient, Lookup};
pub use error::{CatalogError, CatalogResult};
pub use query::{OutputFormat, TleQuery, DEFAULT_LIMIT};
pub use records::{CatalogResponse, ElementSet};
pub use session::{HttpReply, HttpSession, ReqwestSessionFactory, SessionFactory};
