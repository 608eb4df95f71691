//! Trait definitions for ODP operations.
//!
//! Each entity type implements the traits its endpoints support, encapsulating
//! which API (public or admin) and which path they live on.

mod create;
mod get;
mod list;

pub use create::Create;
pub use get::Get;
pub use list::{List, ListPaged, DEFAULT_PAGE_SIZE, MAX_PAGES};
