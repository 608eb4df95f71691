//! ODP API model types.

mod institution;
mod metadata;
mod project;

pub use institution::*;
pub use metadata::*;
pub use project::*;
