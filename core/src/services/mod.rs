//! Per-entity service handles.
//!
//! Each handle borrows the client's request plumbing and cache and exposes
//! the CRUD surface of one resource. Every mutation applies its row of the
//! invalidation graph: a narrow key set when the mutation result carries
//! enough information to name the affected views, and a whole-kind sweep
//! when it does not.

mod domains;
mod layers;
mod relationships;
mod terms;

pub use domains::Domains;
pub use layers::Layers;
pub use relationships::Relationships;
pub use terms::Terms;
