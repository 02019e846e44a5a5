//! Admin adapters: one object per managed entity wiring repository, forms,
//! view configs and routing metadata together.

pub mod adapter;

pub use adapter::{AdminAdapter, AdminService};
