pub mod action_ops;
pub mod build;
pub mod context_ops;
pub mod reconcile;
pub mod sync;
