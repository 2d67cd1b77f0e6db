pub mod action;
pub mod project;
pub mod store;
pub mod config;
pub mod view;
pub mod workspace;

pub use action::*;
pub use project::*;
pub use store::*;
pub use config::*;
pub use view::*;
pub use workspace::*;
