pub mod config_io;
pub mod recovery;
pub mod store_io;
pub mod workspace_io;
