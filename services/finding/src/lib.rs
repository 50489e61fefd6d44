// Domain layer modules
pub mod domain;

// Application layer modules
pub mod application;

// Infrastructure layer modules
pub mod infrastructure;

// Lambda entry point shared by the operation binaries
pub mod lambda_entry;

pub use lambda_entry::run_operation;
