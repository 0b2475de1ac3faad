pub mod init;
pub mod models;
pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

#[cfg(test)]
pub mod memory;
