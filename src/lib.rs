pub mod server;

// Re-export specific items from server
pub use server::services;
