pub mod email;
pub mod gallery;
pub mod notion;
pub mod session;
