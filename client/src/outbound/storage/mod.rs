//! Durable storage adapters.

mod atomic_write;
mod file_backend;

pub use file_backend::FileCredentialBackend;
