//! HTTP adapter for the hospital API.

mod client;
mod dto;
mod routes;

pub use client::HospitalApiClient;
pub use routes::{RestResource, SearchRoute};
