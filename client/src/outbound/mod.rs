//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest client for the hospital API
//! - **storage**: file-backed credential slot

pub mod http;
pub mod storage;
