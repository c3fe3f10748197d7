//! REST routes of the record collections.

use crate::domain::{Doctor, Patient, Record, StaffMember};

/// How a collection exposes free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRoute {
    /// `GET /{collection}/search?q=...`
    Dedicated,
    /// `GET /{collection}?search=...`
    Filter,
}

/// A record type served as a REST collection.
pub trait RestResource: Record {
    /// Collection path segment under the API base.
    const PATH: &'static str;
    const SEARCH: SearchRoute;
}

impl RestResource for Patient {
    const PATH: &'static str = "patients";
    const SEARCH: SearchRoute = SearchRoute::Dedicated;
}

impl RestResource for Doctor {
    const PATH: &'static str = "doctors";
    const SEARCH: SearchRoute = SearchRoute::Filter;
}

impl RestResource for StaffMember {
    const PATH: &'static str = "staff";
    const SEARCH: SearchRoute = SearchRoute::Filter;
}
