pub mod agents;
pub mod auth;
pub mod categories;
pub mod leads;
