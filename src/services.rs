pub mod access;
pub mod agent_service;
pub mod auth;
pub mod category_service;
pub mod lead_service;
pub mod notifier;
