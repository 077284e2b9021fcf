pub mod store;
pub use store::{CrmStore, UserStore};
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
