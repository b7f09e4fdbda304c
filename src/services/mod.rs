mod cloud_storage_service_impl;
mod session_manager;
pub mod transfer;

pub use cloud_storage_service_impl::{CloudStorageServiceImpl, DEFAULT_PAGE_SIZE};
pub use session_manager::SessionManager;
