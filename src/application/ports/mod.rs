pub mod document_store;
pub mod role_check;
pub mod user_directory;
