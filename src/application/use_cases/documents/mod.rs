pub mod delete_document;
pub mod error;
pub mod get_document;
pub mod get_raw_document;
pub mod list_changes;
pub mod purge_documents;
pub mod put_document;
