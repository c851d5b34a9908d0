pub mod channels;
pub mod document;
pub mod revision;
