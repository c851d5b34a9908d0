pub mod documents;
pub mod policy;
pub mod users;
