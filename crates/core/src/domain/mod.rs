pub mod comments;
pub mod service;
