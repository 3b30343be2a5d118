pub mod merge;
pub mod push_service;
pub mod resolver;
