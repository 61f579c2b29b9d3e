pub mod logger;
pub mod repo;
