pub mod orm;
pub mod pending;
pub mod repository;
