//! Application services orchestrating the store and cache adapters.

pub mod cache;
pub mod error;
pub mod products;
pub mod repos;
