//! merx: product catalog service with cache-aside reads.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
