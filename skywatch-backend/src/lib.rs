pub mod astro;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod pool;
pub mod resolver;
pub mod service;
