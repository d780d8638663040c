pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod security;
pub mod services;
pub mod storage;

#[cfg(test)]
mod testing;

pub use error::Error;
