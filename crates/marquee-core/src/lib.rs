pub mod admin;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod playback;
pub mod repository;
pub mod resolver;
pub mod snapshot;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
