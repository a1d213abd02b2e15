pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod snapshot;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
