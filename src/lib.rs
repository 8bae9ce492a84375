#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod config;
pub mod core;
pub mod error;
pub mod query;
pub mod render;
pub mod stats;
pub mod store;
