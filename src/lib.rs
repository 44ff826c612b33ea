//! Library crate for lan-watch-rs: a bounded-concurrency TCP reachability
//! monitor for a /24 subnet.
pub mod config;
pub mod differ;
pub mod error;
pub mod limiter;
pub mod netdetect;
pub mod output;
pub mod ports;
pub mod probe;
pub mod scanner;
pub mod scheduler;
pub mod targets;
pub mod types;
