//! Application endpoints.

pub mod workload;

pub use workload::{work, WorkParams, WorkQuery};
