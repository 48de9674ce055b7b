pub mod collector;
pub mod gpu;
pub mod policy;
pub mod snapshot;
