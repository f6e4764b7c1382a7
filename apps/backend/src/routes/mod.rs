pub mod auth;
pub mod device;
pub mod progress;
pub mod stats;
pub mod study;
