pub mod progress;
pub mod study;
