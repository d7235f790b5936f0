pub mod engine;
pub mod mono;
pub mod parameters;
