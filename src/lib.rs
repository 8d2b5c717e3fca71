pub mod core;
pub mod engine;
pub mod observability;
pub mod output;
pub mod processors;
