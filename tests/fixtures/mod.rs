pub mod chain;
pub mod reporting;
pub mod services;
