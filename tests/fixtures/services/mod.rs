//! The user-management scenario: three leaf services and one consumer

pub mod database;
pub mod email;
pub mod logging;
pub mod user;

/// Root type; its module is the scanned namespace
pub struct App;
