//! A needs B, B needs C: one level deeper than the ordering handles

use simple_ioc::Component;
use std::sync::Arc;

pub struct Chain;

#[derive(Component, Default)]
pub struct Top {
    #[inject]
    pub middle: Option<Arc<Middle>>,
}

#[derive(Component, Default)]
pub struct Middle {
    #[inject]
    pub bottom: Option<Arc<Bottom>>,
}

#[derive(Component, Default)]
pub struct Bottom;
