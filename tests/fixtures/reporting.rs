//! Constructor injection against beans registered by an earlier run

use super::services::database::DatabaseService;
use super::services::email::Notifier;
use simple_ioc::{Component, Construct};
use std::sync::Arc;

pub struct Reports;

#[derive(Component)]
#[component(constructor)]
pub struct ReportService {
    pub database: Arc<DatabaseService>,
    pub notifier: Arc<dyn Notifier>,
}

impl Construct for ReportService {
    type Args = (Arc<DatabaseService>, Arc<dyn Notifier>);

    fn construct((database, notifier): Self::Args) -> Self {
        ReportService { database, notifier }
    }
}

impl ReportService {
    pub fn send_report(&self, id: u32) -> String {
        self.notifier
            .notify(&self.database.find_user(id), "Your monthly report")
    }
}

/// Same simple name as the services one, so its bean name collides
#[derive(Component, Default)]
pub struct LoggingService;

/// Described but never instantiated
#[derive(Component)]
#[component(abstract_type)]
pub struct ReportTemplate;
