use super::database::DatabaseService;
use super::email::Notifier;
use super::logging::LoggingService;
use simple_ioc::Component;
use std::sync::Arc;

#[derive(Component, Default)]
pub struct UserComponent {
    #[inject]
    pub database: Option<Arc<DatabaseService>>,
    #[inject]
    pub email: Option<Arc<dyn Notifier>>,
    #[inject]
    pub logging: Option<Arc<LoggingService>>,
}

impl UserComponent {
    /// Look a user up, notify them, and return what was logged
    pub fn process_user(&self, id: u32) -> Vec<String> {
        let mut log = Vec::new();
        let (Some(database), Some(email), Some(logging)) =
            (&self.database, &self.email, &self.logging)
        else {
            return log;
        };

        let user = database.find_user(id);
        log.push(logging.log(&format!("Processing {user}")));
        log.push(email.notify(&user, "Welcome!"));
        log
    }
}
