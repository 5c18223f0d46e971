//! User management wired by the container
//!
//! Run with: cargo run --example user_component --features logging-pretty
//!
//! Set `SIMPLE_IOC_LOG=simple_ioc=debug` to watch every resolution.

use simple_ioc::{Component, Container};
use std::sync::Arc;

pub trait Notifier: Send + Sync {
    fn notify(&self, to: &str, body: &str);
}

#[derive(Component, Default)]
pub struct LoggingService;

impl LoggingService {
    pub fn log(&self, message: &str) {
        println!("[LOG] {message}");
    }
}

#[derive(Component, Default)]
#[component(provides(dyn Notifier))]
pub struct EmailService;

impl Notifier for EmailService {
    fn notify(&self, to: &str, body: &str) {
        println!("Sending email to {to}: {body}");
    }
}

#[derive(Component, Default)]
pub struct DatabaseService;

impl DatabaseService {
    pub fn find_user(&self, id: u32) -> String {
        format!("user-{id}")
    }
}

#[derive(Component, Default)]
pub struct UserComponent {
    #[inject]
    database: Option<Arc<DatabaseService>>,
    #[inject]
    email: Option<Arc<dyn Notifier>>,
    #[inject]
    logging: Option<Arc<LoggingService>>,
}

impl UserComponent {
    pub fn process_user(&self, id: u32) {
        let (Some(database), Some(email), Some(logging)) =
            (&self.database, &self.email, &self.logging)
        else {
            println!("UserComponent was not fully wired");
            return;
        };

        let user = database.find_user(id);
        logging.log(&format!("Processing {user}"));
        email.notify(&user, "Welcome!");
    }
}

pub struct App;

fn main() {
    #[cfg(feature = "logging")]
    simple_ioc::logging::init();

    let container = Container::builder()
        .source_root(simple_ioc::source_root!())
        .load_path_from_env()
        .build();
    container.run::<App>();

    match container.get_bean_as::<UserComponent>("UserComponent") {
        Some(user) => user.process_user(42),
        None => println!("UserComponent is not registered"),
    }
}
