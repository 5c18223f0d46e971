use simple_ioc::Component;

pub trait Notifier: Send + Sync {
    fn notify(&self, to: &str, body: &str) -> String;
}

#[derive(Component, Default)]
#[component(provides(dyn Notifier))]
pub struct EmailService;

impl Notifier for EmailService {
    fn notify(&self, to: &str, body: &str) -> String {
        format!("Sending email to {to}: {body}")
    }
}
