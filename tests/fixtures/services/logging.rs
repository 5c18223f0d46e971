use simple_ioc::Component;

#[derive(Component, Default)]
pub struct LoggingService;

impl LoggingService {
    pub fn log(&self, message: &str) -> String {
        format!("[LOG] {message}")
    }
}
