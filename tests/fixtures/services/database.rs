use simple_ioc::Component;

#[derive(Component, Default)]
pub struct DatabaseService {
    // Plain state, never injected
    connection: String,
}

impl DatabaseService {
    pub fn find_user(&self, id: u32) -> String {
        let db = if self.connection.is_empty() {
            "memory"
        } else {
            &self.connection
        };
        format!("user-{id}@{db}")
    }
}
