use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    // ENVIRONMENT is 'development' for dev and anything else for prod,
    // same convention as the rest of our services.
    pub fn from_env() -> Self {
        match env::var("ENVIRONMENT").as_deref() {
            Ok("development") => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}
