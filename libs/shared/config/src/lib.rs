use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub seed_demo_directory: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("CARELINK_HOST").unwrap_or_else(|_| {
                warn!("CARELINK_HOST not set, binding to 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            port: env::var("CARELINK_PORT")
                .ok()
                .and_then(|raw| match raw.parse() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("CARELINK_PORT is not a valid port number, using 3000");
                        None
                    }
                })
                .unwrap_or(3000),
            seed_demo_directory: env::var("CARELINK_SEED_DEMO_DIRECTORY")
                .map(|raw| raw == "1" || raw.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
