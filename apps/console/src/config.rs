use std::{collections::HashMap, fs};

#[derive(Debug)]
pub struct Settings {
    pub server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
        }
    }
}

fn apply_file(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
    }
}

/// `console.toml` in the working directory, then environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        apply_file(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("CONSOLE_SERVER_URL") {
        settings.server_url = v;
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_backend() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn file_overrides_server_url() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "server_url = \"https://admin.example\"\n");
        assert_eq!(settings.server_url, "https://admin.example");
    }

    #[test]
    fn malformed_file_keeps_defaults() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "server_url = [not toml");
        assert_eq!(settings.server_url, "http://127.0.0.1:8080");
    }
}
