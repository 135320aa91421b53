//! Standard paths used by pomo

use std::path::PathBuf;

/// Standard pomo paths
pub struct Paths {
    /// Config directory (~/.config/pomo)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pomo");

        Self { config }
    }

    /// Location of the user configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_is_namespaced() {
        let paths = Paths::new();
        assert!(paths.config.ends_with("pomo"));
        assert_eq!(paths.config_file().file_name().unwrap(), "config.json");
    }
}
