//! Whether command output may use emoji.
//!
//! `--color=always|never` decides outright. In `auto` mode `NO_COLOR`
//! turns emoji off, and otherwise `console` decides from the terminal,
//! which covers `CLICOLOR`, `CLICOLOR_FORCE` and `TERM=dumb`.

use std::env;

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Build from the value of the `--color` flag.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            // Presence alone disables colors, even when empty
            _ => env::var_os("NO_COLOR").is_none() && console::colors_enabled(),
        };
        Self { use_color }
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::ffi::OsString;

    /// Sets one environment variable for a test and restores it on drop.
    struct EnvGuard(&'static str, Option<OsString>);

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let saved = env::var_os(key);
            env::set_var(key, value);
            EnvGuard(key, saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.1 {
                Some(v) => env::set_var(self.0, v),
                None => env::remove_var(self.0),
            }
        }
    }

    #[test]
    fn test_color_always() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
    }

    #[test]
    fn test_color_never() {
        assert!(!OutputConfig::from_env_and_flag("never").use_color);
    }

    #[test]
    fn test_emoji_helper() {
        let color = OutputConfig { use_color: true };
        let plain = OutputConfig { use_color: false };
        assert_eq!(emoji(&color, "✅", "[OK]"), "✅");
        assert_eq!(emoji(&plain, "✅", "[OK]"), "[OK]");
    }

    #[test]
    #[serial]
    fn test_empty_no_color_disables_auto() {
        let _guard = EnvGuard::set("NO_COLOR", "");
        assert!(!OutputConfig::from_env_and_flag("auto").use_color);
    }

    #[test]
    #[serial]
    fn test_always_ignores_no_color() {
        let _guard = EnvGuard::set("NO_COLOR", "1");
        assert!(OutputConfig::from_env_and_flag("ALWAYS").use_color);
    }
}
