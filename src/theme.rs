// Light/dark theme preference

use crate::kv::KeyValue;
use eyre::Result;
use std::fmt;
use tracing::{debug, warn};

pub const THEME_KEY: &str = "theme";

/// Boolean flag written by older versions
pub const LEGACY_DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark mode",
            Theme::Light => "Light mode",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the stored theme, falling back to the legacy flag and then the default
pub fn load_theme<K: KeyValue + ?Sized>(kv: &K) -> Result<Theme> {
    if let Some(raw) = kv.get(THEME_KEY)? {
        return Ok(match raw.trim() {
            "dark" => Theme::Dark,
            "light" => Theme::Light,
            other => {
                warn!(value = other, "Unknown theme value, using default");
                Theme::default()
            }
        });
    }

    if let Some(flag) = kv.get(LEGACY_DARK_MODE_KEY)? {
        debug!(flag = %flag, "Using legacy dark mode flag");
        return Ok(if flag.trim() == "true" { Theme::Dark } else { Theme::Light });
    }

    Ok(Theme::default())
}

pub fn save_theme<K: KeyValue + ?Sized>(kv: &mut K, theme: Theme) -> Result<()> {
    kv.set(THEME_KEY, theme.as_str())
}

/// Flip the stored theme and return the new one
pub fn toggle_theme<K: KeyValue + ?Sized>(kv: &mut K) -> Result<Theme> {
    let theme = load_theme(kv)?.toggle();
    save_theme(kv, theme)?;
    debug!(%theme, "Toggled theme");
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    #[test]
    fn test_default_theme_is_dark() {
        let kv = MemoryKv::new();
        assert_eq!(load_theme(&kv).unwrap(), Theme::Dark);
    }

    #[test]
    fn test_toggle_persists() {
        let mut kv = MemoryKv::new();
        assert_eq!(toggle_theme(&mut kv).unwrap(), Theme::Light);
        assert_eq!(kv.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(toggle_theme(&mut kv).unwrap(), Theme::Dark);
        assert_eq!(load_theme(&kv).unwrap(), Theme::Dark);
    }

    #[test]
    fn test_legacy_flag() {
        let mut kv = MemoryKv::new();
        kv.set(LEGACY_DARK_MODE_KEY, "false").unwrap();
        assert_eq!(load_theme(&kv).unwrap(), Theme::Light);

        kv.set(LEGACY_DARK_MODE_KEY, "true").unwrap();
        assert_eq!(load_theme(&kv).unwrap(), Theme::Dark);

        // The current key wins over the legacy flag
        kv.set(THEME_KEY, "light").unwrap();
        assert_eq!(load_theme(&kv).unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_value_falls_back() {
        let mut kv = MemoryKv::new();
        kv.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(load_theme(&kv).unwrap(), Theme::Dark);
    }

    #[test]
    fn test_theme_display() {
        assert_eq!(Theme::Light.to_string(), "light");
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}
