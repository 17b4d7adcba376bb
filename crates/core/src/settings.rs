//! Settings persisted between runs.
//!
//! The file holds ten scalars separated by whitespace, in this order:
//! clear color r, g, b; UI flag (0/1); camera position x, y, z;
//! camera front x, y, z. The whole record is parsed before any field is
//! used, so a short or corrupt file never yields a half-loaded record.

use std::fmt;
use std::fs;
use std::path::Path;

use glam::Vec3;

use crate::camera::HOME_POSITION;

/// Number of scalars in the settings file.
pub const FIELD_COUNT: usize = 10;

/// Error type for settings persistence.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expected 10 values, found {0}")]
    TooFewValues(usize),

    #[error("Invalid number {value:?} at position {index}")]
    InvalidNumber { index: usize, value: String },

    #[error("Invalid flag {0:?}, expected 0 or 1")]
    InvalidFlag(String),
}

/// The persisted viewer record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub clear_color: Vec3,
    pub ui_enabled: bool,
    pub camera_position: Vec3,
    pub camera_front: Vec3,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            clear_color: Vec3::ZERO,
            ui_enabled: false,
            camera_position: HOME_POSITION,
            camera_front: Vec3::NEG_Z,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults on any failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::debug!("Using default settings ({}): {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load settings from `path`, reporting why it failed.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Write settings to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_string())?;
        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Parse the ten-scalar text form. Anything after the tenth value is ignored.
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let tokens: Vec<&str> = text.split_whitespace().take(FIELD_COUNT).collect();
        if tokens.len() < FIELD_COUNT {
            return Err(SettingsError::TooFewValues(tokens.len()));
        }

        let number = |index: usize| -> Result<f32, SettingsError> {
            let invalid = || SettingsError::InvalidNumber {
                index,
                value: tokens[index].to_string(),
            };
            let value = tokens[index].parse::<f32>().map_err(|_| invalid())?;
            if !value.is_finite() {
                return Err(invalid());
            }
            Ok(value)
        };

        let ui_enabled = match tokens[3] {
            "0" => false,
            "1" => true,
            other => return Err(SettingsError::InvalidFlag(other.to_string())),
        };

        Ok(Self {
            clear_color: Vec3::new(number(0)?, number(1)?, number(2)?),
            ui_enabled,
            camera_position: Vec3::new(number(4)?, number(5)?, number(6)?),
            camera_front: Vec3::new(number(7)?, number(8)?, number(9)?),
        })
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.clear_color;
        let p = self.camera_position;
        let d = self.camera_front;
        writeln!(f, "{}\n{}\n{}", c.x, c.y, c.z)?;
        writeln!(f, "{}", u8::from(self.ui_enabled))?;
        writeln!(f, "{}\n{}\n{}", p.x, p.y, p.z)?;
        writeln!(f, "{}\n{}\n{}", d.x, d.y, d.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        Settings {
            clear_color: Vec3::new(0.2, 0.4, 0.6),
            ui_enabled: true,
            camera_position: Vec3::new(-2.32, 0.54, 5.87),
            camera_front: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("program_state.txt");

        let settings = sample();
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path);

        assert!(loaded.clear_color.abs_diff_eq(settings.clear_color, 1e-6));
        assert_eq!(loaded.ui_enabled, settings.ui_enabled);
        assert!(loaded.camera_position.abs_diff_eq(settings.camera_position, 1e-6));
        assert!(loaded.camera_front.abs_diff_eq(settings.camera_front, 1e-6));
    }

    #[test]
    fn file_has_ten_lines_in_order() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), FIELD_COUNT);
        assert_eq!(lines[0], "0.2");
        assert_eq!(lines[3], "1");
        assert_eq!(lines[4], "-2.32");
        assert_eq!(lines[9], "-1");
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources").join("program_state.txt");
        Settings::default().save(&path).unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("program_state.txt");
        sample().save(&path).unwrap();
        Settings::default().save(&path).unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load(dir.path().join("does_not_exist.txt"));
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn short_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        fs::write(&path, "0.5\n0.5\n0.5\n1\n3.0\n").unwrap();

        assert!(matches!(
            Settings::try_load(&path),
            Err(SettingsError::TooFewValues(5))
        ));
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn malformed_values_yield_defaults() {
        let bad_number = "0.1 0.2 zebra 0 1 2 3 0 0 -1";
        assert!(matches!(
            Settings::parse(bad_number),
            Err(SettingsError::InvalidNumber { index: 2, .. })
        ));

        let bad_flag = "0.1 0.2 0.3 2 1 2 3 0 0 -1";
        assert!(matches!(
            Settings::parse(bad_flag),
            Err(SettingsError::InvalidFlag(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, bad_number).unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn non_finite_values_yield_defaults() {
        let text = "0 0 0 0 NaN inf -inf 0 0 -1";
        assert!(matches!(
            Settings::parse(text),
            Err(SettingsError::InvalidNumber { index: 4, .. })
        ));
        assert!(matches!(
            Settings::parse("0 0 0 0 1 2 3 0 0 -infinity"),
            Err(SettingsError::InvalidNumber { index: 9, .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("program_state.txt");
        fs::write(&path, text).unwrap();
        let settings = Settings::load(&path);
        assert_eq!(settings, Settings::default());
        assert!(settings.camera_position.is_finite());
    }

    #[test]
    fn parse_accepts_any_whitespace_and_ignores_extra_values() {
        let text = "0.1 0.2\t0.3\n0\n1 2 3   0 1 0 999 trailing";
        let settings = Settings::parse(text).unwrap();
        assert_eq!(settings.clear_color, Vec3::new(0.1, 0.2, 0.3));
        assert!(!settings.ui_enabled);
        assert_eq!(settings.camera_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(settings.camera_front, Vec3::Y);
    }
}
