//! Screensaver settings
//!
//! Captured by the host's configuration screen and handed to the core at
//! construction. Stored as JSON; missing fields fall back to defaults.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Rect, SpeedSettings};

/// Native pixel size of the puck image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
        }
    }
}

impl ImageSize {
    /// Height over width
    pub fn aspect_ratio(&self) -> f64 {
        self.height / self.width
    }
}

/// Errors from loading or validating settings
#[derive(Debug)]
pub enum SettingsError {
    /// Failed to read the settings file.
    Io(std::io::Error),
    /// Settings file is not valid JSON for [`Settings`].
    Parse(serde_json::Error),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to read settings: {}", e),
            SettingsError::Parse(e) => write!(f, "Failed to parse settings: {}", e),
            SettingsError::Invalid(msg) => write!(f, "Invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// Screensaver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    /// Width of the selected display (boundary width)
    pub display_width: f64,
    /// Height of the selected display (boundary height)
    pub display_height: f64,

    // === Motion ===
    /// Initial speed (pixels per second)
    pub speed: f64,
    /// Speed floor
    pub min_speed: f64,
    /// Speed change per speed up / speed down
    pub speed_step: f64,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,

    // === Pucks ===
    /// Native image size; `None` uses the plain fallback puck
    pub puck_image: Option<ImageSize>,
    pub primary_size_multiplier: f64,
    /// Launch a second, independent puck
    pub secondary_enabled: bool,
    pub secondary_size_multiplier: f64,

    // === Debug ===
    /// Start with debug outlines on
    pub debug_style: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,

            speed: DEFAULT_SPEED,
            min_speed: MIN_SPEED,
            speed_step: SPEED_STEP,
            seed: None,

            puck_image: Some(ImageSize::default()),
            primary_size_multiplier: 1.0,
            secondary_enabled: false,
            secondary_size_multiplier: 1.0,

            debug_style: false,
        }
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Invalid(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check every dimension, speed and multiplier is usable
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_positive("display_width", self.display_width)?;
        check_positive("display_height", self.display_height)?;
        check_positive("speed", self.speed)?;
        check_positive("min_speed", self.min_speed)?;
        check_positive("speed_step", self.speed_step)?;
        check_positive("primary_size_multiplier", self.primary_size_multiplier)?;
        if self.secondary_enabled {
            check_positive("secondary_size_multiplier", self.secondary_size_multiplier)?;
        }
        if let Some(image) = self.puck_image {
            check_positive("puck_image.width", image.width)?;
            check_positive("puck_image.height", image.height)?;
        }
        Ok(())
    }

    /// Boundary covering the whole display
    pub fn boundary(&self) -> Rect {
        Rect::new(0.0, 0.0, self.display_width, self.display_height)
    }

    pub fn speed_settings(&self) -> SpeedSettings {
        SpeedSettings {
            speed: self.speed,
            min_speed: self.min_speed,
            step: self.speed_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.speed, 300.0);
        assert_eq!(settings.min_speed, 10.0);
        assert!(!settings.secondary_enabled);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.boundary(), Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{ "display_width": 1000, "display_height": 800, "seed": 7 }"#)
                .unwrap();
        assert_eq!(settings.display_width, 1000.0);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.speed, DEFAULT_SPEED);
        assert_eq!(settings.puck_image, Some(ImageSize::default()));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            secondary_enabled: true,
            puck_image: None,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{ "speed": -3 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json(r#"{ "display_width": "wide" }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
