/// User settings and playback modes
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Repeat mode
///
/// Cycles `Off → All → One → Off`. Persisted as `"none"`, `"all"`, `"one"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop after the last track (unless shuffling)
    #[default]
    #[serde(rename = "none")]
    Off,

    /// Wrap around to the first track
    #[serde(rename = "all")]
    All,

    /// Replay the current track
    #[serde(rename = "one")]
    One,
}

impl RepeatMode {
    /// Next mode in the toggle cycle
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "none",
            Self::All => "all",
            Self::One => "one",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" | "off" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the system preference
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub autoplay_next: bool,
    /// Linear volume in [0, 1]
    pub volume: f32,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            autoplay_next: true,
            volume: 0.7,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
        }
    }
}

impl Settings {
    /// Merge a stored record over the defaults
    ///
    /// Every known field is taken independently; missing, unknown or
    /// ill-typed fields silently keep their default. This is the only place
    /// settings defaults are applied.
    pub fn from_stored(stored: &Value) -> Self {
        let defaults = Self::default();
        let Some(stored) = stored.as_object() else {
            return defaults;
        };
        let Ok(Value::Object(mut merged)) = serde_json::to_value(&defaults) else {
            return defaults;
        };

        let keys: Vec<String> = merged.keys().cloned().collect();
        for key in keys {
            let Some(candidate) = stored.get(&key) else {
                continue;
            };
            let mut trial: Map<String, Value> = merged.clone();
            trial.insert(key.clone(), candidate.clone());
            if serde_json::from_value::<Self>(Value::Object(trial)).is_ok() {
                merged.insert(key, candidate.clone());
            }
        }

        serde_json::from_value::<Self>(Value::Object(merged))
            .map(Self::normalized)
            .unwrap_or(defaults)
    }

    /// Clamp values into their valid ranges
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            Self::default().volume
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeat_mode_cycles_off_all_one() {
        assert_eq!(RepeatMode::Off.next(), RepeatMode::All);
        assert_eq!(RepeatMode::All.next(), RepeatMode::One);
        assert_eq!(RepeatMode::One.next(), RepeatMode::Off);
    }

    #[test]
    fn repeat_mode_serializes_with_record_names() {
        assert_eq!(serde_json::to_value(RepeatMode::Off).unwrap(), json!("none"));
        assert_eq!(RepeatMode::from_str("one"), Some(RepeatMode::One));
        assert_eq!(RepeatMode::from_str("sometimes"), None);
    }

    #[test]
    fn settings_use_record_field_names() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "theme": "auto",
                "autoplayNext": true,
                "volume": 0.7f32,
                "repeatMode": "none",
                "shuffle": false
            })
        );
    }

    #[test]
    fn from_stored_merges_over_defaults() {
        let stored = json!({ "theme": "dark", "shuffle": true, "extra": 1 });
        let settings = Settings::from_stored(&stored);
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.shuffle);
        assert!(settings.autoplay_next);
        assert_eq!(settings.repeat_mode, RepeatMode::Off);
    }

    #[test]
    fn from_stored_ignores_invalid_fields() {
        let stored = json!({
            "theme": "sepia",
            "volume": "loud",
            "repeatMode": "all",
            "autoplayNext": false
        });
        let settings = Settings::from_stored(&stored);
        assert_eq!(settings.theme, Theme::Auto);
        assert_eq!(settings.volume, 0.7);
        assert_eq!(settings.repeat_mode, RepeatMode::All);
        assert!(!settings.autoplay_next);
    }

    #[test]
    fn from_stored_clamps_volume() {
        let settings = Settings::from_stored(&json!({ "volume": 3.5 }));
        assert_eq!(settings.volume, 1.0);
    }

    #[test]
    fn from_stored_non_object_gives_defaults() {
        assert_eq!(Settings::from_stored(&json!([1, 2, 3])), Settings::default());
        assert_eq!(Settings::from_stored(&Value::Null), Settings::default());
    }
}
