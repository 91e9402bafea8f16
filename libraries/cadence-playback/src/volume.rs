//! Volume control
//!
//! Linear volume in [0, 1] as understood by the host media element, with a
//! mute flag that preserves the level.

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// A level of 0 starts muted.
    pub fn new(level: f32) -> Self {
        let level = clamp_level(level);
        Self {
            level,
            muted: level == 0.0,
        }
    }

    /// Set volume level (0.0-1.0)
    ///
    /// Moving the level to 0 mutes; any other level unmutes.
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
        self.muted = self.level == 0.0;
    }

    /// Get current volume level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Effective output gain
    ///
    /// Returns 0.0 if muted, otherwise the level
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.7)
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::default();
        assert_eq!(vol.level(), 0.7);
        assert!(!vol.is_muted());
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = Volume::new(0.5);
        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);
        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);
        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn zero_level_mutes_and_nonzero_unmutes() {
        let mut vol = Volume::new(0.8);
        vol.set_level(0.0);
        assert!(vol.is_muted());

        vol.set_level(0.3);
        assert!(!vol.is_muted());
    }

    #[test]
    fn toggle_mute_preserves_level() {
        let mut vol = Volume::new(0.8);
        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.8);
        assert_eq!(vol.gain(), 0.0);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.gain(), 0.8);
    }
}
