//! Volume control
//!
//! Linear level in [0, 1], shared by both sinks so switching between audio
//! and video keeps the chosen loudness.

/// Volume controller with mute memory
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Level to restore when unmuting
    before_mute: Option<f32>,
}

impl Volume {
    /// Create new volume controller, clamping `level` to [0, 1]
    pub fn new(level: f32) -> Self {
        Self {
            level: sanitize(level).unwrap_or(1.0),
            before_mute: None,
        }
    }

    /// Set volume level
    ///
    /// Values are clamped to [0, 1]; NaN and infinities are ignored.
    /// Returns `true` if the level was accepted.
    pub fn set_level(&mut self, level: f32) -> bool {
        let Some(level) = sanitize(level) else {
            return false;
        };
        self.level = level;
        if level > 0.0 {
            self.before_mute = None;
        }
        true
    }

    /// Get current volume level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Raise by `step`
    pub fn step_up(&mut self, step: f32) {
        self.set_level(self.level + step);
    }

    /// Lower by `step`
    pub fn step_down(&mut self, step: f32) {
        self.set_level(self.level - step);
    }

    /// Mute, or restore the level in effect before muting
    ///
    /// Unmuting with nothing remembered goes to full volume.
    pub fn toggle_mute(&mut self) {
        if self.level > 0.0 {
            self.before_mute = Some(self.level);
            self.level = 0.0;
        } else {
            self.level = self.before_mute.take().unwrap_or(1.0);
        }
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.level == 0.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize(level: f32) -> Option<f32> {
    level.is_finite().then(|| level.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_unit_range() {
        let mut volume = Volume::new(0.5);
        volume.set_level(1.7);
        assert_eq!(volume.level(), 1.0);

        volume.set_level(-0.2);
        assert_eq!(volume.level(), 0.0);

        assert_eq!(Volume::new(3.0).level(), 1.0);
    }

    #[test]
    fn nan_is_ignored() {
        let mut volume = Volume::new(0.3);
        assert!(!volume.set_level(f32::NAN));
        assert_eq!(volume.level(), 0.3);
        assert_eq!(Volume::new(f32::INFINITY).level(), 1.0);
    }

    #[test]
    fn steps_saturate() {
        let mut volume = Volume::new(0.95);
        volume.step_up(0.1);
        assert_eq!(volume.level(), 1.0);

        let mut volume = Volume::new(0.05);
        volume.step_down(0.1);
        assert_eq!(volume.level(), 0.0);
    }

    #[test]
    fn mute_restores_previous_level() {
        let mut volume = Volume::new(0.6);
        volume.toggle_mute();
        assert!(volume.is_muted());

        volume.toggle_mute();
        assert_eq!(volume.level(), 0.6);
    }

    #[test]
    fn unmute_without_memory_goes_full() {
        let mut volume = Volume::new(0.0);
        volume.toggle_mute();
        assert_eq!(volume.level(), 1.0);
    }
}
