//! Session presets
//!
//! Named session/break pairs. Every preset stays inside the 1..=60 minute
//! window the front-end accepts.

/// Named session/break rhythm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Pomodoro: 25 min focus, 5 min break - sustainable rhythm
    #[default]
    Pomodoro,
    /// Deep: 50 min focus, 10 min break - long stretches of concentration
    Deep,
    /// Quick: 15 min focus, 3 min break - fast iteration
    Quick,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Pomodoro, Preset::Deep, Preset::Quick];

    /// Session length in minutes
    pub fn session_minutes(&self) -> u32 {
        match self {
            Preset::Pomodoro => 25,
            Preset::Deep => 50,
            Preset::Quick => 15,
        }
    }

    /// Break length in minutes
    pub fn break_minutes(&self) -> u32 {
        match self {
            Preset::Pomodoro => 5,
            Preset::Deep => 10,
            Preset::Quick => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Pomodoro => "pomodoro",
            Preset::Deep => "deep",
            Preset::Quick => "quick",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pomodoro" => Some(Preset::Pomodoro),
            "deep" => Some(Preset::Deep),
            "quick" => Some(Preset::Quick),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Pomodoro => "Sustainable rhythm, good for maintenance work",
            Preset::Deep => "Long stretches, for complex problems",
            Preset::Quick => "Fast iteration, for small tasks",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomo_core::config::{MAX_DURATION_SECS, MIN_DURATION_SECS};

    #[test]
    fn test_preset_durations() {
        assert_eq!(Preset::Pomodoro.session_minutes(), 25);
        assert_eq!(Preset::Pomodoro.break_minutes(), 5);
        assert_eq!(Preset::Quick.session_minutes(), 15);
        assert_eq!(Preset::Quick.break_minutes(), 3);
        assert_eq!(Preset::default(), Preset::Pomodoro);
    }

    #[test]
    fn test_presets_fit_the_accepted_window() {
        for preset in Preset::ALL {
            for minutes in [preset.session_minutes(), preset.break_minutes()] {
                let secs = minutes * 60;
                assert!((MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs));
            }
        }
    }

    #[test]
    fn test_preset_names() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.as_str()), Some(preset));
        }
        assert_eq!(Preset::from_name("DEEP"), Some(Preset::Deep));
        assert_eq!(Preset::from_name("marathon"), None);
    }
}
