use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Pair count and time budget in seconds.
    pub fn config(self) -> (usize, u32) {
        match self {
            Difficulty::Easy => (3, 60),
            Difficulty::Medium => (6, 120),
            Difficulty::Hard => (10, 180),
        }
    }

    pub fn seconds(self) -> u32 {
        self.config().1
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

}

/// Formats seconds as `M:SS`.
pub fn format_clock(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(Difficulty::Easy.config(), (3, 60));
        assert_eq!(Difficulty::Medium.config(), (6, 120));
        assert_eq!(Difficulty::Hard.config(), (10, 180));
    }

    #[test]
    fn settings_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
        let hard: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(hard, Difficulty::Hard);
        assert!(serde_json::from_str::<Difficulty>("\"expert\"").is_err());
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(125), "2:05");
        assert_eq!(format_clock(180), "3:00");
    }
}
