use std::fmt::Display;

/// The priority of an initiative, as declared in the backlog.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

// Labels are accepted in English and in Portuguese.
const HIGH_LABELS: [&str; 2] = ["High", "Alta"];
const MEDIUM_LABELS: [&str; 2] = ["Medium", "Média"];

impl Priority {
    /// Maps a free-text label to a priority.
    ///
    /// Surrounding whitespace is ignored. Anything that is not a known label
    /// for `High` or `Medium` (including the empty string) is `Low`.
    pub fn normalize(label: &str) -> Priority {
        let norm = label.trim();
        if HIGH_LABELS.contains(&norm) {
            Priority::High
        } else if MEDIUM_LABELS.contains(&norm) {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// The rank used for ordering: higher comes first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl From<&str> for Priority {
    fn from(label: &str) -> Self {
        Priority::normalize(label)
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
