use indexmap::IndexMap;

/// Default priority labels, highest first
pub const DEFAULT_PRIORITIES: [&str; 5] = ["Critical", "High", "Medium", "Low", "Chill"];

/// Default category labels
pub const DEFAULT_CATEGORIES: [&str; 6] = ["Work", "Personal", "Study", "Health", "Shopping", "Fun"];

/// Priority given to new tasks when none is specified
pub const DEFAULT_PRIORITY: &str = "Medium";

/// Category given to new tasks when none is specified
pub const DEFAULT_CATEGORY: &str = "Work";

pub const DEFAULT_COLORS: [(&str, &str); 8] = [
    ("dark_bg", "#1a1a1a"),
    ("light_bg", "#2d2d2d"),
    ("accent_dark", "#8b0000"),
    ("accent_light", "#ff4d4d"),
    ("text", "#f0f0f0"),
    ("highlight", "#ff9999"),
    ("completed", "#4d4d4d"),
    ("selected", "#660000"),
];

pub fn default_priorities() -> Vec<String> {
    DEFAULT_PRIORITIES.iter().map(|s| s.to_string()).collect()
}

pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

pub fn default_colors() -> IndexMap<String, String> {
    DEFAULT_COLORS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Sort rank of a priority label. Unknown labels rank after every known one.
pub fn priority_rank(priorities: &[String], label: &str) -> usize {
    priorities
        .iter()
        .position(|p| p == label)
        .unwrap_or(priorities.len())
}

/// Pick the default label for a vocabulary: the preferred one if present,
/// otherwise the first entry.
pub fn pick_default<'a>(vocab: &'a [String], preferred: &str) -> Option<&'a str> {
    vocab
        .iter()
        .find(|l| *l == preferred)
        .or_else(|| vocab.first())
        .map(|s| s.as_str())
}
