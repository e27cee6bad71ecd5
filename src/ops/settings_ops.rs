use std::fmt;

use crate::model::store::TaskStore;

/// Which label list an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabKind {
    Category,
    Priority,
}

impl fmt::Display for VocabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabKind::Category => write!(f, "category"),
            VocabKind::Priority => write!(f, "priority"),
        }
    }
}

/// Error type for vocabulary and theme edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} label cannot be empty")]
    EmptyLabel(VocabKind),
    #[error("{kind} '{label}' already exists")]
    DuplicateLabel { kind: VocabKind, label: String },
    #[error("{kind} '{label}' not found")]
    UnknownLabel { kind: VocabKind, label: String },
    #[error("cannot remove the last {0}")]
    LastLabel(VocabKind),
    #[error("unknown color key: {0}")]
    UnknownColor(String),
    #[error("invalid color '{0}': expected #rgb or #rrggbb")]
    InvalidColor(String),
}

fn vocab_mut(store: &mut TaskStore, kind: VocabKind) -> &mut Vec<String> {
    match kind {
        VocabKind::Category => &mut store.categories,
        VocabKind::Priority => &mut store.priorities,
    }
}

pub fn vocab(store: &TaskStore, kind: VocabKind) -> &[String] {
    match kind {
        VocabKind::Category => &store.categories,
        VocabKind::Priority => &store.priorities,
    }
}

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// Append a label. Existing tasks are not touched.
pub fn add_label(store: &mut TaskStore, kind: VocabKind, label: &str) -> Result<(), SettingsError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(SettingsError::EmptyLabel(kind));
    }
    let list = vocab_mut(store, kind);
    if list.iter().any(|l| l == label) {
        return Err(SettingsError::DuplicateLabel {
            kind,
            label: label.to_string(),
        });
    }
    list.push(label.to_string());
    store.log(format!("Added {}: {}", kind, label));
    Ok(())
}

/// Remove a label. Tasks still carrying it keep it; for priorities they
/// simply sort last.
pub fn remove_label(
    store: &mut TaskStore,
    kind: VocabKind,
    label: &str,
) -> Result<(), SettingsError> {
    let list = vocab_mut(store, kind);
    let pos = list
        .iter()
        .position(|l| l == label)
        .ok_or_else(|| SettingsError::UnknownLabel {
            kind,
            label: label.to_string(),
        })?;
    if list.len() == 1 {
        return Err(SettingsError::LastLabel(kind));
    }
    list.remove(pos);
    store.log(format!("Removed {}: {}", kind, label));
    Ok(())
}

/// Move a label to `position` (0-based, clamped to the end)
pub fn move_label(
    store: &mut TaskStore,
    kind: VocabKind,
    label: &str,
    position: usize,
) -> Result<(), SettingsError> {
    let list = vocab_mut(store, kind);
    let pos = list
        .iter()
        .position(|l| l == label)
        .ok_or_else(|| SettingsError::UnknownLabel {
            kind,
            label: label.to_string(),
        })?;
    let item = list.remove(pos);
    let target = position.min(list.len());
    list.insert(target, item);
    store.log(format!("Moved {} {} to position {}", kind, label, target + 1));
    Ok(())
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Simple format check for `#rgb` / `#rrggbb`
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Set one of the known theme colours
pub fn set_color(store: &mut TaskStore, key: &str, value: &str) -> Result<(), SettingsError> {
    let value = value.trim();
    if !is_hex_color(value) {
        return Err(SettingsError::InvalidColor(value.to_string()));
    }
    let slot = store
        .colors
        .get_mut(key)
        .ok_or_else(|| SettingsError::UnknownColor(key.to_string()))?;
    *slot = value.to_lowercase();
    store.log(format!("Changed color {} to {}", key, value.to_lowercase()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vocab::default_priorities;

    #[test]
    fn add_label_rejects_blank_and_duplicates() {
        let mut store = TaskStore::new();
        add_label(&mut store, VocabKind::Category, " Garden ").unwrap();
        assert_eq!(store.categories.last().map(String::as_str), Some("Garden"));
        assert_eq!(
            add_label(&mut store, VocabKind::Category, "Garden"),
            Err(SettingsError::DuplicateLabel {
                kind: VocabKind::Category,
                label: "Garden".into()
            })
        );
        assert_eq!(
            add_label(&mut store, VocabKind::Priority, ""),
            Err(SettingsError::EmptyLabel(VocabKind::Priority))
        );
        assert_eq!(store.activity().len(), 1);
    }

    #[test]
    fn remove_label_keeps_at_least_one() {
        let mut store = TaskStore::new();
        store.priorities = vec!["Only".into()];
        assert_eq!(
            remove_label(&mut store, VocabKind::Priority, "Only"),
            Err(SettingsError::LastLabel(VocabKind::Priority))
        );
        assert_eq!(
            remove_label(&mut store, VocabKind::Priority, "Missing"),
            Err(SettingsError::UnknownLabel {
                kind: VocabKind::Priority,
                label: "Missing".into()
            })
        );

        let mut store = TaskStore::new();
        remove_label(&mut store, VocabKind::Priority, "Chill").unwrap();
        assert_eq!(store.priorities.len(), default_priorities().len() - 1);
    }

    #[test]
    fn move_label_reorders_priorities() {
        let mut store = TaskStore::new();
        move_label(&mut store, VocabKind::Priority, "Low", 0).unwrap();
        assert_eq!(store.priorities[0], "Low");
        assert_eq!(store.priorities[1], "Critical");

        move_label(&mut store, VocabKind::Priority, "Low", 99).unwrap();
        assert_eq!(store.priorities.last().map(String::as_str), Some("Low"));
    }

    #[test]
    fn set_color_checks_key_and_format() {
        let mut store = TaskStore::new();
        set_color(&mut store, "text", "#ABCDEF").unwrap();
        assert_eq!(store.colors["text"], "#abcdef");
        set_color(&mut store, "text", "#fff").unwrap();
        assert_eq!(
            set_color(&mut store, "text", "white"),
            Err(SettingsError::InvalidColor("white".into()))
        );
        assert_eq!(
            set_color(&mut store, "border", "#000000"),
            Err(SettingsError::UnknownColor("border".into()))
        );
    }

    #[test]
    fn hex_color_format() {
        assert!(is_hex_color("#1a1a1a"));
        assert!(is_hex_color("#FFF"));
        assert!(!is_hex_color("1a1a1a"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#gggggg"));
    }
}
