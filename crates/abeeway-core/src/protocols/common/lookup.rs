use serde::Serialize;

/// Description used when a code falls outside its catalog.
pub const UNKNOWN_DESCRIPTION: &str = "UNKNOWN";

/// Enumerated code paired with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageLookup {
    pub code: i64,
    pub description: String,
}

impl MessageLookup {
    /// Code-zero record carrying a free-form description, used for
    /// unsupported message, position, and tag values.
    pub fn unsupported(description: impl Into<String>) -> Self {
        Self {
            code: 0,
            description: description.into(),
        }
    }
}

/// Look `code` up in an ordered catalog.
///
/// # Examples
/// ```
/// use abeeway_core::message;
///
/// assert_eq!(message(1, &["A", "B"]).description, "B");
/// assert_eq!(message(2, &["A", "B"]).description, "UNKNOWN");
/// assert_eq!(message(-1, &["A", "B"]).description, "UNKNOWN");
/// ```
pub fn message(code: i64, catalog: &[&str]) -> MessageLookup {
    let description = usize::try_from(code)
        .ok()
        .and_then(|index| catalog.get(index))
        .copied()
        .unwrap_or(UNKNOWN_DESCRIPTION);
    MessageLookup {
        code,
        description: description.to_string(),
    }
}
