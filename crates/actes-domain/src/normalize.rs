//! Text normalization for comparison keys
//!
//! Two pieces of free-form text are considered the same for matching purposes
//! when their normalized keys are equal or one contains the other.

/// Canonicalize free-form text into a comparable key
///
/// Steps, in order: transliterate to ASCII, drop whitespace, drop commas,
/// drop hyphens, lower-case. Total on any input; empty input yields an empty
/// key.
///
/// # Examples
///
/// ```
/// use actes_domain::normalize;
///
/// assert_eq!(normalize("Jean-Paul Dupont"), "jeanpauldupont");
/// assert_eq!(normalize("JEAN PAUL, DUPONT"), "jeanpauldupont");
/// assert_eq!(normalize("Rue de l'Église"), "ruedel'eglise");
/// ```
pub fn normalize(text: &str) -> String {
    deunicode::deunicode(text)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '-')
        .collect::<String>()
        .to_lowercase()
}
