//! Page ordering for rasterized page images
//!
//! Page images are named after their page number (`page-1.png`, `page-2.png`,
//! ...). Batches are processed in ascending numeric page order, so that
//! `page-10` comes after `page-9`.

use std::cmp::Ordering;

/// Page number embedded in an image identifier
///
/// Uses the last run of digits in the file stem (the part after the last
/// path separator, before the extension).
///
/// # Examples
///
/// ```
/// use actes_domain::page_index;
///
/// assert_eq!(page_index("page-3.png"), Some(3));
/// assert_eq!(page_index("images/page-12.png"), Some(12));
/// assert_eq!(page_index("cover.png"), None);
/// ```
pub fn page_index(identifier: &str) -> Option<u64> {
    let file_name = identifier
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or(identifier);
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };

    let end = stem.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = stem[..end]
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);

    stem[start..end].parse().ok()
}

/// Compare two identifiers by page number
///
/// Identifiers without a page number sort after numbered ones, by name.
pub fn compare_by_page_index(a: &str, b: &str) -> Ordering {
    match (page_index(a), page_index(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sort identifiers in ascending page order
pub fn sort_by_page_index<T: AsRef<str>>(items: &mut [T]) {
    items.sort_by(|a, b| compare_by_page_index(a.as_ref(), b.as_ref()));
}
