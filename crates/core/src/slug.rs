//! Slug derivation for post URLs.

/// Minimum slug length before dash trimming; shorter slugs are padded.
pub const MIN_SLUG_LENGTH: usize = 3;

/// Derive a URL slug from a post title.
///
/// Lowercases the title, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, pads with `-x` until the result reaches
/// [`MIN_SLUG_LENGTH`], then trims leading and trailing dashes.
///
/// # Examples
///
/// ```
/// use pressroom_core::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("Nouvelle année, nouveau site"), "nouvelle-ann-e-nouveau-site");
/// assert_eq!(slugify("a"), "a-x");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut last_was_dash = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.len() < MIN_SLUG_LENGTH {
        slug.push_str("-x");
    }
    slug.trim_matches('-').to_string()
}
