/// Lower-cased title with every run of characters outside `[a-z0-9]`
/// collapsed to a single `-`, trimmed at both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "event".to_string()
    } else {
        slug
    }
}

/// `base`, then `base-2`, `base-3`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Grand Diwali 2024!"), "grand-diwali-2024");
        assert_eq!(slugify("  --Ram  Navami--  "), "ram-navami");
        assert_eq!(slugify("Annadanam & Seva"), "annadanam-seva");
        assert_eq!(slugify("!!!"), "event");
        assert_eq!(slugify("गणेश"), "event");
    }

    #[test]
    fn test_slug_candidate() {
        assert_eq!(slug_candidate("holi", 1), "holi");
        assert_eq!(slug_candidate("holi", 2), "holi-2");
        assert_eq!(slug_candidate("holi", 3), "holi-3");
    }
}
