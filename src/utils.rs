/// First `max` characters of `s` (not bytes), borrowed.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Shorten for terminal display, marking the cut with "...".
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", truncate_chars(s, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("ação", 10), "ação");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn ellipsize_marks_cut() {
        assert_eq!(ellipsize("Educação", 4), "Educ...");
        assert_eq!(ellipsize("Saúde", 5), "Saúde");
    }
}
