//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format resolution paths, type names,
//! and suggestions for keys that were probably mistyped.

/// Renders a resolution path as a readable string.
///
/// # Examples
/// ```
/// use khazina_support::rendering::render_chain;
///
/// let chain = vec!["user_service", "user_repo", "database"];
/// let rendered = render_chain(&chain);
/// assert_eq!(rendered, "user_service → user_repo → database");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use khazina_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut current_segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                // path prefix, keep only the last segment
                current_segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '&' => {
                result.push_str(&current_segment);
                result.push(ch);
                current_segment.clear();
            }
            _ => current_segment.push(ch),
        }
    }

    result.push_str(&current_segment);
    result
}

/// Suggests registered keys that look like `requested`.
///
/// Scores by substring containment first, then shared prefix, then a
/// loose character-overlap check. At most `max_suggestions` keys are
/// returned, best match first.
///
/// ```
/// use khazina_support::rendering::suggest_similar;
///
/// let available = ["database", "logger", "user_service"];
/// let suggestions = suggest_similar("databse", &available, 3);
/// assert_eq!(suggestions, vec!["database".to_string()]);
/// ```
pub fn suggest_similar(
    requested: &str,
    available: &[impl AsRef<str>],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    if requested_lower.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| *name != requested)
        .filter_map(|name| {
            let name_lower = name.to_lowercase();

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            let common = name_lower
                .chars()
                .zip(requested_lower.chars())
                .take_while(|(a, b)| a == b)
                .count();
            if common >= 3 {
                return Some((name, common * 10));
            }

            if is_close(&requested_lower, &name_lower) {
                return Some((name, 10));
            }

            None
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Quick "edit distance is small" heuristic: lengths within 3 and at
/// least 60% of the positions agree.
fn is_close(a: &str, b: &str) -> bool {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a_len.abs_diff(b_len) > 3 {
        return false;
    }

    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return true;
    }

    let common = a.chars().zip(b.chars()).filter(|(ca, cb)| ca == cb).count();
    common * 100 / max_len >= 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_simple_chain() {
        let chain = vec!["a", "b", "c"];
        assert_eq!(render_chain(&chain), "a → b → c");
    }

    #[test]
    fn render_empty_chain() {
        let chain: Vec<&str> = vec![];
        assert_eq!(render_chain(&chain), "");
    }

    #[test]
    fn shorten_simple_path() {
        assert_eq!(shorten_type_name("my_app::services::UserService"), "UserService");
    }

    #[test]
    fn shorten_with_generics() {
        assert_eq!(
            shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
            "Arc<dyn Logger>"
        );
    }

    #[test]
    fn shorten_no_path() {
        assert_eq!(shorten_type_name("i32"), "i32");
    }

    #[test]
    fn suggest_substring_first() {
        let available = vec!["user_service", "user_repository", "logger"];
        let suggestions = suggest_similar("service", &available, 3);
        assert_eq!(suggestions[0], "user_service");
    }

    #[test]
    fn suggest_typo() {
        let available = vec!["config", "database"];
        let suggestions = suggest_similar("confgi", &available, 3);
        assert_eq!(suggestions, vec!["config".to_string()]);
    }

    #[test]
    fn suggest_skips_exact_and_unrelated() {
        let available = vec!["database", "xyz"];
        assert!(suggest_similar("database", &available, 3).is_empty());
        assert!(suggest_similar("qwertyuiop", &available, 3).is_empty());
    }

    #[test]
    fn suggest_respects_limit() {
        let available = vec!["cache_a", "cache_b", "cache_c"];
        assert_eq!(suggest_similar("cache", &available, 2).len(), 2);
    }
}
