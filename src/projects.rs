//! Project naming
//!
//! Cards are scoped to a project, identified on disk by a slug derived from
//! the project's title.

const FALLBACK_SLUG: &str = "untitled_project";

/// Convert a title to a snake_case slug
///
/// "Learn Discrete Mathematics" -> "learn_discrete_mathematics"
pub fn project_slug(title: &str) -> String {
    let spaced: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' { c } else { ' ' })
        .collect();

    let slug = spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .trim_matches('_')
        .to_string();

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Whether `name` is already a slug and safe to use as a directory name
pub fn is_valid_slug(name: &str) -> bool {
    !name.is_empty() && project_slug(name) == name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_slug() {
        assert_eq!(project_slug("Learn Discrete Mathematics"), "learn_discrete_mathematics");
        assert_eq!(project_slug("  Rust: Ownership & Borrowing!  "), "rust_ownership_borrowing");
        assert_eq!(project_slug("_already_snake_"), "already_snake");
        assert_eq!(project_slug("Master Quantum Physics in 30 days"), "master_quantum_physics_in_30_days");
    }

    #[test]
    fn test_empty_titles_fall_back() {
        assert_eq!(project_slug(""), FALLBACK_SLUG);
        assert_eq!(project_slug("!!!"), FALLBACK_SLUG);
        assert_eq!(project_slug("日本語"), FALLBACK_SLUG);
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("learn_rust"));
        assert!(is_valid_slug("rust_2024"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Learn Rust"));
        assert!(!is_valid_slug("../outside"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("_leading"));
    }
}
