//! Duplicate detection for generated cards
//!
//! Two cards in the same project are duplicates when their fronts normalize
//! to the same key. Duplicates are dropped, never merged.

use std::collections::HashSet;

use super::models::{Card, NewCard};

/// Dedup key for a card front: trimmed, whitespace collapsed, lowercased
pub fn normalize_front(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Keep the incoming cards whose front is new to the project
///
/// Returns the kept cards, in input order, and how many were discarded.
/// An incoming card also counts as a duplicate of an earlier incoming card.
pub fn dedup_new_cards(existing: &[Card], incoming: Vec<NewCard>) -> (Vec<NewCard>, usize) {
    let mut seen: HashSet<String> = existing.iter().map(|c| normalize_front(&c.front)).collect();
    let total = incoming.len();

    let kept: Vec<NewCard> = incoming
        .into_iter()
        .filter(|card| seen.insert(normalize_front(&card.front)))
        .collect();

    let discarded = total - kept.len();
    (kept, discarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_normalize_front() {
        assert_eq!(normalize_front("  What is   Ownership?\n"), "what is ownership?");
        assert_eq!(normalize_front("a\tb"), "a b");
        assert_eq!(normalize_front(""), "");
    }

    #[test]
    fn test_dedup_against_existing_cards() {
        let existing = vec![Card::new("rust", "What is a trait?".into(), "An interface".into(), Utc::now())];
        let incoming = vec![
            NewCard::new("what is a  TRAIT?", "Something else"),
            NewCard::new("What is a lifetime?", "A scope"),
        ];

        let (kept, discarded) = dedup_new_cards(&existing, incoming);

        assert_eq!(discarded, 1);
        assert_eq!(kept, vec![NewCard::new("What is a lifetime?", "A scope")]);
    }

    #[test]
    fn test_dedup_within_batch_keeps_first() {
        let incoming = vec![
            NewCard::new("Borrow checker", "first"),
            NewCard::new("borrow checker ", "second"),
            NewCard::new("Cargo", "build tool"),
        ];

        let (kept, discarded) = dedup_new_cards(&[], incoming);

        assert_eq!(discarded, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].back, "first");
    }
}
