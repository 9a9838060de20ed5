//! Locate a target phrase among recognized tokens.
//!
//! Exact matches (normalized equality) are always preferred over partial
//! matches (substring in either direction). Within a group the highest
//! confidence wins; the first of equally confident candidates is kept.

use crate::normalize::normalize;
use crate::types::{RecognizedToken, Region};
use tracing::debug;

/// Minimum confidence a token needs to participate in matching.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Find the best matching token for `target` and return its bounding box,
/// in the coordinate space of the image the tokens came from.
pub fn locate(
    tokens: &[RecognizedToken],
    target: &str,
    confidence_threshold: f32,
) -> Option<Region> {
    let wanted = normalize(target);

    let mut exact: Vec<&RecognizedToken> = Vec::new();
    let mut partial: Vec<&RecognizedToken> = Vec::new();

    for token in tokens {
        if token.confidence < confidence_threshold {
            continue;
        }
        let label = normalize(&token.text);
        if label == wanted {
            exact.push(token);
        } else if label.contains(wanted.as_str()) || wanted.contains(label.as_str()) {
            partial.push(token);
        }
    }

    let (pool, kind) = if exact.is_empty() {
        (partial, "partial")
    } else {
        (exact, "exact")
    };

    match highest_confidence(&pool) {
        Some(best) => {
            debug!(
                "{kind} match for '{target}': '{}' at {} (confidence {:.2})",
                best.text, best.region, best.confidence
            );
            Some(best.region)
        }
        None => {
            debug!("'{target}' not found among {} tokens", tokens.len());
            None
        }
    }
}

// Ties keep the first candidate in scan order.
fn highest_confidence<'a>(pool: &[&'a RecognizedToken]) -> Option<&'a RecognizedToken> {
    let mut best: Option<&RecognizedToken> = None;
    for token in pool {
        match best {
            Some(current) if token.confidence <= current.confidence => {}
            _ => best = Some(token),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, x: i32, y: i32, w: u32, h: u32, conf: f32) -> RecognizedToken {
        RecognizedToken::new(text, Region::new(x, y, w, h), conf)
    }

    #[test]
    fn test_exact_match_filters_low_confidence() {
        let tokens = vec![
            token("OK", 0, 0, 10, 10, 0.95),
            token("OK", 50, 50, 10, 10, 0.5),
        ];
        assert_eq!(
            locate(&tokens, "OK", 0.7),
            Some(Region::new(0, 0, 10, 10))
        );
    }

    #[test]
    fn test_partial_match_when_no_exact() {
        let tokens = vec![token("Submit Now", 0, 0, 20, 10, 0.9)];
        assert_eq!(
            locate(&tokens, "submit", 0.7),
            Some(Region::new(0, 0, 20, 10))
        );
    }

    #[test]
    fn test_partial_match_other_direction() {
        // The token text may also be a fragment of the target.
        let tokens = vec![token("Регистрация", 5, 5, 90, 20, 0.8)];
        assert_eq!(
            locate(&tokens, "«Вход/Регистрация»", 0.7),
            Some(Region::new(5, 5, 90, 20))
        );
    }

    #[test]
    fn test_exact_preferred_over_stronger_partial() {
        let tokens = vec![
            token("Save All", 0, 0, 40, 10, 0.99),
            token("Save", 100, 0, 20, 10, 0.75),
        ];
        assert_eq!(
            locate(&tokens, "save", 0.7),
            Some(Region::new(100, 0, 20, 10))
        );
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let tokens = vec![
            token("Open", 0, 0, 10, 10, 0.9),
            token("Open", 30, 30, 10, 10, 0.9),
        ];
        assert_eq!(
            locate(&tokens, "open", 0.7),
            Some(Region::new(0, 0, 10, 10))
        );
    }

    #[test]
    fn test_normalization_applies_to_both_sides() {
        let tokens = vec![token("«Вход»", 10, 10, 50, 20, 0.92)];
        assert_eq!(
            locate(&tokens, "  'вход.'  ", 0.7),
            Some(Region::new(10, 10, 50, 20))
        );
    }

    #[test]
    fn test_empty_tokens_return_none() {
        assert_eq!(locate(&[], "anything", 0.7), None);
    }

    #[test]
    fn test_no_match_returns_none() {
        let tokens = vec![token("Cancel", 0, 0, 10, 10, 0.9)];
        assert_eq!(locate(&tokens, "submit", 0.7), None);
    }

    #[test]
    fn test_everything_below_threshold_returns_none() {
        let tokens = vec![token("Submit", 0, 0, 10, 10, 0.69)];
        assert_eq!(locate(&tokens, "submit", DEFAULT_CONFIDENCE_THRESHOLD), None);
    }
}
