//! Draft deduplication: normalize → signature exact match, then Jaccard token-set
//! similarity against the project's existing test cases and prior drafts.

use std::collections::HashSet;

use qa_config::constants::{DEDUPE_NEAR_DUPLICATE_THRESHOLD, DEDUPE_POTENTIAL_OVERLAP_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupeClassification {
    /// Exact signature match or similarity >= near-duplicate threshold: drop the draft.
    DuplicateSkipped { reason: String },
    /// Similarity between the two thresholds: keep it, but flag for human review.
    PotentialOverlap { reason: String },
    /// Below both thresholds: a genuinely new draft.
    Accepted,
}

/// Lowercases, collapses whitespace, and strips punctuation other than alphanumerics and
/// spaces, so "Log In!" and "log in" compare equal.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim().to_string()
}

/// `normalize(title) + "|" + normalize(description) + "|" + normalize(expected_outcome)`.
pub fn signature(title: &str, description: &str, expected_outcome: &str) -> String {
    format!(
        "{}|{}|{}",
        normalize(title),
        normalize(description),
        normalize(expected_outcome)
    )
}

/// Tokenizes `title + " " + description + " " + expected_outcome` into a `HashSet`.
pub fn token_set(title: &str, description: &str, expected_outcome: &str) -> HashSet<String> {
    normalize(&format!("{title} {description} {expected_outcome}"))
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// |A ∩ B| / |A ∪ B|. Two empty sets are defined as identical (similarity 1.0).
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

pub struct ExistingDraft<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub expected_outcome: &'a str,
}

/// Classifies a candidate draft against every existing published test case and
/// `Draft`-status draft in the project. `accepted_signatures` accumulates
/// across a synthesis batch so two near-identical candidates in the same batch don't both
/// get accepted — callers insert into it after each `Accepted`/`PotentialOverlap` verdict.
pub fn classify_candidate(
    candidate_title: &str,
    candidate_description: &str,
    candidate_expected_outcome: &str,
    existing: &[ExistingDraft<'_>],
    accepted_signatures: &HashSet<String>,
) -> DedupeClassification {
    let candidate_sig = signature(candidate_title, candidate_description, candidate_expected_outcome);
    if accepted_signatures.contains(&candidate_sig) {
        return DedupeClassification::DuplicateSkipped {
            reason: "Exact duplicate of an existing or already-generated test.".to_string(),
        };
    }

    let candidate_tokens = token_set(candidate_title, candidate_description, candidate_expected_outcome);
    let mut best_similarity = 0.0_f64;
    for other in existing {
        let other_sig = signature(other.title, other.description, other.expected_outcome);
        if other_sig == candidate_sig {
            return DedupeClassification::DuplicateSkipped {
                reason: "Exact duplicate of an existing or already-generated test.".to_string(),
            };
        }
        let other_tokens = token_set(other.title, other.description, other.expected_outcome);
        let similarity = jaccard_similarity(&candidate_tokens, &other_tokens);
        if similarity > best_similarity {
            best_similarity = similarity;
        }
    }

    let pct = (best_similarity * 100.0).round() as i64;
    if best_similarity >= DEDUPE_NEAR_DUPLICATE_THRESHOLD {
        DedupeClassification::DuplicateSkipped {
            reason: format!("Near-duplicate of existing coverage ({pct}% similarity)."),
        }
    } else if best_similarity >= DEDUPE_POTENTIAL_OVERLAP_THRESHOLD {
        DedupeClassification::PotentialOverlap {
            reason: format!("Potential overlap detected ({pct}% similarity)."),
        }
    } else {
        DedupeClassification::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(candidate: (&str, &str), existing: &[ExistingDraft<'_>]) -> DedupeClassification {
        classify_candidate(candidate.0, candidate.1, "", existing, &HashSet::new())
    }

    #[test]
    fn normalize_collapses_case_and_punctuation() {
        assert_eq!(normalize("Log In!!"), "log in");
        assert_eq!(normalize("  Multiple   spaces "), "multiple spaces");
    }

    #[test]
    fn exact_signature_match_is_duplicate() {
        let existing = vec![ExistingDraft {
            title: "Log in with valid credentials",
            description: "User logs in and sees the dashboard",
            expected_outcome: "",
        }];
        let result = classify(
            ("log in with valid credentials!", "user logs in and sees the dashboard."),
            &existing,
        );
        assert!(matches!(result, DedupeClassification::DuplicateSkipped { .. }));
    }

    #[test]
    fn highly_similar_but_not_identical_is_duplicate() {
        let existing = vec![ExistingDraft {
            title: "User can log in with valid credentials and reach the dashboard",
            description: "",
            expected_outcome: "",
        }];
        let result = classify(
            (
                "User can log in with valid credentials and reach the home dashboard",
                "",
            ),
            &existing,
        );
        assert!(matches!(result, DedupeClassification::DuplicateSkipped { .. }));
    }

    #[test]
    fn moderately_similar_is_potential_overlap() {
        // 7 of 8 tokens shared (union 9, intersection 7 => 0.778), inside [0.72, 0.88).
        let existing = vec![ExistingDraft {
            title: "alpha bravo charlie delta echo foxtrot golf hotel",
            description: "",
            expected_outcome: "",
        }];
        let result = classify(
            ("alpha bravo charlie delta echo foxtrot golf india", ""),
            &existing,
        );
        assert!(matches!(result, DedupeClassification::PotentialOverlap { .. }));
    }

    #[test]
    fn unrelated_draft_is_accepted() {
        let existing = vec![ExistingDraft {
            title: "User can log in with valid credentials",
            description: "Checks the login flow",
            expected_outcome: "",
        }];
        let result = classify(
            (
                "Checkout completes with a valid coupon code",
                "Apply a coupon at checkout and confirm the discounted total",
            ),
            &existing,
        );
        assert_eq!(result, DedupeClassification::Accepted);
    }

    #[test]
    fn no_existing_drafts_is_accepted() {
        let result = classify(("Anything", "At all"), &[]);
        assert_eq!(result, DedupeClassification::Accepted);
    }

    #[test]
    fn accepted_signatures_set_catches_in_batch_duplicates() {
        let mut accepted = HashSet::new();
        accepted.insert(signature("Checkout with coupon", "Apply code", ""));
        let result = classify_candidate("Checkout with coupon", "Apply code", "", &[], &accepted);
        assert!(matches!(result, DedupeClassification::DuplicateSkipped { .. }));
    }
}
