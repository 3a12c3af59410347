//! Counting documents that carry the configured "read" tag.

use crate::model::RemoteDocument;

/// Number of documents tagged with `tag` (case-insensitive, exact match).
///
/// Both sides are lower-cased. The remote service stores tag keys in lower
/// case, so this agrees with a lower-cased query against raw keys, and it
/// still matches if a key ever arrives in mixed case.
#[must_use]
pub fn count_matches(documents: &[RemoteDocument], tag: &str) -> usize {
    let wanted = tag.to_lowercase();
    documents
        .iter()
        .filter(|document| carries(document, &wanted))
        .count()
}

fn carries(document: &RemoteDocument, wanted: &str) -> bool {
    document
        .tag_keys()
        .any(|key| key == wanted || key.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<RemoteDocument> {
        vec![
            RemoteDocument::with_tags(["2024_read", "essays"]),
            RemoteDocument::with_tags(["essays"]),
            RemoteDocument::with_tags(["2024_read"]),
            RemoteDocument::with_tags(Vec::<String>::new()),
            RemoteDocument::with_tags(["2024_read_later"]),
        ]
    }

    #[test]
    fn query_case_does_not_matter() {
        let docs = docs();
        assert_eq!(count_matches(&docs, "2024_READ"), 2);
        assert_eq!(count_matches(&docs, "2024_read"), 2);
        assert_eq!(count_matches(&docs, "2024_Read"), 2);
    }

    #[test]
    fn no_partial_matches() {
        let docs = docs();
        assert_eq!(count_matches(&docs, "2024"), 0);
        assert_eq!(count_matches(&docs, "read"), 0);
    }

    #[test]
    fn mixed_case_keys_still_match() {
        let docs = vec![RemoteDocument::with_tags(["2024_Read"])];
        assert_eq!(count_matches(&docs, "2024_READ"), 1);
        assert_eq!(count_matches(&docs, "2024_read"), 1);
    }

    #[test]
    fn empty_input_counts_zero() {
        assert_eq!(count_matches(&[], "2024_READ"), 0);
    }

    #[test]
    fn count_is_order_independent() {
        let mut docs = docs();
        let forward = count_matches(&docs, "essays");
        docs.reverse();
        assert_eq!(count_matches(&docs, "essays"), forward);
        let singles: usize = docs
            .chunks(1)
            .map(|one| count_matches(one, "essays"))
            .sum();
        assert_eq!(forward, singles);
    }
}
