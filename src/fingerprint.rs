//! Stable deduplication keys for aggregated items.
//!
//! Two entries are the same story when they point at the same host and their
//! headlines agree once case, punctuation and spacing are ignored. The key is
//! a SHA-256 hex digest of `host|normalized title`.

use crate::utils::{collapse_whitespace, host_of};
use sha2::{Digest, Sha256};

/// Lowercase, collapse whitespace, then drop everything outside `[a-z0-9 ]`.
pub fn normalize_title(title: &str) -> String {
    collapse_whitespace(&title.to_lowercase())
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect()
}

/// Deduplication key for an item with `title` pointing at `link`.
pub fn fingerprint(title: &str, link: &str) -> String {
    let key = format!("{}|{}", host_of(link), normalize_title(title));
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Hello World"), "hello world");
        assert_eq!(normalize_title("  hello,   world! "), "hello world");
        assert_eq!(normalize_title("COVID-19: new data"), "covid19 new data");
    }

    #[test]
    fn test_punctuation_and_case_collide() {
        assert_eq!(
            fingerprint("Hello World", "http://x.com/1"),
            fingerprint("hello, world!", "http://x.com/1")
        );
    }

    #[test]
    fn test_same_title_different_host_differs() {
        assert_ne!(
            fingerprint("Hello World", "http://x.com/1"),
            fingerprint("Hello World", "http://y.com/1")
        );
    }

    #[test]
    fn test_path_does_not_matter() {
        assert_eq!(
            fingerprint("Trial results", "https://nih.gov/a"),
            fingerprint("Trial results", "https://NIH.gov/b?utm=1")
        );
    }

    #[test]
    fn test_hex_digest_shape() {
        let fp = fingerprint("t", "https://a.org");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unparseable_link_uses_empty_host() {
        assert_eq!(fingerprint("Same", "nope"), fingerprint("same", ""));
    }

    proptest! {
        #[test]
        fn prop_equal_iff_host_and_title_match(
            t1 in "[A-Za-z ,!]{0,20}",
            t2 in "[A-Za-z ,!]{0,20}",
            h1 in prop::sample::select(vec!["a.com", "b.org", "A.com"]),
            h2 in prop::sample::select(vec!["a.com", "b.org", "A.com"]),
        ) {
            let l1 = format!("https://{h1}/p");
            let l2 = format!("https://{h2}/q");
            let same_inputs = host_of(&l1) == host_of(&l2) && normalize_title(&t1) == normalize_title(&t2);
            prop_assert_eq!(fingerprint(&t1, &l1) == fingerprint(&t2, &l2), same_inputs);
        }
    }
}
