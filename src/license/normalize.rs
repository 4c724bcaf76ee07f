use std::sync::LazyLock;

use regex::Regex;

/// Matches Trove classifier boilerplate on an already case-folded, whitespace-collapsed
/// string: `license :: osi approved :: ` or the bare `license :: `.
static CLASSIFIER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^license ?:: ?(?:osi approved ?:: ?)?").expect("static regex")
});

/// Turn a raw license string into its lookup key.
///
/// Trims, collapses whitespace runs to one space, lowercases, then strips the
/// classifier prefix (`License :: OSI Approved :: `, `License :: `) until none is
/// left. Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mut key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    while let Some(prefix) = CLASSIFIER_PREFIX.find(&key) {
        key = key[prefix.end()..].trim_start().to_string();
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trim_and_collapse() {
        assert_eq!(normalize("  BSD   License  "), "bsd license");
        assert_eq!(normalize("BSD\t\nLicense"), "bsd license");
    }

    #[test]
    fn test_case_fold() {
        assert_eq!(normalize("Apache-2.0"), "apache-2.0");
        assert_eq!(normalize("GPL"), normalize("gpl"));
    }

    #[test]
    fn test_strip_osi_prefix() {
        assert_eq!(normalize("License :: OSI Approved :: BSD License"), "bsd license");
        assert_eq!(normalize("license::osi approved::MIT License"), "mit license");
        assert_eq!(
            normalize("License :: CC0 1.0 Universal (CC0 1.0) Public Domain Dedication"),
            "cc0 1.0 universal (cc0 1.0) public domain dedication"
        );
    }

    #[test]
    fn test_repeated_prefix() {
        assert_eq!(
            normalize("License :: OSI Approved :: License :: OSI Approved :: MIT License"),
            "mit license"
        );
    }

    #[test]
    fn test_prefix_only() {
        assert_eq!(normalize("License :: OSI Approved ::"), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_word_license_kept() {
        assert_eq!(normalize("License"), "license");
        assert_eq!(normalize("Licensed under MIT"), "licensed under mit");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn normalize_is_idempotent(s in "\\PC{0,80}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_ignores_outer_whitespace(s in "[a-zA-Z0-9 .:-]{0,40}") {
            prop_assert_eq!(normalize(&format!("  {}\t", s)), normalize(&s));
        }
    }
}
