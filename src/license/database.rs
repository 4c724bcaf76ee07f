//! Loading and validating the alias and ambiguity databases.
//!
//! Both documents are JSON objects with a free-form `meta` section and one keyed
//! section (`aliases` or `ambiguities`). Loading is all-or-nothing: any structural
//! problem or duplicated surface form aborts with a [`DatabaseError`] and no
//! partially built [`LicenseDb`] is ever handed out.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Claim, DatabaseError, Document};
use crate::license::normalize::normalize;
use crate::models::{AliasEntry, AmbiguityEntry, CanonicalLicense};

/// Alias table compiled into the binary.
pub const BUILTIN_ALIASES: &str = include_str!("../../data/aliases.json");
/// Ambiguity table compiled into the binary.
pub const BUILTIN_AMBIGUITIES: &str = include_str!("../../data/ambiguities.json");

/// Provenance and disclaimer fields, kept verbatim.
pub type Meta = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Document shape
// ---------------------------------------------------------------------------

/// A keyed section kept in document order. Repeated keys are remembered rather
/// than silently overwritten so the loader can report them.
#[derive(Debug, Default)]
struct Entries {
    items: Vec<(String, Value)>,
    duplicate: Option<String>,
}

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by license or problem name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entries, A::Error> {
                let mut seen = HashSet::new();
                let mut entries = Entries::default();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    if !seen.insert(key.clone()) && entries.duplicate.is_none() {
                        entries.duplicate = Some(key.clone());
                    }
                    entries.items.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Deserialize)]
struct AliasDocument {
    #[serde(default)]
    meta: Meta,
    aliases: Entries,
}

#[derive(Deserialize)]
struct AmbiguityDocument {
    #[serde(default)]
    meta: Meta,
    ambiguities: Entries,
}

#[derive(Deserialize)]
struct RawAlias {
    aliases: Vec<String>,
}

#[derive(Deserialize)]
struct RawAmbiguity {
    aliases: Vec<String>,
    problem: String,
}

/// Validate the section-level invariants and hand back the entries one by one.
fn checked_entries(
    document: Document,
    entries: Entries,
) -> Result<Vec<(String, Value)>, DatabaseError> {
    if let Some(key) = entries.duplicate {
        return Err(DatabaseError::malformed(
            document,
            Some(&key),
            "key appears more than once",
        ));
    }
    for (key, _) in &entries.items {
        if normalize(key).is_empty() {
            return Err(DatabaseError::malformed(
                document,
                Some(key),
                "key is empty after normalization",
            ));
        }
    }
    Ok(entries.items)
}

fn parse_entry<T: for<'de> Deserialize<'de>>(
    document: Document,
    key: &str,
    value: Value,
) -> Result<T, DatabaseError> {
    serde_json::from_value(value)
        .map_err(|e| DatabaseError::malformed(document, Some(key), e.to_string()))
}

fn check_aliases(document: Document, key: &str, aliases: &[String]) -> Result<(), DatabaseError> {
    if let Some(empty) = aliases.iter().find(|a| normalize(a).is_empty()) {
        return Err(DatabaseError::malformed(
            document,
            Some(key),
            format!("alias {:?} is empty after normalization", empty),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// The two databases
// ---------------------------------------------------------------------------

/// Canonical licenses and their alternate spellings.
#[derive(Debug, Clone)]
pub struct AliasDatabase {
    pub meta: Meta,
    pub entries: Vec<AliasEntry>,
}

impl AliasDatabase {
    /// Parse and validate an alias document.
    pub fn from_json(source: &str) -> Result<Self, DatabaseError> {
        let doc: AliasDocument = serde_json::from_str(source)
            .map_err(|e| DatabaseError::malformed(Document::Aliases, None, e.to_string()))?;

        let mut entries = Vec::new();
        for (key, value) in checked_entries(Document::Aliases, doc.aliases)? {
            let raw: RawAlias = parse_entry(Document::Aliases, &key, value)?;
            check_aliases(Document::Aliases, &key, &raw.aliases)?;
            entries.push(AliasEntry {
                license: CanonicalLicense::new(key),
                aliases: raw.aliases,
            });
        }

        debug!(licenses = entries.len(), "parsed alias database");
        Ok(Self {
            meta: doc.meta,
            entries,
        })
    }
}

/// License family names that need a version before they mean anything.
#[derive(Debug, Clone)]
pub struct AmbiguityDatabase {
    pub meta: Meta,
    pub entries: Vec<AmbiguityEntry>,
}

impl AmbiguityDatabase {
    /// Parse and validate an ambiguity document.
    pub fn from_json(source: &str) -> Result<Self, DatabaseError> {
        let doc: AmbiguityDocument = serde_json::from_str(source)
            .map_err(|e| DatabaseError::malformed(Document::Ambiguities, None, e.to_string()))?;

        let mut entries = Vec::new();
        for (key, value) in checked_entries(Document::Ambiguities, doc.ambiguities)? {
            let raw: RawAmbiguity = parse_entry(Document::Ambiguities, &key, value)?;
            if raw.aliases.is_empty() {
                return Err(DatabaseError::malformed(
                    Document::Ambiguities,
                    Some(&key),
                    "no aliases listed",
                ));
            }
            check_aliases(Document::Ambiguities, &key, &raw.aliases)?;
            if raw.problem.trim().is_empty() {
                return Err(DatabaseError::malformed(
                    Document::Ambiguities,
                    Some(&key),
                    "empty problem description",
                ));
            }
            entries.push(AmbiguityEntry {
                name: key,
                aliases: raw.aliases,
                problem: raw.problem,
            });
        }

        debug!(problems = entries.len(), "parsed ambiguity database");
        Ok(Self {
            meta: doc.meta,
            entries,
        })
    }
}

// ---------------------------------------------------------------------------
// Combined, indexed view
// ---------------------------------------------------------------------------

/// Both databases plus their reverse indices, keyed by normalized surface form.
///
/// Built once and shared read-only; every lookup is one hash lookup.
#[derive(Debug)]
pub struct LicenseDb {
    aliases: AliasDatabase,
    ambiguities: AmbiguityDatabase,
    ambiguity_index: HashMap<String, usize>,
    alias_index: HashMap<String, usize>,
    canonical_index: HashMap<String, usize>,
}

fn same_target(a: &Claim, b: &Claim) -> bool {
    match (a, b) {
        (Claim::Ambiguity(x), Claim::Ambiguity(y)) => x == y,
        (Claim::Alias(x) | Claim::Canonical(x), Claim::Alias(y) | Claim::Canonical(y)) => x == y,
        _ => false,
    }
}

/// Records who owns each normalized form and rejects conflicting owners.
#[derive(Default)]
struct ClaimRegistry {
    claims: HashMap<String, Claim>,
}

impl ClaimRegistry {
    fn claim(&mut self, surface: &str, key: &str, claim: Claim) -> Result<(), DatabaseError> {
        match self.claims.get(key) {
            Some(existing) if !same_target(existing, &claim) => Err(DatabaseError::DuplicateAlias {
                alias: surface.to_string(),
                first: existing.clone(),
                second: claim,
            }),
            Some(_) => Ok(()),
            None => {
                self.claims.insert(key.to_string(), claim);
                Ok(())
            }
        }
    }
}

impl LicenseDb {
    /// Index both databases, failing on any surface form claimed twice.
    ///
    /// Ambiguity entries are registered first, so a clash between the two
    /// documents is always reported against the ambiguity that owns the name.
    pub fn new(aliases: AliasDatabase, ambiguities: AmbiguityDatabase) -> Result<Self, DatabaseError> {
        let mut registry = ClaimRegistry::default();
        let mut ambiguity_index = HashMap::new();
        let mut alias_index = HashMap::new();
        let mut canonical_index = HashMap::new();

        for (i, entry) in ambiguities.entries.iter().enumerate() {
            for alias in &entry.aliases {
                let key = normalize(alias);
                registry.claim(alias, &key, Claim::Ambiguity(entry.name.clone()))?;
                ambiguity_index.insert(key, i);
            }
        }

        for (i, entry) in aliases.entries.iter().enumerate() {
            let id = entry.license.as_str();
            let key = normalize(id);
            registry.claim(id, &key, Claim::Canonical(id.to_string()))?;
            canonical_index.insert(key, i);
        }

        for (i, entry) in aliases.entries.iter().enumerate() {
            for alias in &entry.aliases {
                let key = normalize(alias);
                registry.claim(alias, &key, Claim::Alias(entry.license.to_string()))?;
                alias_index.insert(key, i);
            }
        }

        debug!(
            ambiguous_forms = ambiguity_index.len(),
            alias_forms = alias_index.len(),
            licenses = canonical_index.len(),
            "built license indices"
        );

        Ok(Self {
            aliases,
            ambiguities,
            ambiguity_index,
            alias_index,
            canonical_index,
        })
    }

    /// Parse, validate and index both documents.
    pub fn load(aliases_source: &str, ambiguities_source: &str) -> Result<Self, DatabaseError> {
        let aliases = AliasDatabase::from_json(aliases_source)?;
        let ambiguities = AmbiguityDatabase::from_json(ambiguities_source)?;
        Self::new(aliases, ambiguities)
    }

    /// The tables shipped with the binary.
    pub fn builtin() -> Result<Self, DatabaseError> {
        Self::load(BUILTIN_ALIASES, BUILTIN_AMBIGUITIES)
    }

    /// Load from files, falling back to the built-in table for any path not given.
    pub fn from_paths(
        aliases: Option<&Path>,
        ambiguities: Option<&Path>,
    ) -> Result<Self, DatabaseError> {
        if aliases.is_none() && ambiguities.is_none() {
            debug!("using built-in license tables");
            return Self::builtin();
        }

        let aliases_source = match aliases {
            Some(path) => read_document(Document::Aliases, path)?,
            None => BUILTIN_ALIASES.to_string(),
        };
        let ambiguities_source = match ambiguities {
            Some(path) => read_document(Document::Ambiguities, path)?,
            None => BUILTIN_AMBIGUITIES.to_string(),
        };
        Self::load(&aliases_source, &ambiguities_source)
    }

    /// Ambiguity entry owning a normalized key.
    pub fn ambiguity(&self, key: &str) -> Option<&AmbiguityEntry> {
        self.ambiguity_index
            .get(key)
            .map(|&i| &self.ambiguities.entries[i])
    }

    /// Canonical license a normalized key is an alias of.
    pub fn alias(&self, key: &str) -> Option<&CanonicalLicense> {
        self.alias_index
            .get(key)
            .map(|&i| &self.aliases.entries[i].license)
    }

    /// Canonical license whose identifier normalizes to `key`.
    pub fn canonical(&self, key: &str) -> Option<&CanonicalLicense> {
        self.canonical_index
            .get(key)
            .map(|&i| &self.aliases.entries[i].license)
    }

    /// All canonical identifiers, in document order.
    pub fn licenses(&self) -> impl Iterator<Item = &CanonicalLicense> {
        self.aliases.entries.iter().map(|e| &e.license)
    }

    /// The alias entry for a license given by id (any case) or by one of its aliases.
    pub fn aliases_of(&self, name: &str) -> Option<&AliasEntry> {
        let key = normalize(name);
        self.canonical_index
            .get(&key)
            .or_else(|| self.alias_index.get(&key))
            .map(|&i| &self.aliases.entries[i])
    }

    /// Every (alias, license) pair whose canonical id contains `fragment`,
    /// compared case-insensitively. An empty fragment matches everything.
    pub fn aliases_matching(&self, fragment: &str) -> Vec<(&str, &CanonicalLicense)> {
        let needle = fragment.to_lowercase();
        self.aliases
            .entries
            .iter()
            .filter(|e| e.license.as_str().to_lowercase().contains(&needle))
            .flat_map(|e| e.aliases.iter().map(move |a| (a.as_str(), &e.license)))
            .collect()
    }

    pub fn ambiguities(&self) -> &[AmbiguityEntry] {
        &self.ambiguities.entries
    }

    pub fn alias_meta(&self) -> &Meta {
        &self.aliases.meta
    }

    pub fn ambiguity_meta(&self) -> &Meta {
        &self.ambiguities.meta
    }
}

fn read_document(document: Document, path: &Path) -> Result<String, DatabaseError> {
    info!(path = %path.display(), "reading {} database", document);
    std::fs::read_to_string(path).map_err(|source| DatabaseError::Io {
        document,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ALIASES: &str = r#"{
        "meta": { "source": "fixture" },
        "aliases": {
            "MIT": { "aliases": ["MIT License", "Expat"] },
            "BSD-3-Clause": { "aliases": ["New BSD", "BSD3"] }
        }
    }"#;

    const AMBIGUITIES: &str = r#"{
        "meta": {},
        "ambiguities": {
            "BSD": {
                "aliases": ["BSD", "BSD License", "License :: OSI Approved :: BSD License"],
                "problem": "Several BSD licenses exist."
            }
        }
    }"#;

    fn expect_malformed(result: Result<LicenseDb, DatabaseError>, key: Option<&str>) {
        match result {
            Err(DatabaseError::Malformed { key: k, .. }) => assert_eq!(k.as_deref(), key),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_fixture() {
        let db = LicenseDb::load(ALIASES, AMBIGUITIES).unwrap();
        assert_eq!(db.alias("expat").map(|l| l.as_str()), Some("MIT"));
        assert_eq!(db.canonical("bsd-3-clause").map(|l| l.as_str()), Some("BSD-3-Clause"));
        assert_eq!(db.ambiguity("bsd license").map(|e| e.name.as_str()), Some("BSD"));
        assert_eq!(db.alias_meta().get("source"), Some(&Value::from("fixture")));
        assert_eq!(
            db.licenses().map(|l| l.as_str()).collect::<Vec<_>>(),
            vec!["MIT", "BSD-3-Clause"]
        );
    }

    #[test]
    fn test_builtin_loads() {
        let db = LicenseDb::builtin().unwrap();
        assert!(db.licenses().count() > 30);
        assert!(db.ambiguities().len() >= 10);
    }

    #[test]
    fn test_not_json() {
        expect_malformed(LicenseDb::load("not json", AMBIGUITIES), None);
    }

    #[test]
    fn test_missing_section() {
        expect_malformed(LicenseDb::load(r#"{"meta": {}}"#, AMBIGUITIES), None);
    }

    #[test]
    fn test_section_not_an_object() {
        expect_malformed(LicenseDb::load(r#"{"aliases": []}"#, AMBIGUITIES), None);
        expect_malformed(LicenseDb::load(ALIASES, r#"{"ambiguities": []}"#), None);
        expect_malformed(LicenseDb::load(r#"{"aliases": "MIT"}"#, AMBIGUITIES), None);
    }

    #[test]
    fn test_key_empty_after_normalization() {
        let doc = r#"{"aliases": {"License :: OSI Approved ::": {"aliases": ["Foo"]}}}"#;
        expect_malformed(
            LicenseDb::load(doc, AMBIGUITIES),
            Some("License :: OSI Approved ::"),
        );

        let doc = r#"{"ambiguities": {"  ": {"aliases": ["Foo"], "problem": "which Foo?"}}}"#;
        expect_malformed(LicenseDb::load(ALIASES, doc), Some("  "));
    }

    #[test]
    fn test_empty_problem_rejected() {
        let doc = r#"{"ambiguities": {"A": {"aliases": ["Foo"], "problem": "  "}}}"#;
        match LicenseDb::load(ALIASES, doc) {
            Err(DatabaseError::Malformed { key, message, .. }) => {
                assert_eq!(key.as_deref(), Some("A"));
                assert_eq!(message, "empty problem description");
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_problem_names_key() {
        let doc = r#"{"ambiguities": {"GPL": {"aliases": ["GPL"]}}}"#;
        expect_malformed(LicenseDb::load(ALIASES, doc), Some("GPL"));
    }

    #[test]
    fn test_wrong_alias_type_names_key() {
        let doc = r#"{"aliases": {"MIT": {"aliases": "MIT License"}}}"#;
        expect_malformed(LicenseDb::load(doc, AMBIGUITIES), Some("MIT"));
    }

    #[test]
    fn test_repeated_key() {
        let doc = r#"{"aliases": {"MIT": {"aliases": []}, "MIT": {"aliases": ["Expat"]}}}"#;
        expect_malformed(LicenseDb::load(doc, AMBIGUITIES), Some("MIT"));
    }

    #[test]
    fn test_empty_alias_rejected() {
        let doc = r#"{"aliases": {"MIT": {"aliases": ["  "]}}}"#;
        expect_malformed(LicenseDb::load(doc, AMBIGUITIES), Some("MIT"));
    }

    #[test]
    fn test_ambiguity_without_aliases_rejected() {
        let doc = r#"{"ambiguities": {"GPL": {"aliases": [], "problem": "versions"}}}"#;
        expect_malformed(LicenseDb::load(ALIASES, doc), Some("GPL"));
    }

    #[test]
    fn test_alias_under_two_licenses() {
        let doc = r#"{"aliases": {
            "MIT": { "aliases": ["Expat"] },
            "X11": { "aliases": ["expat "] }
        }}"#;
        let err = LicenseDb::load(doc, AMBIGUITIES).unwrap_err();
        match err {
            DatabaseError::DuplicateAlias { first, second, .. } => {
                assert_eq!(first, Claim::Alias("MIT".to_string()));
                assert_eq!(second, Claim::Alias("X11".to_string()));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_form_under_two_ambiguities() {
        let doc = r#"{"ambiguities": {
            "A": { "aliases": ["Foo"], "problem": "first" },
            "B": { "aliases": ["foo "], "problem": "second" }
        }}"#;
        match LicenseDb::load(ALIASES, doc).unwrap_err() {
            DatabaseError::DuplicateAlias {
                alias,
                first,
                second,
            } => {
                assert_eq!(alias, "foo ");
                assert_eq!(first, Claim::Ambiguity("A".to_string()));
                assert_eq!(second, Claim::Ambiguity("B".to_string()));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_alias_also_ambiguous() {
        let doc = r#"{"aliases": {"BSD-3-Clause": {"aliases": ["BSD License"]}}}"#;
        let err = LicenseDb::load(doc, AMBIGUITIES).unwrap_err();
        match err {
            DatabaseError::DuplicateAlias { first, second, .. } => {
                assert_eq!(first, Claim::Ambiguity("BSD".to_string()));
                assert_eq!(second, Claim::Alias("BSD-3-Clause".to_string()));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_alias_conflicts_only_through_prefix() {
        let doc = r#"{"aliases": {"BSD-3-Clause": {"aliases": ["License :: OSI Approved :: BSD"]}}}"#;
        assert!(matches!(
            LicenseDb::load(doc, AMBIGUITIES),
            Err(DatabaseError::DuplicateAlias { .. })
        ));
    }

    #[test]
    fn test_canonical_id_case_clash() {
        let doc = r#"{"aliases": {"MIT": {"aliases": []}, "mit": {"aliases": []}}}"#;
        assert!(matches!(
            LicenseDb::load(doc, AMBIGUITIES),
            Err(DatabaseError::DuplicateAlias { .. })
        ));
    }

    #[test]
    fn test_same_form_twice_under_one_owner_is_fine() {
        let doc = r#"{"aliases": {"MIT": {"aliases": ["MIT License", "License :: OSI Approved :: MIT License", "mit"]}}}"#;
        let db = LicenseDb::load(doc, AMBIGUITIES).unwrap();
        assert_eq!(db.alias("mit license").map(|l| l.as_str()), Some("MIT"));
    }

    #[test]
    fn test_aliases_of_accepts_id_or_alias() {
        let db = LicenseDb::load(ALIASES, AMBIGUITIES).unwrap();
        let by_id = db.aliases_of("mit").unwrap();
        let by_alias = db.aliases_of("Expat").unwrap();
        assert_eq!(by_id, by_alias);
        assert_eq!(by_id.aliases, vec!["MIT License", "Expat"]);
        assert!(db.aliases_of("GPL").is_none());
    }

    #[test]
    fn test_aliases_matching() {
        let db = LicenseDb::load(ALIASES, AMBIGUITIES).unwrap();
        let bsd: Vec<&str> = db.aliases_matching("bsd").into_iter().map(|(a, _)| a).collect();
        assert_eq!(bsd, vec!["New BSD", "BSD3"]);
        assert_eq!(db.aliases_matching("").len(), 4);
    }

    #[test]
    fn test_from_paths() {
        let mut aliases = NamedTempFile::new().unwrap();
        write!(aliases, "{}", ALIASES).unwrap();

        let db = LicenseDb::from_paths(Some(aliases.path()), None).unwrap();
        assert_eq!(db.licenses().count(), 2);
        // built-in ambiguity table is used when no path is given
        assert!(db.ambiguity("gpl").is_some());
    }

    #[test]
    fn test_from_paths_missing_file() {
        let err = LicenseDb::from_paths(None, Some(Path::new("/nonexistent/ambiguities.json")))
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Io {
                document: Document::Ambiguities,
                ..
            }
        ));
    }
}
