use serde::{Deserialize, Serialize};

/// A canonical (SPDX-style) license identifier such as `BSD-3-Clause`.
///
/// Opaque to the resolver: it is compared and printed, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalLicense(String);

impl CanonicalLicense {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalLicense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A canonical license and the surface forms that name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub license: CanonicalLicense,
    /// Surface forms as written in the database, in document order.
    pub aliases: Vec<String>,
}

/// A license family name that cannot be mapped to one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguityEntry {
    pub name: String,
    pub aliases: Vec<String>,
    /// Human-readable reason why no single version can be inferred.
    pub problem: String,
}

/// Which index a resolved name was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifiedVia {
    /// One of the surface forms listed for the license.
    Alias,
    /// The canonical identifier itself, in any case.
    Canonical,
}

impl std::fmt::Display for IdentifiedVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifiedVia::Alias => write!(f, "alias"),
            IdentifiedVia::Canonical => write!(f, "canonical"),
        }
    }
}

/// Outcome of resolving one license string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Verdict {
    Resolved {
        license: CanonicalLicense,
        identified_via: IdentifiedVia,
    },
    Ambiguous { problem: String, explanation: String },
    /// Carries the input exactly as given, not the normalized key.
    Unknown { input: String },
}

impl Verdict {
    pub fn license(&self) -> Option<&CanonicalLicense> {
        match self {
            Verdict::Resolved { license, .. } => Some(license),
            _ => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Verdict::Ambiguous { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Verdict::Unknown { .. })
    }

    pub fn kind(&self) -> VerdictKind {
        match self {
            Verdict::Resolved { .. } => VerdictKind::Resolved,
            Verdict::Ambiguous { .. } => VerdictKind::Ambiguous,
            Verdict::Unknown { .. } => VerdictKind::Unknown,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Resolved { license, .. } => write!(f, "{}", license),
            Verdict::Ambiguous { problem, .. } => write!(f, "ambiguous ({})", problem),
            Verdict::Unknown { .. } => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictKind {
    Resolved,
    Ambiguous,
    Unknown,
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictKind::Resolved => write!(f, "resolved"),
            VerdictKind::Ambiguous => write!(f, "ambiguous"),
            VerdictKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// One input string together with its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub input: String,
    pub verdict: Verdict,
}

/// An expression rewritten with canonical ids, plus the verdict of each term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionResolution {
    pub input: String,
    /// Resolved terms replaced by their id, operators spelled `AND`/`OR`/`WITH`.
    /// Ambiguous and unknown terms are kept as written.
    pub expression: String,
    pub terms: Vec<Resolution>,
}
