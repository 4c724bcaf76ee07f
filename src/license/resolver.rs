use rayon::prelude::*;
use tracing::trace;

use crate::license::database::LicenseDb;
use crate::license::expression::{parse, render, Part, Term};
use crate::license::normalize::normalize;
use crate::models::{ExpressionResolution, IdentifiedVia, Resolution, Verdict};

/// Resolves license strings against a loaded [`LicenseDb`].
///
/// Holds nothing but a shared reference, so it is `Copy`, `Send` and `Sync` and
/// can be handed to any number of worker threads.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'db> {
    db: &'db LicenseDb,
}

impl<'db> Resolver<'db> {
    pub fn new(db: &'db LicenseDb) -> Self {
        Self { db }
    }

    /// Resolve one license string.
    ///
    /// Lookup order:
    /// 1. ambiguity table → [`Verdict::Ambiguous`]
    /// 2. alias table → [`Verdict::Resolved`] via [`IdentifiedVia::Alias`]
    /// 3. canonical identifiers (case-insensitive) → [`Verdict::Resolved`] via
    ///    [`IdentifiedVia::Canonical`]
    /// 4. otherwise [`Verdict::Unknown`] with `raw` untouched
    pub fn resolve(&self, raw: &str) -> Verdict {
        let key = normalize(raw);

        let verdict = if key.is_empty() {
            None
        } else if let Some(entry) = self.db.ambiguity(&key) {
            Some(Verdict::Ambiguous {
                problem: entry.name.clone(),
                explanation: entry.problem.clone(),
            })
        } else {
            self.db
                .alias(&key)
                .map(|license| (license, IdentifiedVia::Alias))
                .or_else(|| {
                    self.db
                        .canonical(&key)
                        .map(|license| (license, IdentifiedVia::Canonical))
                })
                .map(|(license, identified_via)| Verdict::Resolved {
                    license: license.clone(),
                    identified_via,
                })
        };

        let verdict = verdict.unwrap_or_else(|| Verdict::Unknown {
            input: raw.to_string(),
        });
        trace!(input = raw, key = %key, verdict = %verdict.kind(), "resolved");
        verdict
    }

    /// Resolve every input independently, in parallel. Results keep input order.
    pub fn resolve_batch<S>(&self, inputs: &[S]) -> Vec<Resolution>
    where
        S: AsRef<str> + Sync,
    {
        inputs
            .par_iter()
            .map(|input| self.resolution(input.as_ref()))
            .collect()
    }

    /// Resolve the license names that make up an expression.
    ///
    /// A string that resolves as a whole (e.g. `GNU General Public License v2 (GPLv2)`,
    /// whose parentheses are part of the name) is returned as a single term. Otherwise
    /// it is split at `AND`/`OR`/`WITH`, `&`/`|` and parentheses and each license
    /// term is resolved; exception identifiers after `WITH` are carried into the
    /// rewritten expression but not looked up.
    pub fn resolve_expression(&self, expr: &str) -> ExpressionResolution {
        let whole = self.resolution(expr);
        if !whole.verdict.is_unknown() {
            let expression = whole
                .verdict
                .license()
                .map_or_else(|| expr.trim().to_string(), ToString::to_string);
            return ExpressionResolution {
                input: expr.to_string(),
                expression,
                terms: vec![whole],
            };
        }

        let parts = parse(expr);
        let terms: Vec<Resolution> = parts
            .iter()
            .filter_map(|part| match part {
                Part::Term(Term::License(name)) => Some(self.resolution(name)),
                _ => None,
            })
            .collect();

        let mut licenses = terms.iter().map(|r| r.verdict.license());
        let expression = render(&parts, |term| match term {
            Term::License(name) => licenses
                .next()
                .flatten()
                .map_or_else(|| name.clone(), ToString::to_string),
            Term::Exception(name) => name.clone(),
        });

        ExpressionResolution {
            input: expr.to_string(),
            expression,
            terms,
        }
    }

    fn resolution(&self, input: &str) -> Resolution {
        Resolution {
            input: input.to_string(),
            verdict: self.resolve(input),
        }
    }
}
