//! License name resolution.
//!
//! - [`normalize`] — turns a raw license string into its lookup key.
//! - [`database`] — loads, validates and indexes the alias and ambiguity tables.
//! - [`resolver`] — maps a string to a [`Verdict`](crate::models::Verdict).
//! - [`expression`] — splits compound expressions into the names they contain.

pub mod database;
pub mod expression;
pub mod normalize;
pub mod resolver;
