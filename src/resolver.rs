//! Turns a free-form query into one session or host name.
//!
//! Matching is two pure steps: a 1-based index lookup into the full
//! candidate list, then a case-sensitive substring filter. Picking between
//! several matches is delegated to a [`Chooser`], which is the only part that
//! talks to the operator.

use std::io::{BufRead, Write};

use crate::prompt::{Prompt, PromptError};

/// Result of matching a query against a candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing matched, or there was nothing to match against
    None,
    Unique(String),
    /// Two or more substring matches, in candidate order
    Multiple(Vec<String>),
}

/// Something that can pick one name out of several
pub trait Chooser {
    fn choose(&mut self, kind: &str, candidates: &[String]) -> Result<String, PromptError>;
}

impl<R: BufRead, W: Write> Chooser for Prompt<R, W> {
    fn choose(&mut self, kind: &str, candidates: &[String]) -> Result<String, PromptError> {
        let heading = format!("Several {}s match:", kind);
        let question = format!("\nChoose a {}: ", kind);
        self.select(&heading, &question, candidates).cloned()
    }
}

/// Treat `query` as a 1-based position in `candidates`
fn lookup_index<'a>(candidates: &'a [String], query: &str) -> Option<&'a String> {
    let position = query.parse::<usize>().ok()?;
    candidates.get(position.checked_sub(1)?)
}

/// Match `query` against `candidates` without any interaction.
///
/// An in-range index wins outright; an out-of-range one is retried as a
/// substring like any other text.
pub fn match_candidates(candidates: &[String], query: &str) -> Resolution {
    if let Some(hit) = lookup_index(candidates, query) {
        return Resolution::Unique(hit.clone());
    }

    let mut matches: Vec<String> = candidates
        .iter()
        .filter(|c| c.contains(query))
        .cloned()
        .collect();

    match matches.len() {
        0 => Resolution::None,
        1 => Resolution::Unique(matches.remove(0)),
        _ => Resolution::Multiple(matches),
    }
}

/// Match `query` and, when several candidates remain, let `chooser` decide.
///
/// `kind` names what is being resolved ("session", "host") for the chooser.
pub fn resolve(
    candidates: &[String],
    query: &str,
    kind: &str,
    chooser: &mut impl Chooser,
) -> Result<Option<String>, PromptError> {
    match match_candidates(candidates, query) {
        Resolution::None => Ok(None),
        Resolution::Unique(name) => Ok(Some(name)),
        Resolution::Multiple(names) => chooser.choose(kind, &names).map(Some),
    }
}
