//! Completion-candidate selection from keyword lists.
//!
//! The UI around a completion list is host territory; this module supplies
//! the data decisions: which words match the typed prefix (honoring each
//! list's no-autocomplete attribute), and the choose-single shortcut that
//! commits immediately when exactly one candidate remains. Applying a
//! choice edits the document in one undo group and marks the inserted
//! range with an indicator so hosts can flash or restyle it.

use crate::word_list::{WordListAttr, WordListRole, WordListSet};
use quill_core::{Document, DocumentError};

/// Indicator bit set on text inserted by [`apply_completion`].
pub const INDICATOR_COMPLETION: u32 = 1 << 0;

/// Collect the sorted candidate words matching `prefix` across all lists
/// not tagged [`WordListAttr::NO_AUTOCOMPLETE`].
pub fn candidates(
    lists: &WordListSet,
    shape: &[WordListRole],
    prefix: &str,
    ignore_case: bool,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (index, role) in shape.iter().enumerate() {
        if role.attrs.contains(WordListAttr::NO_AUTOCOMPLETE) {
            continue;
        }
        out.extend(
            lists
                .get(index)
                .with_prefix(prefix, ignore_case)
                .into_iter()
                .map(|w| w.to_string()),
        );
    }
    out.sort();
    out.dedup();
    out
}

/// How a sole candidate is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoleCandidate {
    /// Case-sensitive match: append the remainder after the typed prefix.
    Append(String),
    /// Case-insensitive match: replace the typed prefix with the candidate
    /// (its case may differ from what was typed).
    Replace(String),
}

/// The choose-single shortcut: commit immediately when exactly one
/// candidate matches the typed prefix.
///
/// Under case-insensitive matching a candidate no longer than the typed
/// prefix is declined (`None`): committing would rewrite or truncate what
/// the user typed on a path meant to be a no-surprise shortcut.
pub fn sole_candidate(
    candidates: &[String],
    prefix: &str,
    ignore_case: bool,
) -> Option<SoleCandidate> {
    if candidates.len() != 1 {
        return None;
    }
    let choice = &candidates[0];
    if ignore_case {
        if choice.len() > prefix.len() {
            Some(SoleCandidate::Replace(choice.clone()))
        } else {
            None
        }
    } else {
        choice
            .strip_prefix(prefix)
            .map(|rest| SoleCandidate::Append(rest.to_string()))
    }
}

/// Commit `choice` at `caret`, where `len_entered` bytes of prefix were
/// already typed. Returns the new caret position.
///
/// Case-sensitive commits append the remainder; case-insensitive commits
/// remove the typed prefix and insert the full candidate. Either way the
/// edit is one undo group and the inserted range carries
/// [`INDICATOR_COMPLETION`].
pub fn apply_completion(
    doc: &mut Document,
    caret: usize,
    len_entered: usize,
    choice: &SoleCandidate,
) -> Result<usize, DocumentError> {
    doc.begin_undo_group();
    let result = apply_completion_inner(doc, caret, len_entered, choice);
    doc.end_undo_group();
    result
}

fn apply_completion_inner(
    doc: &mut Document,
    caret: usize,
    len_entered: usize,
    choice: &SoleCandidate,
) -> Result<usize, DocumentError> {
    match choice {
        SoleCandidate::Append(rest) => {
            let inserted = doc.insert_string(caret, rest)?;
            if inserted > 0 {
                doc.indicator_fill(caret, inserted, INDICATOR_COMPLETION)?;
            }
            Ok(caret + inserted)
        }
        SoleCandidate::Replace(word) => {
            let start = caret.checked_sub(len_entered).ok_or(
                DocumentError::InvalidRange {
                    pos: caret,
                    len: len_entered,
                    length: doc.len(),
                },
            )?;
            doc.delete_chars(start, len_entered)?;
            let inserted = doc.insert_string(start, word)?;
            if inserted > 0 {
                doc.indicator_fill(start, inserted, INDICATOR_COMPLETION)?;
            }
            Ok(start + inserted)
        }
    }
}
