//! Three-way merge of two divergent edits of a common ancestor.
//!
//! Both descendants are diffed against the ancestor, the two edit sets are
//! scattered over a per-character change table, and the table is scanned
//! back out into a single tagged run sequence. Deletion by either side
//! wins; insertions from both sides are kept, left side first at a shared
//! anchor. Deterministic and non-interactive: overlapping edits are
//! union-merged, never flagged.

use crate::algorithm::char_diff;
use crate::{DiffRun, Sign};

/// One ancestor position plus the insertions anchored in front of it.
struct Slot {
    sign: Sign,
    /// `None` for the trailing sentinel that carries end-of-text inserts.
    ch: Option<char>,
    inserts: Vec<String>,
}

/// Merge two descendants `left` and `right` of the ancestor `origin` into a
/// single run sequence.
///
/// Filtering the output to `{0,-1}` reproduces `origin`; `{0,+1}` is the
/// merged text.
pub fn three_way_merge(origin: &str, left: &str, right: &str) -> Vec<DiffRun> {
    let origin_chars: Vec<char> = origin.chars().collect();
    let diffs_left = char_diff(origin, left);
    let diffs_right = char_diff(origin, right);

    // Left side's view of each ancestor position, then overwrite with the
    // right side's deletions: a position deleted anywhere is deleted.
    let mut signs = changes_table(&origin_chars, &diffs_left);
    for (i, sign) in changes_table(&origin_chars, &diffs_right)
        .into_iter()
        .enumerate()
    {
        if sign == Sign::Delete {
            signs[i] = Sign::Delete;
        }
    }

    let mut slots: Vec<Slot> = signs
        .into_iter()
        .zip(origin_chars.iter())
        .map(|(sign, &ch)| Slot {
            sign,
            ch: Some(ch),
            inserts: Vec::new(),
        })
        .collect();
    // Sentinel for insertions past the end of the ancestor.
    slots.push(Slot {
        sign: Sign::Equal,
        ch: None,
        inserts: Vec::new(),
    });

    scatter_insertions(&mut slots, &diffs_left);
    scatter_insertions(&mut slots, &diffs_right);

    emit(slots)
}

/// Per-position sign of one descendant's diff against the ancestor.
///
/// Insert runs occupy no ancestor positions and are skipped; the remaining
/// runs must cover the ancestor exactly.
fn changes_table(origin: &[char], diffs: &[DiffRun]) -> Vec<Sign> {
    let mut signs = vec![Sign::Equal; origin.len()];
    let mut index = 0;
    for run in diffs {
        if run.sign == Sign::Insert {
            continue;
        }
        for _ in run.text.chars() {
            signs[index] = run.sign;
            index += 1;
        }
    }
    debug_assert_eq!(index, origin.len(), "diff does not cover the ancestor");
    signs
}

/// Anchor each insert run at the ancestor position it lands in front of.
fn scatter_insertions(slots: &mut [Slot], diffs: &[DiffRun]) {
    let mut index = 0;
    for run in diffs {
        if run.sign != Sign::Insert {
            index += run.text.chars().count();
            continue;
        }
        slots[index].inserts.push(run.text.clone());
    }
}

/// Scan the change table back out into runs.
fn emit(slots: Vec<Slot>) -> Vec<DiffRun> {
    let mut out: Vec<DiffRun> = Vec::new();
    let mut pending: Option<(Sign, String)> = None;

    for slot in slots {
        if !slot.inserts.is_empty() {
            if let Some((sign, text)) = pending.take() {
                out.push(DiffRun::new(sign, text));
            }
            out.push(DiffRun::new(Sign::Insert, slot.inserts.concat()));
        }

        let Some(ch) = slot.ch else {
            continue;
        };
        match &mut pending {
            Some((sign, text)) if *sign == slot.sign => text.push(ch),
            _ => {
                if let Some((sign, text)) = pending.take() {
                    out.push(DiffRun::new(sign, text));
                }
                pending = Some((slot.sign, ch.to_string()));
            }
        }
    }

    if let Some((sign, text)) = pending {
        out.push(DiffRun::new(sign, text));
    }
    out
}
