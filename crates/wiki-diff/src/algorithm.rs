//! Character-level diff.
//!
//! Myers' O(ND) algorithm over Unicode scalar values, with common
//! prefix/suffix trimming, producing tagged runs. Adjacent same-sign runs
//! are coalesced; this is the only cleanup applied, and the reconstruction
//! contract holds with or without it.

use crate::{DiffRun, Sign};

/// Diff two texts into a tagged run sequence.
///
/// Filtering the result to `{0,-1}` reproduces `old`; `{0,+1}` reproduces
/// `new`.
pub fn char_diff(old: &str, new: &str) -> Vec<DiffRun> {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();

    let prefix_len = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix_len = old[prefix_len..]
        .iter()
        .rev()
        .zip(new[prefix_len..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut runs = Vec::new();
    if prefix_len > 0 {
        runs.push(DiffRun::new(Sign::Equal, collect(&old[..prefix_len])));
    }
    runs.extend(myers_runs(
        &old[prefix_len..old.len() - suffix_len],
        &new[prefix_len..new.len() - suffix_len],
    ));
    if suffix_len > 0 {
        runs.push(DiffRun::new(
            Sign::Equal,
            collect(&old[old.len() - suffix_len..]),
        ));
    }
    coalesce(runs)
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Merge adjacent runs with the same sign and drop empty runs.
fn coalesce(runs: Vec<DiffRun>) -> Vec<DiffRun> {
    let mut out: Vec<DiffRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.sign == run.sign => last.text.push_str(&run.text),
            _ => out.push(run),
        }
    }
    out
}

/// Myers diff on the trimmed middle sections.
fn myers_runs(old: &[char], new: &[char]) -> Vec<DiffRun> {
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    if old.is_empty() {
        return vec![DiffRun::new(Sign::Insert, collect(new))];
    }
    if new.is_empty() {
        return vec![DiffRun::new(Sign::Delete, collect(old))];
    }

    let edits = myers_edits(old, new);
    let mut runs = Vec::with_capacity(edits.len());
    for (sign, ch) in edits {
        runs.push(DiffRun::new(sign, ch.to_string()));
    }
    runs
}

/// The classic greedy O(ND) search with a saved trace for backtracking.
///
/// Returns one `(sign, char)` edit per position, oldest first.
fn myers_edits(old: &[char], new: &[char]) -> Vec<(Sign, char)> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let max = n + m;
    let offset = max;

    let mut v = vec![0isize; (2 * max + 1) as usize];
    let mut trace: Vec<Vec<isize>> = Vec::new();
    let mut found_d = 0;

    'search: for d in 0..=max {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                found_d = d;
                break 'search;
            }
            k += 2;
        }
    }

    // Backtrack from (n, m) through the saved V states.
    let mut edits: Vec<(Sign, char)> = Vec::with_capacity(max as usize);
    let mut x = n;
    let mut y = m;
    for d in (0..=found_d).rev() {
        let v = &trace[d as usize];
        let k = x - y;
        let idx = (k + offset) as usize;
        let prev_k = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            edits.push((Sign::Equal, old[(x - 1) as usize]));
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            if x == prev_x {
                // Down move: one character of `new` inserted.
                edits.push((Sign::Insert, new[(y - 1) as usize]));
            } else {
                // Right move: one character of `old` deleted.
                edits.push((Sign::Delete, old[(x - 1) as usize]));
            }
        }
        x = prev_x;
        y = prev_y;
    }

    edits.reverse();
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{new_text, old_text};

    fn signs(runs: &[DiffRun]) -> Vec<(i8, &str)> {
        runs.iter().map(|r| (r.sign.value(), r.text.as_str())).collect()
    }

    #[test]
    fn identical_texts_single_equal_run() {
        let runs = char_diff("same text", "same text");
        assert_eq!(signs(&runs), [(0, "same text")]);
    }

    #[test]
    fn insertion_in_middle() {
        let runs = char_diff("hello\n", "hello world\n");
        assert_eq!(signs(&runs), [(0, "hello"), (1, " world"), (0, "\n")]);
    }

    #[test]
    fn deletion_in_middle() {
        let runs = char_diff("hello world\n", "hello\n");
        assert_eq!(signs(&runs), [(0, "hello"), (-1, " world"), (0, "\n")]);
    }

    #[test]
    fn replacement() {
        let runs = char_diff("abc", "axc");
        assert_eq!(old_text(&runs), "abc");
        assert_eq!(new_text(&runs), "axc");
    }

    #[test]
    fn empty_to_text() {
        let runs = char_diff("", "abc");
        assert_eq!(signs(&runs), [(1, "abc")]);
    }

    #[test]
    fn text_to_empty() {
        let runs = char_diff("abc", "");
        assert_eq!(signs(&runs), [(-1, "abc")]);
    }

    #[test]
    fn both_empty() {
        assert!(char_diff("", "").is_empty());
    }

    #[test]
    fn disjoint_texts() {
        let runs = char_diff("aaa", "bbb");
        assert_eq!(old_text(&runs), "aaa");
        assert_eq!(new_text(&runs), "bbb");
    }

    #[test]
    fn multibyte_characters() {
        let runs = char_diff("caffè", "caffé latte");
        assert_eq!(old_text(&runs), "caffè");
        assert_eq!(new_text(&runs), "caffé latte");
    }

    #[test]
    fn runs_are_coalesced() {
        let runs = char_diff("the quick brown fox", "the slow brown dog");
        for pair in runs.windows(2) {
            assert_ne!(pair[0].sign, pair[1].sign, "adjacent runs share a sign");
        }
    }

    #[test]
    fn reconstruction_contract() {
        let cases = [
            ("", ""),
            ("a", ""),
            ("", "b"),
            ("kitten", "sitting"),
            ("I am the very model\n", "I am the very model of a modern\n"),
            ("line one\nline two\n", "line one\nline 2\nline three\n"),
        ];
        for (old, new) in cases {
            let runs = char_diff(old, new);
            assert_eq!(old_text(&runs), old, "old reconstruction for {old:?}");
            assert_eq!(new_text(&runs), new, "new reconstruction for {new:?}");
        }
    }
}
