//! Colored rendering of diff run lists.

use crate::{DiffRun, Sign};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Render a run list, wrapping deletions in red and insertions in green
/// when `colored` is set.
pub fn render_runs(runs: &[DiffRun], colored: bool) -> String {
    let mut out = String::new();
    for run in runs {
        match run.sign {
            Sign::Equal => out.push_str(&run.text),
            Sign::Delete if colored => {
                out.push_str(RED);
                out.push_str(&run.text);
                out.push_str(RESET);
            }
            Sign::Insert if colored => {
                out.push_str(GREEN);
                out.push_str(&run.text);
                out.push_str(RESET);
            }
            _ => out.push_str(&run.text),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rendering_concatenates() {
        let runs = vec![
            DiffRun::new(Sign::Equal, "hello"),
            DiffRun::new(Sign::Insert, " world"),
            DiffRun::new(Sign::Delete, "!"),
        ];
        assert_eq!(render_runs(&runs, false), "hello world!");
    }

    #[test]
    fn colored_rendering_wraps_changes() {
        let runs = vec![
            DiffRun::new(Sign::Delete, "old"),
            DiffRun::new(Sign::Insert, "new"),
        ];
        let out = render_runs(&runs, true);
        assert_eq!(out, "\x1b[31mold\x1b[0m\x1b[32mnew\x1b[0m");
    }
}
