//! Property coverage for the diff and merge reconstruction contracts.

use proptest::prelude::*;
use wiki_diff::algorithm::char_diff;
use wiki_diff::{new_text, old_text, three_way_merge, Sign};

proptest! {
    #[test]
    fn diff_reconstructs_both_sides(old in ".{0,60}", new in ".{0,60}") {
        let runs = char_diff(&old, &new);
        prop_assert_eq!(old_text(&runs), old);
        prop_assert_eq!(new_text(&runs), new);
    }

    #[test]
    fn merge_reconstructs_origin(
        origin in "[ab\\n ]{0,40}",
        left in "[ab\\n ]{0,40}",
        right in "[ab\\n ]{0,40}",
    ) {
        let merged = three_way_merge(&origin, &left, &right);
        prop_assert_eq!(old_text(&merged), origin);
    }

    #[test]
    fn merge_keeps_every_insertion(
        origin in "[xy]{0,30}",
        left in "[xy]{0,30}",
        right in "[xy]{0,30}",
    ) {
        let merged = three_way_merge(&origin, &left, &right);

        let inserted_len: usize = merged
            .iter()
            .filter(|r| r.sign == Sign::Insert)
            .map(|r| r.text.chars().count())
            .sum();
        let expected: usize = [&left, &right]
            .iter()
            .map(|side| {
                char_diff(&origin, side)
                    .iter()
                    .filter(|r| r.sign == Sign::Insert)
                    .map(|r| r.text.chars().count())
                    .sum::<usize>()
            })
            .sum();
        prop_assert_eq!(inserted_len, expected);
    }

    #[test]
    fn deleted_positions_absent_from_merge_output(
        origin in "[pq ]{1,30}",
        left in "[pq ]{0,30}",
    ) {
        // Merge against an unchanged right side: the output's new text is
        // exactly the left side.
        let merged = three_way_merge(&origin, &left, &origin);
        prop_assert_eq!(new_text(&merged), left);
    }
}
