use std::collections::HashSet;

use wiki_hash::Ident;
use wiki_repository::Repository;

use crate::MergeError;

/// Find the common ancestor of two commits.
///
/// Both chains are walked newest to oldest via `previous_commit`; the
/// result is the first commit of the local chain that appears anywhere in
/// the merge chain. The search is linear and single-base; histories are
/// chains here, not general DAGs.
pub fn common_ancestor(
    repo: &Repository,
    local_tip: &Ident,
    merge_tip: &Ident,
) -> Result<Ident, MergeError> {
    let merge_chain: HashSet<Ident> = repo
        .log_from(merge_tip)?
        .into_iter()
        .map(|(ident, _)| ident)
        .collect();

    for (ident, _) in repo.log_from(local_tip)? {
        if merge_chain.contains(&ident) {
            return Ok(ident);
        }
    }
    Err(MergeError::NoCommonAncestor)
}
