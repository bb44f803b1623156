//! The per-peer gossip state machine.
//!
//! A session exchanges `hello`/`sync` to learn the peer's branch tips,
//! records them as remote refs, then pulls every missing object in
//! dependency order via `fetch`/`object`. Once a remote tip is fully
//! present locally and differs from the local tip of the same branch, the
//! session attempts a branch merge.
//!
//! Sessions are pure with respect to I/O: `connect` and `handle` return
//! the messages to send, the caller owns the transport.

use std::collections::{HashMap, HashSet};

use wiki_crypto::PUBLIC_LEN;
use wiki_hash::hex::hex_to_string;
use wiki_hash::Ident;
use wiki_merge::{common_ancestor, MergeEngine, MergeError};
use wiki_message::Message;
use wiki_odb::OdbError;
use wiki_repository::Repository;

use crate::ProtocolError;

/// One peer's synchronization state.
pub struct SyncSession<'a> {
    repo: &'a Repository,
    peer_hex: String,
    /// Objects already requested this round; cleared on every new `sync`
    /// so a lost reply is retried on the next hello exchange.
    requested: HashSet<Ident>,
}

impl<'a> SyncSession<'a> {
    pub fn new(repo: &'a Repository, peer_public: &[u8; PUBLIC_LEN]) -> Self {
        Self {
            repo,
            peer_hex: hex_to_string(peer_public),
            requested: HashSet::new(),
        }
    }

    /// The peer's public key in hex, as used in remote ref paths.
    pub fn peer_hex(&self) -> &str {
        &self.peer_hex
    }

    /// Messages to send when the channel comes up.
    pub fn connect(&self) -> Vec<Message> {
        vec![Message::Hello]
    }

    /// Process one inbound message; returns the messages to send back.
    pub fn handle(&mut self, message: &Message) -> Result<Vec<Message>, ProtocolError> {
        match message {
            Message::Hello => {
                let tips = self.repo.branches_tips()?;
                Ok(vec![Message::Sync { tips }])
            }
            Message::Sync { tips } => {
                for (branch, ident) in tips {
                    self.repo
                        .refs()
                        .write_remote_ref(&self.peer_hex, branch, ident)?;
                }
                // A fresh sync round retries anything lost in flight.
                self.requested.clear();
                self.request_missing()
            }
            Message::Fetch { ident } => match self.repo.store().fetch(ident) {
                Ok(object) => {
                    let reply = Message::Object {
                        ident: *ident,
                        object,
                    };
                    if reply.oversized() {
                        tracing::warn!(ident = %ident, "object too large for the wire format");
                        return Ok(Vec::new());
                    }
                    Ok(vec![reply])
                }
                Err(OdbError::NotFound(_)) => {
                    tracing::warn!(ident = %ident, "peer fetched an object we do not have");
                    Ok(Vec::new())
                }
                Err(e) => Err(e.into()),
            },
            Message::Object { ident, object } => {
                let stored = self.repo.store().add(object)?;
                if stored != *ident {
                    tracing::warn!(claimed = %ident, stored = %stored, "object ident mismatch");
                }
                self.request_missing()
            }
        }
    }

    /// Fetch requests for every object missing under the peer's tips, and a
    /// merge attempt for each fully-present tip that diverges from ours.
    fn request_missing(&mut self) -> Result<Vec<Message>, ProtocolError> {
        let local_tips: HashMap<String, Ident> =
            self.repo.branches_tips()?.into_iter().collect();

        let mut out = Vec::new();
        for branch in self.repo.refs().remote_branches(&self.peer_hex)? {
            let Some(remote_tip) = self.repo.refs().remote_tip(&self.peer_hex, &branch)? else {
                continue;
            };

            let missing = self.repo.missing_objects(&remote_tip)?;
            for ident in &missing {
                if self.requested.insert(*ident) {
                    out.push(Message::Fetch { ident: *ident });
                }
            }

            if missing.is_empty() {
                if let Some(local_tip) = local_tips.get(&branch) {
                    if *local_tip != remote_tip {
                        self.attempt_merge(&branch, local_tip, &remote_tip)?;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Reconcile a diverged branch now that the remote chain is complete.
    ///
    /// Only the active branch is touched: the merge engine commits onto
    /// the current ref. A tip that is strictly behind ours needs nothing; a
    /// tip strictly ahead fast-forwards; true divergence runs the branch
    /// merge. Unrelated histories are logged and skipped.
    fn attempt_merge(
        &self,
        branch: &str,
        local_tip: &Ident,
        remote_tip: &Ident,
    ) -> Result<(), ProtocolError> {
        tracing::info!(branch, peer = %self.peer_hex, "attempting merge");

        if self.repo.refs().active_branch()? != branch {
            tracing::debug!(branch, "not the active branch, skipping merge");
            return Ok(());
        }

        let origin = match common_ancestor(self.repo, local_tip, remote_tip) {
            Ok(origin) => origin,
            Err(MergeError::NoCommonAncestor) => {
                tracing::warn!(branch, peer = %self.peer_hex, "unrelated histories, skipping merge");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if origin == *remote_tip {
            // The peer is behind; it will catch up from our tips.
            return Ok(());
        }
        if origin == *local_tip {
            tracing::info!(branch, tip = %remote_tip, "fast-forwarding");
            self.repo.switch_branch(branch, Some(*remote_tip))?;
            return Ok(());
        }

        let merged = MergeEngine::new(self.repo).merge(local_tip, remote_tip)?;
        tracing::info!(branch, commit = %merged, "merge commit written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_file(repo: &Repository, rel: &str, data: &str) -> Ident {
        repo.write_work_file(rel, data.as_bytes()).unwrap();
        repo.add_file(rel).unwrap();
        repo.commit(None).unwrap()
    }

    #[test]
    fn hello_answers_with_local_tips() {
        let (_dir, repo) = repo();
        let tip = commit_file(&repo, "a.txt", "hello");

        let mut session = SyncSession::new(&repo, &[1; 32]);
        let replies = session.handle(&Message::Hello).unwrap();
        assert_eq!(
            replies,
            vec![Message::Sync {
                tips: vec![("master".to_string(), tip)]
            }]
        );
    }

    #[test]
    fn sync_records_remote_refs_and_requests_missing() {
        let (_dir, repo) = repo();
        let unknown_tip = Ident::from_raw([9; 32]);

        let mut session = SyncSession::new(&repo, &[1; 32]);
        let replies = session
            .handle(&Message::Sync {
                tips: vec![("master".to_string(), unknown_tip)],
            })
            .unwrap();

        assert_eq!(
            repo.refs()
                .remote_tip(session.peer_hex(), "master")
                .unwrap(),
            Some(unknown_tip)
        );
        assert_eq!(replies, vec![Message::Fetch { ident: unknown_tip }]);
    }

    #[test]
    fn duplicate_requests_are_suppressed_within_a_round() {
        let (_dir, repo) = repo();
        let unknown_tip = Ident::from_raw([9; 32]);

        let mut session = SyncSession::new(&repo, &[1; 32]);
        session
            .handle(&Message::Sync {
                tips: vec![("master".to_string(), unknown_tip)],
            })
            .unwrap();

        // An unrelated object arriving re-runs request_missing; the tip
        // fetch must not be re-sent.
        let blob = wiki_object::Object::Blob(b"noise".to_vec());
        let replies = session
            .handle(&Message::Object {
                ident: blob.ident(),
                object: blob,
            })
            .unwrap();
        assert!(replies.is_empty());
    }

    #[test]
    fn fetch_returns_the_object() {
        let (_dir, repo) = repo();
        let ident = repo.store().add_blob(b"served").unwrap();

        let mut session = SyncSession::new(&repo, &[1; 32]);
        let replies = session.handle(&Message::Fetch { ident }).unwrap();
        assert_eq!(replies.len(), 1);
        assert!(matches!(
            &replies[0],
            Message::Object { ident: i, object: wiki_object::Object::Blob(data) }
                if *i == ident && data == b"served"
        ));
    }

    #[test]
    fn fetch_of_unknown_object_is_ignored() {
        let (_dir, repo) = repo();
        let mut session = SyncSession::new(&repo, &[1; 32]);
        let replies = session
            .handle(&Message::Fetch {
                ident: Ident::from_raw([9; 32]),
            })
            .unwrap();
        assert!(replies.is_empty());
    }

    #[test]
    fn object_is_stored_on_arrival() {
        let (_dir, repo) = repo();
        let blob = wiki_object::Object::Blob(b"incoming".to_vec());
        let ident = blob.ident();

        let mut session = SyncSession::new(&repo, &[1; 32]);
        session
            .handle(&Message::Object {
                ident,
                object: blob,
            })
            .unwrap();
        assert!(repo.store().contains(&ident));
    }
}
