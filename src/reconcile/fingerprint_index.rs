use crate::git::commit::CommitId;
use crate::git::patch_id::{CommitFingerprint, Fingerprint};
use std::collections::HashMap;

/// Fingerprint → commits sharing it, in listing order.
///
/// Fingerprints iterate in the order they were first seen, so two runs over the
/// same listing resolve shared fingerprints in the same sequence.
#[derive(Debug, Default, Clone)]
pub struct FingerprintIndex {
    order: Vec<Fingerprint>,
    commits: HashMap<Fingerprint, Vec<CommitId>>,
}

impl FingerprintIndex {
    pub fn build(entries: impl IntoIterator<Item = CommitFingerprint>) -> Self {
        let mut index = FingerprintIndex::default();
        for entry in entries {
            index.insert(entry.fingerprint, entry.commit);
        }
        index
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, commit: CommitId) {
        match self.commits.get_mut(&fingerprint) {
            Some(ids) => ids.push(commit),
            None => {
                self.order.push(fingerprint.clone());
                self.commits.insert(fingerprint, vec![commit]);
            }
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&[CommitId]> {
        self.commits.get(fingerprint).map(Vec::as_slice)
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }

    /// Fingerprints present in both indexes, in this index's first-seen order,
    /// with each side's commits.
    pub fn shared_with<'a>(
        &'a self,
        other: &'a FingerprintIndex,
    ) -> impl Iterator<Item = (&'a Fingerprint, &'a [CommitId], &'a [CommitId])> + 'a {
        self.order.iter().filter_map(move |fp| {
            let ours = self.get(fp)?;
            let theirs = other.get(fp)?;
            Some((fp, ours, theirs))
        })
    }

    /// Number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(commit: &str, fingerprint: &str) -> CommitFingerprint {
        CommitFingerprint {
            commit: CommitId::new(commit),
            fingerprint: Fingerprint::new(fingerprint),
        }
    }

    #[test]
    fn test_build_groups_duplicates_in_listing_order() {
        let index = FingerprintIndex::build(vec![
            entry("c3", "pa"),
            entry("c2", "pb"),
            entry("c1", "pa"),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(&Fingerprint::new("pa")).unwrap(),
            &[CommitId::new("c3"), CommitId::new("c1")]
        );
        let order: Vec<&str> = index.fingerprints().map(Fingerprint::as_str).collect();
        assert_eq!(order, vec!["pa", "pb"]);
    }

    #[test]
    fn test_shared_with_follows_first_seen_order() {
        let from = FingerprintIndex::build(vec![
            entry("f1", "pz"),
            entry("f2", "py"),
            entry("f3", "only-from"),
        ]);
        let to = FingerprintIndex::build(vec![entry("t1", "py"), entry("t2", "pz")]);

        let shared: Vec<(&str, usize, usize)> = from
            .shared_with(&to)
            .map(|(fp, ours, theirs)| (fp.as_str(), ours.len(), theirs.len()))
            .collect();
        assert_eq!(shared, vec![("pz", 1, 1), ("py", 1, 1)]);
    }

    #[test]
    fn test_empty_index() {
        let index = FingerprintIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.get(&Fingerprint::new("missing")).is_none());
    }
}
