//! Repeat-inclusion guard.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::InclusionPolicy;

/// Tracks which files an expansion has entered.
///
/// With [`InclusionPolicy::RejectRepeats`] every entered path stays recorded
/// for the rest of the expansion. With [`InclusionPolicy::ActiveChain`] only
/// the files currently being expanded are recorded, so a path is rejected only
/// when it would include itself.
#[derive(Debug, Default)]
pub(crate) struct InclusionGuard {
    policy: InclusionPolicy,
    seen: HashSet<PathBuf>,
    chain: Vec<PathBuf>,
}

impl InclusionGuard {
    pub(crate) fn new(policy: InclusionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Record `path` as entered. Returns `false` when the policy forbids it.
    pub(crate) fn enter(&mut self, path: &Path) -> bool {
        match self.policy {
            InclusionPolicy::RejectRepeats => {
                if !self.seen.insert(path.to_path_buf()) {
                    return false;
                }
            }
            InclusionPolicy::ActiveChain => {
                if self.chain.iter().any(|p| p == path) {
                    return false;
                }
            }
        }
        self.chain.push(path.to_path_buf());
        true
    }

    /// Mark the most recently entered `path` as finished.
    pub(crate) fn leave(&mut self, path: &Path) {
        if self.chain.last().is_some_and(|p| p == path) {
            self.chain.pop();
        }
    }

    /// Files currently being expanded, outermost first.
    pub(crate) fn chain(&self) -> &[PathBuf] {
        &self.chain
    }

    pub(crate) fn reset(&mut self) {
        self.seen.clear();
        self.chain.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_repeats_remembers_finished_files() {
        let mut guard = InclusionGuard::new(InclusionPolicy::RejectRepeats);
        let shared = Path::new("/base/shared.yml");

        assert!(guard.enter(shared));
        guard.leave(shared);
        assert!(guard.chain().is_empty());
        assert!(!guard.enter(shared));
    }

    #[test]
    fn test_active_chain_only_rejects_reentry() {
        let mut guard = InclusionGuard::new(InclusionPolicy::ActiveChain);
        let a = Path::new("/base/a.yml");
        let b = Path::new("/base/b.yml");

        assert!(guard.enter(a));
        assert!(guard.enter(b));
        assert!(!guard.enter(a));
        assert_eq!(guard.chain(), &[a.to_path_buf(), b.to_path_buf()]);

        guard.leave(b);
        guard.leave(a);
        assert!(guard.enter(b));
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut guard = InclusionGuard::new(InclusionPolicy::RejectRepeats);
        let a = Path::new("/base/a.yml");
        assert!(guard.enter(a));
        guard.reset();
        assert!(guard.enter(a));
    }
}
