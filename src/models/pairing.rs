use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A test file and the production file it was matched to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub test: PathBuf,
    pub production: Option<PathBuf>,
}

/// Test file → production file mapping for one run.
///
/// Keys are unique and iterate in path order, so the exchange artifact
/// is written in the same order every time for the same tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingSet {
    entries: BTreeMap<PathBuf, Option<PathBuf>>,
}

impl PairingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pairing. A second insert for the same test file replaces the first.
    pub fn insert(&mut self, test: PathBuf, production: Option<PathBuf>) {
        self.entries.insert(test, production);
    }

    pub fn get(&self, test: &Path) -> Option<Option<&Path>> {
        self.entries.get(test).map(|p| p.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of test files that found a production counterpart.
    pub fn matched(&self) -> usize {
        self.entries.values().filter(|p| p.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, Option<&Path>)> {
        self.entries
            .iter()
            .map(|(test, prod)| (test.as_path(), prod.as_deref()))
    }

    pub fn to_pairings(&self) -> Vec<Pairing> {
        self.iter()
            .map(|(test, production)| Pairing {
                test: test.to_path_buf(),
                production: production.map(Path::to_path_buf),
            })
            .collect()
    }
}

/// Serializable view used by the `pairs` command.
#[derive(Debug, Clone, Serialize)]
pub struct PairingsResult {
    pub pairings: Vec<Pairing>,
    /// Number of discovered test files
    pub total: usize,
    /// Number of test files with a production counterpart
    pub matched: usize,
}

impl From<&PairingSet> for PairingsResult {
    fn from(set: &PairingSet) -> Self {
        Self {
            pairings: set.to_pairings(),
            total: set.len(),
            matched: set.matched(),
        }
    }
}
