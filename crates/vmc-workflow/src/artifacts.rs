//! Bookkeeping for resources a run created itself.

use std::fmt;

use crate::api::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Library,
    LibraryItem,
    VirtualMachine,
}

impl ArtifactKind {
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            Self::Library => ResourceKind::Library,
            Self::LibraryItem => ResourceKind::LibraryItem,
            Self::VirtualMachine => ResourceKind::VirtualMachine,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.resource_kind().fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedArtifact {
    pub kind: ArtifactKind,
    pub name: String,
    pub id: String,
}

impl fmt::Display for CreatedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' ({})", self.kind, self.name, self.id)
    }
}

/// Artifacts in creation order. Pre-existing resources that a run reused
/// are never recorded here.
#[derive(Debug, Default)]
pub struct ArtifactLedger {
    entries: Vec<CreatedArtifact>,
}

impl ArtifactLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, artifact: CreatedArtifact) {
        log::debug!("Recorded created artifact {}", artifact);
        self.entries.push(artifact);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Creation order.
    pub fn iter(&self) -> impl Iterator<Item = &CreatedArtifact> {
        self.entries.iter()
    }

    /// Newest first.
    pub fn iter_rev(&self) -> impl Iterator<Item = &CreatedArtifact> {
        self.entries.iter().rev()
    }
}
