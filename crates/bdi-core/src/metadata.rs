//! Metadata side table
//!
//! Out-of-band per-node annotations keyed by opaque handles: semantic tags
//! (DSL provenance, debug names), proof tags, hardware hints, entropy
//! estimates, and attention scores. The store is mutated during build and
//! optimize phases only; the interpreter holds it by shared borrow.

use crate::node::MetadataHandle;
use std::collections::HashMap;

/// Proof system a [`Metadata::Proof`] hash belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ProofSystem {
    #[default]
    None,
    InternalHash,
    LeanHash,
    CoqHash,
}

/// Cache-locality hint for placement tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum CacheHint {
    #[default]
    None,
    L1,
    L2,
    L3,
}

/// One metadata entry
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub enum Metadata {
    #[default]
    None,
    /// Provenance and human-readable description
    Semantic { dsl_ref: String, description: String },
    /// Hash of an external proof artifact
    Proof { system: ProofSystem, hash: Vec<u8> },
    /// Placement hints, opaque to the interpreter
    HardwareHints {
        cache: CacheHint,
        compute_unit: u32,
        simd_aligned: bool,
    },
    /// Information-content estimates
    Entropy { shannon: f64, kolmogorov_estimate: u64 },
    /// Attention weighting for downstream schedulers
    Attention { score: f32 },
}

impl Metadata {
    pub fn semantic(dsl_ref: impl Into<String>, description: impl Into<String>) -> Self {
        Metadata::Semantic {
            dsl_ref: dsl_ref.into(),
            description: description.into(),
        }
    }
}

/// Handle-indexed store of metadata entries
///
/// Handle generation is monotonic starting at 1; handle `0` is reserved for
/// "no metadata" and is never issued.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct MetadataStore {
    entries: HashMap<MetadataHandle, Metadata>,
    next_handle: MetadataHandle,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Insert an entry and return its fresh (nonzero) handle
    pub fn add(&mut self, metadata: Metadata) -> MetadataHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.insert(handle, metadata);
        handle
    }

    pub fn get(&self, handle: MetadataHandle) -> Option<&Metadata> {
        self.entries.get(&handle)
    }

    pub fn get_mut(&mut self, handle: MetadataHandle) -> Option<&mut Metadata> {
        self.entries.get_mut(&handle)
    }

    /// Overwrite an existing entry; false when the handle was never issued
    /// or has been removed
    pub fn update(&mut self, handle: MetadataHandle, metadata: Metadata) -> bool {
        match self.entries.get_mut(&handle) {
            Some(slot) => {
                *slot = metadata;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, handle: MetadataHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The semantic description attached to a handle, if any. Used by the
    /// interpreter to annotate assertion failures.
    pub fn description(&self, handle: MetadataHandle) -> Option<&str> {
        match self.get(handle) {
            Some(Metadata::Semantic { description, .. }) if !description.is_empty() => Some(description),
            _ => None,
        }
    }
}
