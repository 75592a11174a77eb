//! Portal upload plan
//!
//! Maps portal resource identifiers to files in the run manifest. Only files
//! that were produced and closed are handed to the uploader; the transfer
//! itself happens outside this crate.

use crate::config::UploadTarget;
use crate::processor::writer::OutputManifest;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// A resource ready for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedUpload {
    pub resource_id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct UploadPlan {
    targets: Vec<UploadTarget>,
}

impl UploadPlan {
    pub fn new(targets: Vec<UploadTarget>) -> Self {
        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Pair each target with its file, skipping discarded or missing files
    pub fn resolve(&self, manifest: &OutputManifest) -> Vec<ResolvedUpload> {
        let mut resolved = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            match manifest.get(&target.file) {
                Some(path) if path.is_file() => resolved.push(ResolvedUpload {
                    resource_id: target.resource_id.clone(),
                    path: path.to_path_buf(),
                }),
                Some(path) => warn!(
                    "Skipping upload {}: {} no longer exists",
                    target.resource_id,
                    path.display()
                ),
                None => warn!(
                    "Skipping upload {}: no file '{}' was produced",
                    target.resource_id, target.file
                ),
            }
        }
        resolved
    }
}
