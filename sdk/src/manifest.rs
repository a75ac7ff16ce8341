// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! ASiC manifest files.

use ades_crypto::hash::DigestAlgorithm;
use serde::{Deserialize, Serialize};

/// A parsed ASiC-E manifest, mapping signed filenames to digests.
///
/// Manifests are produced by the container-format collaborators; this crate
/// consumes them for scope computation and for the counter-signature
/// coverage guard.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ManifestFile {
    /// Filename of the manifest inside the container.
    pub filename: String,

    /// Filename of the signature or timestamp the manifest belongs to.
    pub signature_filename: String,

    /// The signed data entries.
    pub entries: Vec<ManifestEntry>,
}

/// One entry of a [`ManifestFile`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ManifestEntry {
    /// Filename of the signed object inside the container.
    pub uri: String,

    /// Digest algorithm of `digest`.
    pub digest_algorithm: DigestAlgorithm,

    /// Hex-encoded digest of the signed object.
    pub digest: String,
}

impl ManifestFile {
    /// Return `true` if the manifest lists `filename` among its entries.
    pub fn covers(&self, filename: &str) -> bool {
        self.entries.iter().any(|entry| entry.uri == filename)
    }
}
