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

//! Creation-time guards for counter-signatures in ASiC containers.

use crate::{manifest::ManifestFile, Error, Result};

/// Return `true` if `signature_filename` appears among the entries of any
/// manifest in the container.
pub fn is_covered_by_manifest(manifests: &[ManifestFile], signature_filename: &str) -> bool {
    manifests
        .iter()
        .any(|manifest| manifest.covers(signature_filename))
}

/// Check that a counter-signature may be created over the signature stored
/// under `signature_filename`.
///
/// Counter-signing a signature file that is itself listed in another
/// signature's manifest would break that manifest's digests, so the
/// operation is rejected up front.
pub fn assert_counter_signature_possible(
    manifests: &[ManifestFile],
    signature_filename: &str,
) -> Result<()> {
    if is_covered_by_manifest(manifests, signature_filename) {
        return Err(Error::CounterSignatureCoveredByManifest(
            signature_filename.to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use ades_crypto::hash::DigestAlgorithm;

    use super::*;
    use crate::manifest::ManifestEntry;

    fn manifest_covering(uri: &str) -> ManifestFile {
        ManifestFile {
            filename: "META-INF/ASiCManifest001.xml".to_string(),
            signature_filename: "META-INF/signature002.p7s".to_string(),
            entries: vec![ManifestEntry {
                uri: uri.to_string(),
                digest_algorithm: DigestAlgorithm::Sha256,
                digest: "00".to_string(),
            }],
        }
    }

    #[test]
    fn rejected_when_covered() {
        let manifests = vec![manifest_covering("META-INF/signature001.p7s")];

        let err = assert_counter_signature_possible(&manifests, "META-INF/signature001.p7s")
            .unwrap_err();

        assert!(err.to_string().contains("covered by another manifest"));
        assert!(err.to_string().contains("META-INF/signature001.p7s"));
    }

    #[test]
    fn allowed_when_not_covered() {
        let manifests = vec![manifest_covering("doc.txt")];

        assert!(
            assert_counter_signature_possible(&manifests, "META-INF/signature001.p7s").is_ok()
        );
    }
}
