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

//! Counter-signature traversal and creation guards.

#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeSet;

use ades::{
    counter_signature::assert_counter_signature_possible,
    document::Document,
    manifest::{ManifestEntry, ManifestFile},
    process::ValidationPolicy,
    signature::SignatureScopeType,
    validator::DocumentValidator,
    DigestAlgorithm,
};
use ades_crypto::testing::{issue, make_root};
use common::{sign_document, verifier_trusting, StaticFormatHandler};

#[test]
fn counter_signature_tree_is_flattened_with_parent_links() {
    let root = make_root("Counter Root");
    let master_signer = issue(&root, "Master Signer", 110, false);
    let counter_signer_a = issue(&root, "Counter Signer A", 111, false);
    let counter_signer_b = issue(&root, "Counter Signer B", 112, false);
    let nested_signer = issue(&root, "Nested Counter Signer", 113, false);

    let mut master = sign_document(b"document content", &master_signer);
    let master_id = master.id().to_string();

    // Counter-signatures cover the master's signature value.
    let mut counter_a = sign_document(master.signature_value(), &counter_signer_a);
    let counter_a_id = counter_a.id().to_string();

    let nested = sign_document(counter_a.signature_value(), &nested_signer);
    let nested_id = nested.id().to_string();
    counter_a.add_counter_signature(nested);

    let counter_b = sign_document(master.signature_value(), &counter_signer_b);
    let counter_b_id = counter_b.id().to_string();

    master.add_counter_signature(counter_a);
    master.add_counter_signature(counter_b);

    let registry = StaticFormatHandler::new(vec![master]).into_registry();
    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator =
        DocumentValidator::from_document(document, &registry, verifier_trusting(&root)).unwrap();
    let reports = validator
        .validate_document(&ValidationPolicy::default())
        .unwrap();

    let diag = &reports.diagnostic_data;

    // The flattened list holds each signature exactly once.
    assert_eq!(diag.signatures.len(), 4);
    let distinct: BTreeSet<&str> = diag.signatures.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(distinct.len(), 4);

    // Direct children of the master, and only those.
    let children: BTreeSet<String> = diag
        .counter_signatures_of(&master_id)
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(
        children,
        BTreeSet::from([counter_a_id.clone(), counter_b_id.clone()])
    );

    // The nested counter-signature hangs off counter A, not the master.
    let nested_children: BTreeSet<String> = diag
        .counter_signatures_of(&counter_a_id)
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(nested_children, BTreeSet::from([nested_id.clone()]));

    // The master has no parent; counter-signatures link back by id.
    assert_eq!(diag.signature_by_id(&master_id).unwrap().parent_id, None);
    assert_eq!(
        diag.signature_by_id(&nested_id).unwrap().parent_id,
        Some(counter_a_id.clone())
    );

    // Counter-signature scopes point at the counter-signed signature.
    let counter_a_diag = diag.signature_by_id(&counter_a_id).unwrap();
    assert_eq!(
        counter_a_diag.scopes[0].scope_type,
        SignatureScopeType::CounterSignedSignature
    );
    assert_eq!(counter_a_diag.scopes[0].name, master_id);

    // The simple report exposes the relation as well.
    let entry = reports
        .simple_report
        .signatures
        .iter()
        .find(|s| s.id == counter_b_id)
        .unwrap();
    assert_eq!(entry.counter_signature_of, Some(master_id));
}

#[test]
fn counter_signature_rejected_when_target_covered_by_another_manifest() {
    let covering_manifest = ManifestFile {
        filename: "META-INF/ASiCArchiveManifest001.xml".to_string(),
        signature_filename: "META-INF/timestamp001.tst".to_string(),
        entries: vec![
            ManifestEntry {
                uri: "doc.txt".to_string(),
                digest_algorithm: DigestAlgorithm::Sha256,
                digest: "aa".to_string(),
            },
            ManifestEntry {
                uri: "META-INF/signature001.p7s".to_string(),
                digest_algorithm: DigestAlgorithm::Sha256,
                digest: "bb".to_string(),
            },
        ],
    };

    let err = assert_counter_signature_possible(
        std::slice::from_ref(&covering_manifest),
        "META-INF/signature001.p7s",
    )
    .unwrap_err();

    assert!(err.to_string().contains("covered by another manifest"));

    // A signature file not listed in any manifest stays counter-signable.
    assert!(assert_counter_signature_possible(
        std::slice::from_ref(&covering_manifest),
        "META-INF/signature002.p7s"
    )
    .is_ok());
}
