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

//! Revocation acceptance, source merging and archival scenarios.

#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeSet;

use ades::{
    document::Document,
    process::{Indication, SubIndication, ValidationPolicy},
    source::CertificateOrigin,
    validator::DocumentValidator,
    RevocationStatus, TimestampType,
};
use ades_crypto::testing::{
    build_ocsp, build_timestamp, issue, issue_ocsp_responder, issue_tsa, make_root,
};
use chrono::{TimeZone, Utc};
use common::{sign_document, verifier_trusting, StaticFormatHandler};

fn control_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

#[test]
fn merged_certificate_sources_keep_all_origins() {
    let root = make_root("Merge Root");
    let signer_a = issue(&root, "Merge Signer A", 120, false);
    let signer_b = issue(&root, "Merge Signer B", 121, false);

    // Both signatures carry the root under different origins.
    let mut signature_a = sign_document(b"document content", &signer_a);
    signature_a.add_certificate(root.cert.clone(), CertificateOrigin::KeyInfo);

    let mut signature_b = sign_document(b"document content", &signer_b);
    signature_b.add_certificate(root.cert.clone(), CertificateOrigin::CertificateValues);

    let registry = StaticFormatHandler::new(vec![signature_a, signature_b]).into_registry();
    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator =
        DocumentValidator::from_document(document, &registry, verifier_trusting(&root)).unwrap();
    validator.set_validation_time(control_time());
    let reports = validator
        .validate_document(&ValidationPolicy::default())
        .unwrap();

    let diag = &reports.diagnostic_data;

    // Union of distinct certificates: root + two signers.
    let distinct: BTreeSet<&str> = diag
        .used_certificates
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert!(distinct.contains(root.cert.id()));
    assert!(distinct.contains(signer_a.cert.id()));
    assert!(distinct.contains(signer_b.cert.id()));

    // The root keeps every origin it was found under.
    let root_diag = diag.certificate_by_id(root.cert.id()).unwrap();
    let origins: BTreeSet<CertificateOrigin> =
        root_diag.provenance.iter().map(|p| p.origin).collect();
    assert!(origins.contains(&CertificateOrigin::KeyInfo));
    assert!(origins.contains(&CertificateOrigin::CertificateValues));
}

#[test]
fn rac_terminates_on_cyclic_revocation_signers() {
    let root = make_root("Cycle Root");
    let leaf = issue(&root, "Cycle Signer", 130, false);
    let responder_a = issue_ocsp_responder(&root, "Cycle Responder A", 131);
    let responder_b = issue_ocsp_responder(&root, "Cycle Responder B", 132);

    let produced_at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();

    let mut signature = sign_document(b"document content", &leaf);

    // Leaf status from A; A's status from B; B's status from A again:
    // the revocation-signer graph is cyclic.
    signature.add_ocsp(build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder_a,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    ));
    signature.add_ocsp(build_ocsp(
        &responder_a.cert,
        &root.cert,
        &responder_b,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    ));
    signature.add_ocsp(build_ocsp(
        &responder_b.cert,
        &root.cert,
        &responder_a,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    ));

    let signature_id = signature.id().to_string();

    let registry = StaticFormatHandler::new(vec![signature]).into_registry();
    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator =
        DocumentValidator::from_document(document, &registry, verifier_trusting(&root)).unwrap();
    validator.set_validation_time(control_time());

    // Termination is the property under test; the verdict is a bonus.
    let reports = validator
        .validate_document(&ValidationPolicy::default())
        .unwrap();

    assert_eq!(
        reports.simple_report.indication_for(&signature_id),
        Some(Indication::Passed)
    );

    // The recursion is bounded by the number of distinct tokens: no
    // revocation id repeats along any acceptance path.
    let block = &reports.detailed_report.signatures[0];
    let mut stack: Vec<(&ades::process::RacResult, Vec<String>)> = block
        .bbb
        .rac_results
        .iter()
        .map(|rac| (rac, vec![]))
        .collect();

    while let Some((rac, path)) = stack.pop() {
        assert!(!path.contains(&rac.id), "revocation {} revisited", rac.id);

        let mut nested_path = path.clone();
        nested_path.push(rac.id.clone());

        for nested in &rac.nested {
            stack.push((nested, nested_path.clone()));
        }
    }
}

#[test]
fn latest_revocation_wins_for_freshness() {
    let root = make_root("Latest Root");
    let leaf = issue(&root, "Latest Signer", 140, false);
    let responder = issue_ocsp_responder(&root, "Latest Responder", 141);

    let older = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let newer = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();

    let mut signature = sign_document(b"document content", &leaf);

    let older_ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        older,
        None,
        false,
    );
    let newer_ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        newer,
        None,
        false,
    );

    signature.add_ocsp(older_ocsp);
    signature.add_ocsp(newer_ocsp.clone());
    signature.add_ocsp(build_ocsp(
        &responder.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        newer,
        None,
        false,
    ));

    let registry = StaticFormatHandler::new(vec![signature]).into_registry();
    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator =
        DocumentValidator::from_document(document, &registry, verifier_trusting(&root)).unwrap();
    validator.set_validation_time(control_time());
    let reports = validator
        .validate_document(&ValidationPolicy::default())
        .unwrap();

    // Both tokens are known for the leaf; the RAC results show both were
    // examined.
    let diag = &reports.diagnostic_data;
    let leaf_diag = diag.certificate_by_id(leaf.cert.id()).unwrap();
    assert_eq!(leaf_diag.revocations.len(), 2);

    let block = &reports.detailed_report.signatures[0];
    assert!(block
        .bbb
        .rac_results
        .iter()
        .any(|rac| rac.id == newer_ocsp.id()));
}

#[test]
fn double_lta_keeps_previous_revocation_ids() {
    let root = make_root("LTA Root");
    let leaf = issue(&root, "LTA Signer", 150, false);
    let responder = issue_ocsp_responder(&root, "LTA Responder", 151);
    let tsa = issue_tsa(&root, "LTA TSA", 152);

    let first_revocation_time = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let second_revocation_time = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();

    let revocation_1 = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        first_revocation_time,
        None,
        false,
    );
    let revocation_2 = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        second_revocation_time,
        None,
        false,
    );

    let build_document = |revocations: &[&ades::OcspToken], archive_times: &[chrono::DateTime<Utc>]| {
        let mut signature = sign_document(b"document content", &leaf);

        let archive_data = b"archived signature structure".to_vec();
        signature.set_archive_timestamp_data(archive_data.clone());

        for revocation in revocations {
            signature.add_ocsp((*revocation).clone());
        }

        for archive_time in archive_times {
            signature.add_timestamp(build_timestamp(
                &tsa,
                &archive_data,
                *archive_time,
                TimestampType::ArchiveTimestamp,
                &[],
                &revocations
                    .iter()
                    .map(|r| r.der().to_vec())
                    .collect::<Vec<_>>(),
            ));
        }

        let registry = StaticFormatHandler::new(vec![signature]).into_registry();
        let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

        let mut validator =
            DocumentValidator::from_document(document, &registry, verifier_trusting(&root))
                .unwrap();
        validator.set_validation_time(control_time());
        validator
            .validate_document(&ValidationPolicy::default())
            .unwrap()
    };

    // First LTA level: one archive timestamp covering revocation 1.
    let first_archive_time = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    let reports_lta = build_document(&[&revocation_1], &[first_archive_time]);

    // Re-extension: a second archive timestamp; revocation 1 is carried
    // over untouched, revocation 2 is added.
    let second_archive_time = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let reports_double_lta = build_document(
        &[&revocation_1, &revocation_2],
        &[first_archive_time, second_archive_time],
    );

    let first_ids: BTreeSet<String> = reports_lta
        .diagnostic_data
        .used_revocations
        .iter()
        .map(|r| r.id.clone())
        .collect();

    let second_ids: BTreeSet<String> = reports_double_lta
        .diagnostic_data
        .used_revocations
        .iter()
        .map(|r| r.id.clone())
        .collect();

    // Every previously collected revocation id persists unchanged across
    // the extension.
    assert!(first_ids.is_subset(&second_ids));
    assert!(first_ids.contains(revocation_1.id()));
    assert!(second_ids.contains(revocation_2.id()));

    // The re-extended document has exactly one more revocation token; the
    // covered one was not refetched under a new identity.
    assert_eq!(second_ids.len(), first_ids.len() + 1);
}

#[test]
fn broken_archive_timestamp_reports_found_but_not_intact() {
    let root = make_root("Broken Archive Root");
    let leaf = issue(&root, "Broken Archive Signer", 160, false);
    let tsa = issue_tsa(&root, "Broken Archive TSA", 161);

    let mut signature = sign_document(b"document content", &leaf);

    // The archive timestamp was built over content that no longer matches
    // the current archive data.
    signature.set_archive_timestamp_data(b"current archive data".to_vec());
    signature.add_timestamp(build_timestamp(
        &tsa,
        b"original archive data",
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        TimestampType::ArchiveTimestamp,
        &[],
        &[],
    ));

    let registry = StaticFormatHandler::new(vec![signature]).into_registry();
    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator =
        DocumentValidator::from_document(document, &registry, verifier_trusting(&root)).unwrap();
    validator.set_validation_time(control_time());
    let reports = validator
        .validate_document(&ValidationPolicy::default())
        .unwrap();

    let ts = &reports.diagnostic_data.used_timestamps[0];

    // "Found but broken" is distinguishable from "not found."
    assert!(ts.message_imprint_data_found);
    assert!(!ts.message_imprint_data_intact);

    // The timestamp's own building block concludes with a hash failure.
    let block = &reports.detailed_report.signatures[0];
    let ts_bbb = &block.timestamp_bbbs[0];
    assert_eq!(ts_bbb.conclusion.indication, Indication::Failed);
    assert_eq!(
        ts_bbb.conclusion.sub_indication,
        Some(SubIndication::HashFailure)
    );
}

#[test]
fn archive_timestamp_without_data_reports_not_found() {
    let root = make_root("Missing Archive Root");
    let leaf = issue(&root, "Missing Archive Signer", 170, false);
    let tsa = issue_tsa(&root, "Missing Archive TSA", 171);

    let mut signature = sign_document(b"document content", &leaf);

    // No archive data is provided at all.
    signature.add_timestamp(build_timestamp(
        &tsa,
        b"original archive data",
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        TimestampType::ArchiveTimestamp,
        &[],
        &[],
    ));

    let registry = StaticFormatHandler::new(vec![signature]).into_registry();
    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator =
        DocumentValidator::from_document(document, &registry, verifier_trusting(&root)).unwrap();
    validator.set_validation_time(control_time());
    let reports = validator
        .validate_document(&ValidationPolicy::default())
        .unwrap();

    let ts = &reports.diagnostic_data.used_timestamps[0];
    assert!(!ts.message_imprint_data_found);
    assert!(!ts.message_imprint_data_intact);

    let block = &reports.detailed_report.signatures[0];
    let ts_bbb = &block.timestamp_bbbs[0];
    assert_eq!(ts_bbb.conclusion.indication, Indication::Indeterminate);
    assert_eq!(
        ts_bbb.conclusion.sub_indication,
        Some(SubIndication::SignedDataNotFound)
    );
}
