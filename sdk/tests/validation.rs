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

//! End-to-end validation verdicts over a synthetic PKI.

#![allow(clippy::unwrap_used)]

mod common;

use ades::{
    document::Document,
    process::{Indication, SubIndication, ValidationPolicy},
    validator::DocumentValidator,
    verifier::CertificateVerifier,
    DigestAlgorithm, RevocationStatus, TimestampType,
};
use ades_crypto::testing::{
    build_ocsp, build_timestamp, issue, issue_ocsp_responder, issue_tsa, make_root, TestIdentity,
};
use chrono::{TimeZone, Utc};
use common::{sign_document, verifier_trusting, StaticFormatHandler};

struct Pki {
    root: TestIdentity,
    leaf: TestIdentity,
    responder: TestIdentity,
    tsa: TestIdentity,
}

fn pki(tag: &str) -> Pki {
    let root = make_root(&format!("{tag} Root CA"));
    let leaf = issue(&root, &format!("{tag} Signer"), 100, false);
    let responder = issue_ocsp_responder(&root, &format!("{tag} Responder"), 101);
    let tsa = issue_tsa(&root, &format!("{tag} TSA"), 102);

    Pki {
        root,
        leaf,
        responder,
        tsa,
    }
}

fn control_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

// Attach good OCSP data for the leaf, the responder itself and the TSA, so
// every non-trusted chain certificate has acceptable revocation data.
fn attach_revocation_data(signature: &mut ades::signature::AdvancedSignature, pki: &Pki) {
    let produced_at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let next_update = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();

    for subject in [&pki.leaf, &pki.responder, &pki.tsa] {
        signature.add_ocsp(build_ocsp(
            &subject.cert,
            &pki.root.cert,
            &pki.responder,
            RevocationStatus::Good,
            produced_at,
            Some(next_update),
            false,
        ));
    }
}

fn validate(
    signature: ades::signature::AdvancedSignature,
    verifier: CertificateVerifier,
    policy: &ValidationPolicy,
) -> ades::reports::Reports {
    common::init_logs();

    let registry = StaticFormatHandler::new(vec![signature]).into_registry();

    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator = DocumentValidator::from_document(document, &registry, verifier).unwrap();
    validator.set_validation_time(control_time());
    validator.validate_document(policy).unwrap()
}

#[test]
fn valid_signature_passes() {
    let pki = pki("Valid");
    let data = b"document content";

    let mut signature = sign_document(data, &pki.leaf);
    attach_revocation_data(&mut signature, &pki);

    let ts = build_timestamp(
        &pki.tsa,
        signature.signature_value(),
        Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        TimestampType::SignatureTimestamp,
        &[],
        &[],
    );
    signature.add_timestamp(ts);

    let signature_id = signature.id().to_string();

    let reports = validate(signature, verifier_trusting(&pki.root), &ValidationPolicy::default());

    assert_eq!(
        reports.simple_report.indication_for(&signature_id),
        Some(Indication::Passed)
    );

    let entry = &reports.simple_report.signatures[0];
    assert_eq!(entry.signed_by.as_deref(), Some("CN=Valid Signer"));

    // The signature timestamp moves the best signature time before the
    // validation time.
    assert_eq!(
        entry.best_signature_time,
        Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()
    );

    assert!(reports.diagnostic_data.orphan_tokens.is_empty());
}

#[test]
fn tampered_signature_fails() {
    let pki = pki("Tampered");

    // The signature value was computed over different content than the
    // signature claims to cover.
    let original = sign_document(b"original content", &pki.leaf);

    let mut broken = ades::signature::AdvancedSignature::new(
        ades::format::SignatureForm::CAdES,
        original.signature_value().to_vec(),
        b"document content".to_vec(),
        ades_crypto::testing::ECDSA_WITH_SHA256_OID_STR,
        ades_crypto::testing::SHA256_OID_STR,
    );
    broken.add_certificate(
        pki.leaf.cert.clone(),
        ades::source::CertificateOrigin::KeyInfo,
    );
    attach_revocation_data(&mut broken, &pki);

    let broken_id = broken.id().to_string();

    let reports = validate(broken, verifier_trusting(&pki.root), &ValidationPolicy::default());

    let entry = reports
        .simple_report
        .signatures
        .iter()
        .find(|s| s.id == broken_id)
        .unwrap();

    assert_eq!(entry.indication, Indication::Failed);
    assert_eq!(entry.sub_indication, Some(SubIndication::SigCryptoFailure));
}

#[test]
fn untrusted_chain_is_indeterminate() {
    let pki = pki("Untrusted");

    let mut signature = sign_document(b"document content", &pki.leaf);
    attach_revocation_data(&mut signature, &pki);
    let signature_id = signature.id().to_string();

    // No trust anchors configured at all.
    let reports = validate(
        signature,
        CertificateVerifier::new(),
        &ValidationPolicy::default(),
    );

    let entry = reports
        .simple_report
        .signatures
        .iter()
        .find(|s| s.id == signature_id)
        .unwrap();

    assert_eq!(entry.indication, Indication::Indeterminate);
    assert_eq!(
        entry.sub_indication,
        Some(SubIndication::NoCertificateChainFound)
    );
}

#[test]
fn missing_revocation_data_is_try_later() {
    let pki = pki("NoRevocation");

    let signature = sign_document(b"document content", &pki.leaf);
    let signature_id = signature.id().to_string();

    let reports = validate(signature, verifier_trusting(&pki.root), &ValidationPolicy::default());

    let entry = reports
        .simple_report
        .signatures
        .iter()
        .find(|s| s.id == signature_id)
        .unwrap();

    assert_eq!(entry.indication, Indication::Indeterminate);
    assert_eq!(entry.sub_indication, Some(SubIndication::TryLater));

    // The gap is visible in the diagnostic data as an orphan marker.
    assert!(reports
        .diagnostic_data
        .orphan_tokens
        .iter()
        .any(|o| o.id == pki.leaf.cert.id()));
}

#[test]
fn revoked_certificate_is_reported() {
    let pki = pki("Revoked");

    let mut signature = sign_document(b"document content", &pki.leaf);

    let produced_at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let revoked_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

    signature.add_ocsp(build_ocsp(
        &pki.leaf.cert,
        &pki.root.cert,
        &pki.responder,
        RevocationStatus::Revoked {
            time: revoked_at,
            reason: None,
        },
        produced_at,
        None,
        false,
    ));

    // Revocation data for the responder so its own chain is acceptable.
    signature.add_ocsp(build_ocsp(
        &pki.responder.cert,
        &pki.root.cert,
        &pki.responder,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    ));

    let signature_id = signature.id().to_string();

    let reports = validate(signature, verifier_trusting(&pki.root), &ValidationPolicy::default());

    let entry = reports
        .simple_report
        .signatures
        .iter()
        .find(|s| s.id == signature_id)
        .unwrap();

    assert_eq!(entry.indication, Indication::Indeterminate);
    assert_eq!(entry.sub_indication, Some(SubIndication::RevokedNoPoe));
}

#[test]
fn expired_digest_algorithm_rejected_at_control_time() {
    let pki = pki("Expiring");

    let mut signature = sign_document(b"document content", &pki.leaf);
    attach_revocation_data(&mut signature, &pki);
    let signature_id = signature.id().to_string();

    // SHA-256 expires before the control time in this policy.
    let mut policy = ValidationPolicy::default();
    policy.cryptographic.algorithm_expiration_dates.insert(
        DigestAlgorithm::Sha256,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    );

    let reports = validate(signature, verifier_trusting(&pki.root), &policy);

    let entry = reports
        .simple_report
        .signatures
        .iter()
        .find(|s| s.id == signature_id)
        .unwrap();

    assert_eq!(entry.indication, Indication::Indeterminate);
    assert_eq!(
        entry.sub_indication,
        Some(SubIndication::CryptoConstraintsFailureNoPoe)
    );
}

#[test]
fn accepted_digest_algorithm_before_expiration() {
    let pki = pki("NotYetExpired");

    let mut signature = sign_document(b"document content", &pki.leaf);
    attach_revocation_data(&mut signature, &pki);
    let signature_id = signature.id().to_string();

    // Expiration date after the control time: still acceptable.
    let mut policy = ValidationPolicy::default();
    policy.cryptographic.algorithm_expiration_dates.insert(
        DigestAlgorithm::Sha256,
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
    );

    let reports = validate(signature, verifier_trusting(&pki.root), &policy);

    assert_eq!(
        reports.simple_report.indication_for(&signature_id),
        Some(Indication::Passed)
    );
}

#[test]
fn validation_is_idempotent() {
    let pki = pki("Idempotent");

    // A deliberately gappy run: no revocation data, so orphan markers are
    // produced.
    let make_signature = || sign_document(b"document content", &pki.leaf);

    let reports_a = validate(
        make_signature(),
        verifier_trusting(&pki.root),
        &ValidationPolicy::default(),
    );
    let reports_b = validate(
        make_signature(),
        verifier_trusting(&pki.root),
        &ValidationPolicy::default(),
    );

    let verdicts = |r: &ades::reports::Reports| {
        r.simple_report
            .signatures
            .iter()
            .map(|s| (s.id.clone(), s.indication, s.sub_indication))
            .collect::<Vec<_>>()
    };

    assert_eq!(verdicts(&reports_a), verdicts(&reports_b));
    assert_eq!(
        reports_a.diagnostic_data.orphan_token_ids(),
        reports_b.diagnostic_data.orphan_token_ids()
    );
}

#[test]
fn validation_log_records_gaps() {
    use ades_status_tracker::validation_codes;

    let pki = pki("Logged");

    // No revocation data at all: the run succeeds but the gap is logged.
    let signature = sign_document(b"document content", &pki.leaf);

    let registry = StaticFormatHandler::new(vec![signature]).into_registry();
    let document = Document::new(b"document content".to_vec()).with_name("doc.txt");

    let mut validator = DocumentValidator::from_document(
        document,
        &registry,
        verifier_trusting(&pki.root),
    )
    .unwrap();
    validator.set_validation_time(control_time());
    validator
        .validate_document(&ValidationPolicy::default())
        .unwrap();

    let log = validator.validation_log();
    assert!(log.has_status(validation_codes::SIGNATURE_INTACT));
    assert!(log.has_status(validation_codes::REVOCATION_MISSING));
}

#[test]
fn reports_serialize_to_json() {
    let pki = pki("Serialize");

    let mut signature = sign_document(b"document content", &pki.leaf);
    attach_revocation_data(&mut signature, &pki);

    let reports = validate(signature, verifier_trusting(&pki.root), &ValidationPolicy::default());

    let simple = reports.simple_report_json().unwrap();
    assert!(simple.contains("PASSED"));

    let detailed = reports.detailed_report_json().unwrap();
    assert!(detailed.contains("XCV"));

    let diagnostic = reports.diagnostic_data_json().unwrap();
    assert!(diagnostic.contains("used_certificates"));
}
