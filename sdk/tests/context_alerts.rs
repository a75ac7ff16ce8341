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

//! Alert routing of the validation context's augmentation-time checks.

#![allow(clippy::unwrap_used)]

mod common;

use ades::{
    alert::StatusAlert,
    context::ValidationContext,
    source::AiaSource,
    verifier::CertificateVerifier,
    CertificateToken, RevocationStatus, TimestampType,
};
use ades_crypto::testing::{
    build_ocsp, build_timestamp, issue, issue_ocsp_responder, issue_tsa, make_root, TestIdentity,
};
use chrono::{TimeZone, Utc};
use common::verifier_trusting;

fn control_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

#[test]
fn fixed_point_resolves_chain_and_revocations() {
    let root = make_root("Context Root");
    let leaf = issue(&root, "Context Leaf", 200, false);
    let responder = issue_ocsp_responder(&root, "Context Responder", 201);

    let produced_at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    );

    let verifier = verifier_trusting(&root);

    let mut context = ValidationContext::new(control_time());
    context.initialize(&verifier);
    context.add_certificate_token_for_verification(leaf.cert.clone());
    context.add_ocsp_token(ocsp.clone());
    context.validate();

    // The leaf chains to the trusted root.
    assert_eq!(context.issuer_id_of(leaf.cert.id()), Some(root.cert.id()));
    assert_eq!(
        context.certificate_chain_of(leaf.cert.id()),
        vec![leaf.cert.id().to_string(), root.cert.id().to_string()]
    );
    assert!(context.is_trusted_id(root.cert.id()));

    // The revocation was bound to the leaf; the responder certificate was
    // pulled in transitively from the OCSP response.
    assert_eq!(context.revocations_of(leaf.cert.id()).len(), 1);
    assert!(context.certificate(responder.cert.id()).is_some());

    // Nothing is orphaned.
    assert_eq!(context.orphan_certificate_ids().count(), 0);
}

#[test]
fn add_certificate_is_idempotent_by_id() {
    let root = make_root("Idempotent Context Root");

    let mut context = ValidationContext::new(control_time());
    context.add_certificate_token_for_verification(root.cert.clone());
    context.add_certificate_token_for_verification(root.cert.clone());

    assert_eq!(context.processed_certificates().count(), 1);
}

#[test]
fn unresolvable_issuer_is_kept_as_orphan() {
    let root = make_root("Orphan Root");
    let leaf = issue(&root, "Orphan Leaf", 210, false);

    // The root is known nowhere, so the leaf issuer cannot be resolved.
    let verifier = CertificateVerifier::new();

    let mut context = ValidationContext::new(control_time());
    context.initialize(&verifier);
    context.add_certificate_token_for_verification(leaf.cert.clone());
    context.validate();

    let orphans: Vec<&String> = context.orphan_certificate_ids().collect();
    assert_eq!(orphans, vec![leaf.cert.id()]);
}

struct InMemoryAiaSource {
    issuer: CertificateToken,
}

impl AiaSource for InMemoryAiaSource {
    fn get_issuer_candidates(&self, _cert: &CertificateToken) -> Vec<CertificateToken> {
        vec![self.issuer.clone()]
    }
}

#[test]
fn aia_source_resolves_missing_issuer() {
    let root = make_root("AIA Root");
    let leaf = issue(&root, "AIA Leaf", 220, false);

    let mut verifier = CertificateVerifier::new();
    verifier.set_aia_source(Box::new(InMemoryAiaSource {
        issuer: root.cert.clone(),
    }));

    let mut context = ValidationContext::new(control_time());
    context.initialize(&verifier);
    context.add_certificate_token_for_verification(leaf.cert.clone());
    context.validate();

    assert_eq!(context.issuer_id_of(leaf.cert.id()), Some(root.cert.id()));
    assert_eq!(context.orphan_certificate_ids().count(), 0);
}

fn context_with_broken_timestamp<'a>(
    verifier: &'a CertificateVerifier,
    tsa: &TestIdentity,
) -> ValidationContext<'a> {
    let mut ts = build_timestamp(
        tsa,
        b"stamped data",
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        TimestampType::SignatureTimestamp,
        &[],
        &[],
    );

    // The covered data changed after stamping.
    ts.check_message_imprint(Some(b"other data"));

    let mut context = ValidationContext::new(control_time());
    context.initialize(verifier);
    context.add_timestamp_token_for_verification(ts);
    context.validate();
    context
}

#[test]
fn invalid_timestamp_alert_throws_by_default() {
    let root = make_root("Alert Root");
    let tsa = issue_tsa(&root, "Alert TSA", 230);

    let verifier = verifier_trusting(&root);
    let context = context_with_broken_timestamp(&verifier, &tsa);

    let err = context.check_all_timestamps_valid().unwrap_err();
    assert!(err.to_string().contains("broken timestamp"));
}

#[test]
fn invalid_timestamp_alert_can_be_downgraded_to_log() {
    let root = make_root("Alert Root 2");
    let tsa = issue_tsa(&root, "Alert TSA 2", 231);

    let mut verifier = verifier_trusting(&root);
    verifier.set_alert_on_invalid_timestamp(StatusAlert::LogWarn);

    let context = context_with_broken_timestamp(&verifier, &tsa);

    assert!(context.check_all_timestamps_valid().is_ok());
}

#[test]
fn missing_revocation_alert_follows_policy() {
    let root = make_root("Alert Root 3");
    let leaf = issue(&root, "Alert Leaf 3", 232, false);

    let mut verifier = verifier_trusting(&root);

    {
        let mut context = ValidationContext::new(control_time());
        context.initialize(&verifier);
        context.add_certificate_token_for_verification(leaf.cert.clone());
        context.validate();

        // Default escalation: hard failure.
        let err = context.check_all_required_revocation_data_present().unwrap_err();
        assert!(err.to_string().contains(leaf.cert.id()));
    }

    verifier.set_alert_on_missing_revocation_data(StatusAlert::Ignore);

    let mut context = ValidationContext::new(control_time());
    context.initialize(&verifier);
    context.add_certificate_token_for_verification(leaf.cert.clone());
    context.validate();

    assert!(context.check_all_required_revocation_data_present().is_ok());
}

#[test]
fn revoked_certificate_alert_throws_by_default() {
    let root = make_root("Alert Root 4");
    let leaf = issue(&root, "Alert Leaf 4", 233, false);
    let responder = issue_ocsp_responder(&root, "Alert Responder 4", 234);

    let produced_at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let revoked_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    let ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Revoked {
            time: revoked_at,
            reason: None,
        },
        produced_at,
        None,
        false,
    );

    let verifier = verifier_trusting(&root);

    let mut context = ValidationContext::new(control_time());
    context.initialize(&verifier);
    context.add_certificate_token_for_verification(leaf.cert.clone());
    context.add_ocsp_token(ocsp);
    context.validate();

    let err = context.check_certificates_not_revoked().unwrap_err();
    assert!(err.to_string().contains("revoked"));
}

#[test]
fn uncovered_poe_only_warns_by_default() {
    let root = make_root("Alert Root 5");
    let tsa = issue_tsa(&root, "Alert TSA 5", 235);

    let mut ts = build_timestamp(
        &tsa,
        b"stamped data",
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        TimestampType::ArchiveTimestamp,
        &[],
        &[],
    );
    ts.check_message_imprint(Some(b"stamped data"));

    let verifier = verifier_trusting(&root);

    let mut context = ValidationContext::new(control_time());
    context.initialize(&verifier);
    context.add_timestamp_token_for_verification(ts);
    context.validate();

    // No revocation data covers the timestamp, but the default alert only
    // logs.
    assert!(context.check_all_poe_covered_by_revocation_data().is_ok());

    // Same for the best-signature-time freshness advisory.
    assert!(context
        .check_at_least_one_revocation_after_best_signature_time(control_time())
        .is_ok());
}
