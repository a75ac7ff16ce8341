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

use chrono::{TimeZone, Utc};

use crate::{
    ocsp::OcspToken,
    revocation::{RevocationStatus, RevocationType},
    testing::{build_ocsp, issue, issue_ocsp_responder, make_root},
};

#[test]
fn malformed_der_rejected() {
    assert!(OcspToken::from_der(b"not an ocsp response").is_err());
}

#[test]
fn reports_status_for_matching_cert() {
    let root = make_root("OCSP Root");
    let leaf = issue(&root, "OCSP Leaf", 21, false);
    let responder = issue_ocsp_responder(&root, "OCSP Responder", 22);

    let produced_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let next_update = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();

    let ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        produced_at,
        Some(next_update),
        false,
    );

    assert_eq!(ocsp.revocation_type(), RevocationType::Ocsp);
    assert_eq!(ocsp.production_time(), produced_at);

    let status = ocsp.status_for(&leaf.cert, &root.cert).unwrap();
    assert_eq!(status.status, RevocationStatus::Good);
    assert_eq!(status.next_update, Some(next_update));
}

#[test]
fn no_match_for_other_cert() {
    let root = make_root("OCSP Root 2");
    let leaf = issue(&root, "OCSP Leaf 2", 23, false);
    let other = issue(&root, "OCSP Other", 24, false);
    let responder = issue_ocsp_responder(&root, "OCSP Responder 2", 25);

    let produced_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

    let ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    );

    assert!(ocsp.status_for(&other.cert, &root.cert).is_none());
}

#[test]
fn revoked_status_carries_time() {
    let root = make_root("OCSP Root 3");
    let leaf = issue(&root, "OCSP Leaf 3", 26, false);
    let responder = issue_ocsp_responder(&root, "OCSP Responder 3", 27);

    let produced_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let revoked_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

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

    let status = ocsp.status_for(&leaf.cert, &root.cert).unwrap();
    assert_eq!(
        status.status,
        RevocationStatus::Revoked {
            time: revoked_at,
            reason: None
        }
    );
}

#[test]
fn cert_hash_extension() {
    let root = make_root("OCSP Root 4");
    let leaf = issue(&root, "OCSP Leaf 4", 28, false);
    let other = issue(&root, "OCSP Other 4", 29, false);
    let responder = issue_ocsp_responder(&root, "OCSP Responder 4", 30);

    let produced_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

    let with_hash = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        produced_at,
        None,
        true,
    );

    assert!(with_hash.is_cert_hash_extension_present());
    assert!(with_hash.is_cert_hash_match(&leaf.cert));
    assert!(!with_hash.is_cert_hash_match(&other.cert));

    let without_hash = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    );

    assert!(!without_hash.is_cert_hash_extension_present());
}

#[test]
fn from_der_checked_logs_revoked_status() {
    use ades_status_tracker::{validation_codes, StatusTracker};

    let root = make_root("OCSP Log Root");
    let leaf = issue(&root, "OCSP Log Leaf", 33, false);
    let responder = issue_ocsp_responder(&root, "OCSP Log Responder", 34);

    let produced_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let revoked_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

    let revoked = build_ocsp(
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

    let mut validation_log = StatusTracker::default();
    let token = OcspToken::from_der_checked(
        revoked.der(),
        &leaf.cert,
        &root.cert,
        &mut validation_log,
    )
    .unwrap();

    assert_eq!(token.id(), revoked.id());
    assert!(validation_log.has_status(validation_codes::CERTIFICATE_REVOKED));

    // A good status is logged as a success and never as an error.
    let good = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    );

    let mut validation_log = StatusTracker::default();
    OcspToken::from_der_checked(good.der(), &leaf.cert, &root.cert, &mut validation_log).unwrap();

    assert!(validation_log.has_status(validation_codes::CERTIFICATE_NOT_REVOKED));
    assert!(!validation_log.has_any_error());
}

#[test]
fn responder_identification_and_signature() {
    let root = make_root("OCSP Root 5");
    let leaf = issue(&root, "OCSP Leaf 5", 31, false);
    let responder = issue_ocsp_responder(&root, "OCSP Responder 5", 32);

    let produced_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

    let ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        produced_at,
        None,
        false,
    );

    assert!(ocsp.responder_matches(&responder.cert));
    assert!(!ocsp.responder_matches(&root.cert));

    assert!(ocsp.is_signed_by(&responder.cert));
    assert!(!ocsp.is_signed_by(&root.cert));

    // The responder certificate travels with the response.
    assert_eq!(ocsp.certificates().len(), 1);
    assert_eq!(ocsp.certificates()[0], responder.cert.der());
}
