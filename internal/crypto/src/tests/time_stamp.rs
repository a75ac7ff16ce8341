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
    revocation::RevocationStatus,
    testing::{build_crl, build_ocsp, build_timestamp, issue, issue_ocsp_responder, issue_tsa, make_root},
    time_stamp::{TimestampToken, TimestampType},
};

#[test]
fn malformed_der_rejected() {
    assert!(
        TimestampToken::from_der(b"not a time stamp", TimestampType::SignatureTimestamp).is_err()
    );
}

#[test]
fn parses_and_identifies_signer() {
    let root = make_root("TSA Root");
    let tsa = issue_tsa(&root, "TSA Unit", 41);

    let gen_time = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let ts = build_timestamp(
        &tsa,
        b"signature value bytes",
        gen_time,
        TimestampType::SignatureTimestamp,
        &[],
        &[],
    );

    assert_eq!(ts.gen_time(), gen_time);
    assert_eq!(ts.timestamp_type(), TimestampType::SignatureTimestamp);

    assert!(ts.signer_matches(&tsa.cert));
    assert!(!ts.signer_matches(&root.cert));

    let embedded = ts.signing_certificate().unwrap();
    assert_eq!(embedded.id(), tsa.cert.id());
}

#[test]
fn signature_verification() {
    let root = make_root("TSA Root 2");
    let tsa = issue_tsa(&root, "TSA Unit 2", 42);

    let gen_time = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let ts = build_timestamp(
        &tsa,
        b"data",
        gen_time,
        TimestampType::SignatureTimestamp,
        &[],
        &[],
    );

    assert!(ts.is_signed_by(&tsa.cert));
    assert!(!ts.is_signed_by(&root.cert));
}

#[test]
fn message_imprint_found_and_intact() {
    let root = make_root("TSA Root 3");
    let tsa = issue_tsa(&root, "TSA Unit 3", 43);

    let gen_time = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let mut ts = build_timestamp(
        &tsa,
        b"the timestamped data",
        gen_time,
        TimestampType::ArchiveTimestamp,
        &[],
        &[],
    );

    ts.check_message_imprint(Some(b"the timestamped data"));
    assert!(ts.is_message_imprint_data_found());
    assert!(ts.is_message_imprint_data_intact());
}

#[test]
fn message_imprint_found_but_broken() {
    // An archive timestamp whose covered content has changed must still
    // report the imprint data as found, with intact = false.
    let root = make_root("TSA Root 4");
    let tsa = issue_tsa(&root, "TSA Unit 4", 44);

    let gen_time = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let mut ts = build_timestamp(
        &tsa,
        b"original content",
        gen_time,
        TimestampType::ArchiveTimestamp,
        &[],
        &[],
    );

    ts.check_message_imprint(Some(b"tampered content"));
    assert!(ts.is_message_imprint_data_found());
    assert!(!ts.is_message_imprint_data_intact());
}

#[test]
fn message_imprint_not_found() {
    let root = make_root("TSA Root 5");
    let tsa = issue_tsa(&root, "TSA Unit 5", 45);

    let gen_time = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let mut ts = build_timestamp(
        &tsa,
        b"content",
        gen_time,
        TimestampType::ArchiveTimestamp,
        &[],
        &[],
    );

    ts.check_message_imprint(None);
    assert!(!ts.is_message_imprint_data_found());
    assert!(!ts.is_message_imprint_data_intact());
}

#[test]
fn embedded_validation_data() {
    let root = make_root("TSA Root 6");
    let leaf = issue(&root, "TSA Covered Leaf", 46, false);
    let responder = issue_ocsp_responder(&root, "TSA Responder", 47);
    let tsa = issue_tsa(&root, "TSA Unit 6", 48);

    let this_update = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
    let crl = build_crl(&root, &[], this_update, None);

    let ocsp = build_ocsp(
        &leaf.cert,
        &root.cert,
        &responder,
        RevocationStatus::Good,
        this_update,
        None,
        false,
    );

    let gen_time = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let ts = build_timestamp(
        &tsa,
        b"archived signature",
        gen_time,
        TimestampType::ArchiveTimestamp,
        &[crl.der().to_vec()],
        &[ocsp.der().to_vec()],
    );

    assert_eq!(ts.crls().len(), 1);
    assert_eq!(ts.ocsps().len(), 1);

    // Round trip: the embedded revocation data parses back to equal tokens.
    let crl_again = crate::crl::CrlToken::from_der(&ts.crls()[0]).unwrap();
    assert_eq!(crl_again.id(), crl.id());

    let ocsp_again = crate::ocsp::OcspToken::from_der(&ts.ocsps()[0]).unwrap();
    assert_eq!(ocsp_again.id(), ocsp.id());
}

#[test]
fn timestamp_type_helpers() {
    assert!(TimestampType::ArchiveTimestamp.is_archive());
    assert!(!TimestampType::SignatureTimestamp.is_archive());
    assert!(TimestampType::ValidationDataTimestamp.covers_validation_data());
    assert!(TimestampType::ArchiveTimestamp.covers_validation_data());
    assert!(!TimestampType::ContentTimestamp.covers_validation_data());
}
