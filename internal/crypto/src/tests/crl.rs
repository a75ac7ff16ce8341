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
    crl::CrlToken,
    revocation::{RevocationStatus, RevocationType},
    testing::{build_crl, issue, make_root},
};

#[test]
fn malformed_der_rejected() {
    assert!(CrlToken::from_der(b"not a crl").is_err());
}

#[test]
fn reports_good_and_revoked() {
    let root = make_root("CRL Root");
    let good = issue(&root, "Good Leaf", 11, false);
    let bad = issue(&root, "Bad Leaf", 12, false);

    let this_update = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let next_update = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

    let crl = build_crl(&root, &[12], this_update, Some(next_update));

    assert_eq!(crl.revocation_type(), RevocationType::Crl);
    assert_eq!(crl.production_time(), this_update);
    assert_eq!(crl.next_update(), Some(next_update));

    assert_eq!(crl.status_for(&good.cert), RevocationStatus::Good);
    assert!(crl.status_for(&bad.cert).is_revoked());
}

#[test]
fn foreign_issuer_is_unknown() {
    let root = make_root("CRL Root 2");
    let other_root = make_root("Unrelated Root");
    let leaf = issue(&other_root, "Foreign Leaf", 13, false);

    let this_update = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let crl = build_crl(&root, &[], this_update, None);

    assert_eq!(crl.status_for(&leaf.cert), RevocationStatus::Unknown);
}

#[test]
fn signature_binds_to_issuer() {
    let root = make_root("CRL Root 3");
    let other_root = make_root("CRL Root 4");

    let this_update = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let crl = build_crl(&root, &[], this_update, None);

    assert!(crl.is_signed_by(&root.cert));
    assert!(!crl.is_signed_by(&other_root.cert));
    assert!(crl.is_issued_by_subject_of(&root.cert));
}
