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

use chrono::TimeZone;

use crate::{
    certificate::CertificateToken,
    testing::{issue, issue_ocsp_responder, issue_tsa, make_root},
};

#[test]
fn malformed_der_rejected() {
    assert!(CertificateToken::from_der(b"not a certificate").is_err());
}

#[test]
fn root_attributes() {
    let root = make_root("Test Root CA");

    assert_eq!(root.cert.subject(), "CN=Test Root CA");
    assert_eq!(root.cert.issuer(), "CN=Test Root CA");
    assert!(root.cert.is_self_signed());
    assert!(root.cert.is_ca());
    assert!(!root.cert.id().is_empty());
}

#[test]
fn id_is_stable() {
    let root = make_root("Stable Root");
    let again = CertificateToken::from_der(root.cert.der()).unwrap();

    assert_eq!(root.cert.id(), again.id());
    assert_eq!(root.cert, again);
}

#[test]
fn chain_linkage() {
    let root = make_root("Linkage Root");
    let leaf = issue(&root, "Linkage Leaf", 7, false);

    assert!(leaf.cert.is_issued_by(&root.cert));
    assert!(leaf.cert.is_signed_by(&root.cert));
    assert!(!leaf.cert.is_self_signed());

    // The leaf cannot have issued the root.
    assert!(!root.cert.is_issued_by(&leaf.cert));
    assert!(!root.cert.is_signed_by(&leaf.cert));
}

#[test]
fn wrong_issuer_rejected() {
    let root_a = make_root("Root A");
    let root_b = make_root("Root B");
    let leaf = issue(&root_a, "Leaf Under A", 8, false);

    assert!(!leaf.cert.is_issued_by(&root_b.cert));
    assert!(!leaf.cert.is_signed_by(&root_b.cert));
}

#[test]
fn extended_key_usages() {
    let root = make_root("EKU Root");

    let responder = issue_ocsp_responder(&root, "EKU Responder", 9);
    assert!(responder.cert.is_ocsp_signing());
    assert!(!responder.cert.is_time_stamping());

    let tsa = issue_tsa(&root, "EKU TSA", 10);
    assert!(tsa.cert.is_time_stamping());
    assert!(!tsa.cert.is_ocsp_signing());
}

#[test]
fn validity_window() {
    let root = make_root("Validity Root");

    let inside = chrono::Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let before = chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let after = chrono::Utc.with_ymd_and_hms(2040, 1, 1, 0, 0, 0).unwrap();

    assert!(root.cert.is_valid_at(inside));
    assert!(!root.cert.is_valid_at(before));
    assert!(!root.cert.is_valid_at(after));
}

#[test]
fn serial_is_normalized() {
    let root = make_root("Serial Root");
    let leaf = issue(&root, "Serial Leaf", 42, false);

    assert_eq!(leaf.cert.serial(), &[42u8]);
}
