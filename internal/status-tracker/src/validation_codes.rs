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

//! Status codes attached to validation log items.
//!
//! The codes follow the `subject.condition` convention so that reports can be
//! filtered by subject without parsing the description text.

use crate::LogKind;

// -- success codes --

/// The signature value verified against the signing certificate.
pub const SIGNATURE_INTACT: &str = "signature.intact";

/// The signing certificate chains up to a configured trust anchor.
pub const CERTIFICATE_TRUSTED: &str = "certificate.trusted";

/// Revocation data was found and reports the certificate as not revoked.
pub const CERTIFICATE_NOT_REVOKED: &str = "certificate.notRevoked";

/// The time-stamp token is well-formed, its message imprint matches and its
/// signature verified.
pub const TIMESTAMP_VALIDATED: &str = "timeStamp.validated";

/// The revocation token was accepted as usable evidence.
pub const REVOCATION_ACCEPTED: &str = "revocation.accepted";

// -- informational codes --

/// An online revocation check was skipped (no source configured).
pub const REVOCATION_CHECK_SKIPPED: &str = "revocation.check.skipped";

/// An online revocation source was configured but did not answer.
pub const REVOCATION_SOURCE_INACCESSIBLE: &str = "revocation.source.inaccessible";

/// The certificate carries the id-pkix-ocsp-nocheck extension and is exempt
/// from revocation checks.
pub const CERTIFICATE_OCSP_NO_CHECK: &str = "certificate.ocspNoCheck";

// -- failure codes --

/// The signature value did not verify against the signing certificate.
pub const SIGNATURE_MISMATCH: &str = "signature.mismatch";

/// No candidate signing certificate could be identified.
pub const SIGNING_CERTIFICATE_NOT_FOUND: &str = "signingCertificate.notFound";

/// The certificate could not be chained to a trust anchor.
pub const CERTIFICATE_CHAIN_INCOMPLETE: &str = "certificate.chain.incomplete";

/// Revocation data reports the certificate as revoked.
pub const CERTIFICATE_REVOKED: &str = "certificate.revoked";

/// No usable revocation data was found for a certificate.
pub const REVOCATION_MISSING: &str = "revocation.missing";

/// The revocation token's own signature did not verify.
pub const REVOCATION_NOT_INTACT: &str = "revocation.notIntact";

/// The revocation token is not consistent with the certificate it covers.
pub const REVOCATION_INCONSISTENT: &str = "revocation.inconsistent";

/// The OCSP certHash extension did not match the covered certificate.
pub const REVOCATION_CERT_HASH_MISMATCH: &str = "revocation.certHash.mismatch";

/// The time-stamp message imprint does not match the timestamped data.
pub const TIMESTAMP_MISMATCH: &str = "timeStamp.mismatch";

/// The time-stamp signing certificate was expired or not yet valid at the
/// time of stamping.
pub const TIMESTAMP_OUTSIDE_VALIDITY: &str = "timeStamp.outsideValidity";

/// A cryptographic algorithm used by the token is not acceptable or has
/// expired at the control time.
pub const ALGORITHM_UNACCEPTABLE: &str = "algorithm.unacceptable";

/// The document or signature encoding could not be parsed.
pub const SIGNATURE_MALFORMED: &str = "signature.malformed";

/// A referenced token could not be resolved to a known object.
pub const TOKEN_ORPHANED: &str = "token.orphaned";

/// Returns the [`LogKind`] conventionally associated with a status code.
pub fn log_kind(status_code: &str) -> LogKind {
    match status_code {
        SIGNATURE_INTACT | CERTIFICATE_TRUSTED | CERTIFICATE_NOT_REVOKED | TIMESTAMP_VALIDATED
        | REVOCATION_ACCEPTED => LogKind::Success,

        REVOCATION_CHECK_SKIPPED | REVOCATION_SOURCE_INACCESSIBLE | CERTIFICATE_OCSP_NO_CHECK => {
            LogKind::Informational
        }

        _ => LogKind::Failure,
    }
}

/// Returns `true` if the status code names a success condition.
pub fn is_success(status_code: &str) -> bool {
    matches!(log_kind(status_code), LogKind::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(log_kind(SIGNATURE_INTACT), LogKind::Success);
        assert_eq!(log_kind(REVOCATION_CHECK_SKIPPED), LogKind::Informational);
        assert_eq!(log_kind(CERTIFICATE_REVOKED), LogKind::Failure);
        assert_eq!(log_kind("some.unknown.code"), LogKind::Failure);
    }

    #[test]
    fn success_helper() {
        assert!(is_success(CERTIFICATE_TRUSTED));
        assert!(!is_success(REVOCATION_MISSING));
    }
}
