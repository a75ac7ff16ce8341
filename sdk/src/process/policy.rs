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

//! The externally supplied constraint tree driving the policy engine.

use std::collections::HashMap;

use ades_crypto::{hash::DigestAlgorithm, raw_signature::EncryptionAlgorithm};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How a failed check affects the surrounding chain.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    /// Stop the chain and conclude with the check's indication.
    Fail,

    /// Record a warning and continue.
    Warn,

    /// Record an informational note and continue.
    Inform,

    /// Record the check as ignored without evaluating its outcome.
    Ignore,
}

/// The token context a constraint applies to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Context {
    /// A document signature.
    Signature,

    /// A counter-signature.
    CounterSignature,

    /// A time-stamp token.
    Timestamp,

    /// A revocation token.
    Revocation,

    /// A certificate.
    Certificate,
}

/// Position of a certificate within a chain.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SubContext {
    /// The signing certificate itself.
    SigningCert,

    /// A CA certificate of the chain.
    CaCertificate,
}

/// Cryptographic suite acceptability.
///
/// An algorithm may carry an expiration date: it is then acceptable for
/// control times strictly before that date and unacceptable from the date
/// on. Comparison is always against the relevant control time, never the
/// wall clock.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CryptographicConstraint {
    /// Chain behavior when one of the cryptographic checks fails.
    pub level: Level,

    /// Digest algorithms acceptable at all.
    pub acceptable_digest_algorithms: Vec<DigestAlgorithm>,

    /// Encryption algorithm families acceptable at all.
    pub acceptable_encryption_algorithms: Vec<EncryptionAlgorithm>,

    /// Minimum public key size, in bits, per encryption algorithm family.
    pub minimum_key_sizes: HashMap<EncryptionAlgorithm, usize>,

    /// Expiration date per digest algorithm.
    pub algorithm_expiration_dates: HashMap<DigestAlgorithm, DateTime<Utc>>,
}

impl Default for CryptographicConstraint {
    fn default() -> Self {
        let mut minimum_key_sizes = HashMap::new();
        minimum_key_sizes.insert(EncryptionAlgorithm::Rsa, 1900);
        minimum_key_sizes.insert(EncryptionAlgorithm::Ecdsa, 256);
        minimum_key_sizes.insert(EncryptionAlgorithm::Ed25519, 256);

        let mut algorithm_expiration_dates = HashMap::new();
        // SHA-1 expired for signing purposes long ago.
        algorithm_expiration_dates.insert(
            DigestAlgorithm::Sha1,
            Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        );

        CryptographicConstraint {
            level: Level::Fail,
            acceptable_digest_algorithms: vec![
                DigestAlgorithm::Sha1,
                DigestAlgorithm::Sha256,
                DigestAlgorithm::Sha384,
                DigestAlgorithm::Sha512,
            ],
            acceptable_encryption_algorithms: vec![
                EncryptionAlgorithm::Rsa,
                EncryptionAlgorithm::Ecdsa,
                EncryptionAlgorithm::Ed25519,
            ],
            minimum_key_sizes,
            algorithm_expiration_dates,
        }
    }
}

impl CryptographicConstraint {
    /// Return `true` if the digest algorithm is listed as acceptable.
    pub fn is_digest_algorithm_acceptable(&self, alg: DigestAlgorithm) -> bool {
        self.acceptable_digest_algorithms.contains(&alg)
    }

    /// Return `true` if the encryption algorithm family is listed as
    /// acceptable.
    pub fn is_encryption_algorithm_acceptable(&self, alg: EncryptionAlgorithm) -> bool {
        self.acceptable_encryption_algorithms.contains(&alg)
    }

    /// The minimum key size for the given family, or 0 when unconstrained.
    pub fn minimum_key_size_for(&self, alg: EncryptionAlgorithm) -> usize {
        self.minimum_key_sizes.get(&alg).copied().unwrap_or(0)
    }

    /// Return `true` if the digest algorithm is still usable at
    /// `control_time`.
    ///
    /// An algorithm listed with expiration date D is accepted for control
    /// times strictly before D and rejected from D on.
    pub fn is_digest_algorithm_reliable_at(
        &self,
        alg: DigestAlgorithm,
        control_time: DateTime<Utc>,
    ) -> bool {
        match self.algorithm_expiration_dates.get(&alg) {
            Some(expiration) => control_time < *expiration,
            None => true,
        }
    }
}

/// The constraint tree applied by the validation process.
///
/// Read-only during a validation run. The default mirrors the stock ETSI
/// validation policy: structural and cryptographic checks fail hard,
/// advisory checks warn, freshness checking is off.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ValidationPolicy {
    /// Cryptographic suite acceptability.
    pub cryptographic: CryptographicConstraint,

    /// A signing certificate must be identified.
    pub signing_certificate_recognition: Level,

    /// The signature value must verify.
    pub signature_intact: Level,

    /// The message imprint of a timestamp must match.
    pub message_imprint_intact: Level,

    /// A prospective chain to a trust anchor must exist.
    pub prospective_certificate_chain: Level,

    /// Certificates must be inside their validity range at control time.
    pub certificate_validity_range: Level,

    /// Revocation data must be available for non-exempt certificates.
    pub revocation_data_available: Level,

    /// Behavior when the latest revocation is older than the freshness
    /// window.
    pub revocation_freshness: Level,

    /// The freshness window in seconds (measured back from the control
    /// time).
    pub revocation_freshness_seconds: i64,

    /// The revocation status must be determined (not unknown).
    pub unknown_status: Level,

    /// An OCSP response should carry the certHash extension.
    pub ocsp_cert_hash_present: Level,

    /// A present certHash extension must match the covered certificate.
    pub ocsp_cert_hash_match: Level,

    /// An OCSP response must not be signed with the certificate it covers.
    pub self_issued_ocsp: Level,

    /// Revocation data must be consistent with the covered certificate.
    pub revocation_consistent: Level,

    /// The certificate must not be revoked.
    pub certificate_not_revoked: Level,

    /// Content timestamps must not postdate signature timestamps.
    pub timestamp_coherence: Level,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        ValidationPolicy {
            cryptographic: CryptographicConstraint::default(),
            signing_certificate_recognition: Level::Fail,
            signature_intact: Level::Fail,
            message_imprint_intact: Level::Fail,
            prospective_certificate_chain: Level::Fail,
            certificate_validity_range: Level::Fail,
            revocation_data_available: Level::Fail,
            revocation_freshness: Level::Ignore,
            revocation_freshness_seconds: 0,
            unknown_status: Level::Fail,
            ocsp_cert_hash_present: Level::Inform,
            ocsp_cert_hash_match: Level::Fail,
            self_issued_ocsp: Level::Warn,
            revocation_consistent: Level::Fail,
            certificate_not_revoked: Level::Fail,
            timestamp_coherence: Level::Warn,
        }
    }
}

impl ValidationPolicy {
    /// Load a policy from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Render the policy as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The signature-intact constraint for a token context.
    ///
    /// One level applies across contexts in the default policy; the
    /// context parameter keeps the lookup surface stable for callers.
    pub fn signature_intact_constraint(&self, _context: Context) -> Level {
        self.signature_intact
    }

    /// The prospective-chain constraint for a token context.
    pub fn prospective_certificate_chain_constraint(&self, _context: Context) -> Level {
        self.prospective_certificate_chain
    }

    /// The revocation-data-available constraint for a chain position.
    pub fn revocation_data_available_constraint(
        &self,
        _context: Context,
        _sub_context: SubContext,
    ) -> Level {
        self.revocation_data_available
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn digest_expiration_is_against_control_time() {
        let constraint = CryptographicConstraint::default();

        let before = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let exactly = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();

        assert!(constraint.is_digest_algorithm_reliable_at(DigestAlgorithm::Sha1, before));
        assert!(!constraint.is_digest_algorithm_reliable_at(DigestAlgorithm::Sha1, after));
        assert!(!constraint.is_digest_algorithm_reliable_at(DigestAlgorithm::Sha1, exactly));

        // No expiration configured for SHA-256.
        assert!(constraint.is_digest_algorithm_reliable_at(DigestAlgorithm::Sha256, after));
    }

    #[test]
    fn policy_round_trips_through_json() {
        let policy = ValidationPolicy::default();
        let json = policy.to_json().unwrap();
        let restored = ValidationPolicy::from_json(&json).unwrap();

        assert_eq!(restored.signature_intact, Level::Fail);
        assert_eq!(restored.revocation_freshness, Level::Ignore);
    }
}
