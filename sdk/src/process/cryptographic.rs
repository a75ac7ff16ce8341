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

//! Cryptographic constraint checks.
//!
//! A failed cryptographic check always concludes with
//! `INDETERMINATE / CRYPTO_CONSTRAINTS_FAILURE_NO_POE` — the mapping is a
//! design contract, not configurable.

use ades_crypto::{hash::DigestAlgorithm, raw_signature::EncryptionAlgorithm};
use chrono::{DateTime, Utc};

use crate::process::{Chain, CryptographicConstraint, Indication, SubIndication};

/// The cryptographic material of one token, as found in the diagnostic
/// data.
#[derive(Clone, Copy, Debug)]
pub struct CryptographicInput {
    /// Digest algorithm used by the token's signature.
    pub digest_algorithm: Option<DigestAlgorithm>,

    /// Encryption algorithm family used by the token's signature.
    pub encryption_algorithm: Option<EncryptionAlgorithm>,

    /// Public key length, in bits; 0 when unknown.
    pub key_length_bits: usize,
}

/// Run the cryptographic checks for one token against `constraint`,
/// appending to `chain`.
///
/// Expiration is evaluated against `control_time`: an algorithm valid at
/// signing time may be expired for extension or archival purposes.
pub fn check_cryptographic_constraints(
    chain: &mut Chain,
    input: &CryptographicInput,
    constraint: &CryptographicConstraint,
    control_time: DateTime<Utc>,
) {
    let failed = (Indication::Indeterminate, Some(SubIndication::CryptoConstraintsFailureNoPoe));

    match input.digest_algorithm {
        Some(alg) => {
            chain.check(
                "digest algorithm acceptable",
                constraint.is_digest_algorithm_acceptable(alg),
                constraint.level,
                failed.0,
                failed.1,
                &format!("the digest algorithm {alg} is not acceptable"),
            );

            chain.check(
                "digest algorithm not expired at control time",
                constraint.is_digest_algorithm_reliable_at(alg, control_time),
                constraint.level,
                failed.0,
                failed.1,
                &format!("the digest algorithm {alg} is expired at the control time"),
            );
        }
        None => {
            chain.check(
                "digest algorithm acceptable",
                false,
                constraint.level,
                failed.0,
                failed.1,
                "the digest algorithm is unknown",
            );
        }
    }

    match input.encryption_algorithm {
        Some(alg) => {
            chain.check(
                "encryption algorithm acceptable",
                constraint.is_encryption_algorithm_acceptable(alg),
                constraint.level,
                failed.0,
                failed.1,
                &format!("the encryption algorithm {alg} is not acceptable"),
            );

            if input.key_length_bits > 0 {
                chain.check(
                    "key size acceptable",
                    input.key_length_bits >= constraint.minimum_key_size_for(alg),
                    constraint.level,
                    failed.0,
                    failed.1,
                    &format!(
                        "the key size {} is below the minimum for {alg}",
                        input.key_length_bits
                    ),
                );
            }
        }
        None => {
            chain.check(
                "encryption algorithm acceptable",
                false,
                constraint.level,
                failed.0,
                failed.1,
                "the encryption algorithm is unknown",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;

    use super::*;
    use crate::process::Indication;

    fn sha256_rsa_input() -> CryptographicInput {
        CryptographicInput {
            digest_algorithm: Some(DigestAlgorithm::Sha256),
            encryption_algorithm: Some(EncryptionAlgorithm::Rsa),
            key_length_bits: 2048,
        }
    }

    #[test]
    fn acceptable_suite_passes() {
        let mut chain = Chain::new("SAV");
        let control_time = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        check_cryptographic_constraints(
            &mut chain,
            &sha256_rsa_input(),
            &CryptographicConstraint::default(),
            control_time,
        );

        assert!(chain.conclude().is_passed());
    }

    #[test]
    fn expired_digest_fails_with_fixed_mapping() {
        let mut chain = Chain::new("SAV");
        let control_time = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let input = CryptographicInput {
            digest_algorithm: Some(DigestAlgorithm::Sha1),
            ..sha256_rsa_input()
        };

        check_cryptographic_constraints(
            &mut chain,
            &input,
            &CryptographicConstraint::default(),
            control_time,
        );

        let result = chain.conclude();
        assert_eq!(result.conclusion.indication, Indication::Indeterminate);
        assert_eq!(
            result.conclusion.sub_indication,
            Some(SubIndication::CryptoConstraintsFailureNoPoe)
        );
    }

    #[test]
    fn expired_digest_passes_before_expiration() {
        let mut chain = Chain::new("SAV");
        let control_time = Utc.with_ymd_and_hms(2008, 1, 1, 0, 0, 0).unwrap();

        let input = CryptographicInput {
            digest_algorithm: Some(DigestAlgorithm::Sha1),
            ..sha256_rsa_input()
        };

        check_cryptographic_constraints(
            &mut chain,
            &input,
            &CryptographicConstraint::default(),
            control_time,
        );

        assert!(chain.conclude().is_passed());
    }

    #[test]
    fn small_key_fails() {
        let mut chain = Chain::new("SAV");
        let control_time = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let input = CryptographicInput {
            key_length_bits: 1024,
            ..sha256_rsa_input()
        };

        check_cryptographic_constraints(
            &mut chain,
            &input,
            &CryptographicConstraint::default(),
            control_time,
        );

        let result = chain.conclude();
        assert_eq!(result.conclusion.indication, Indication::Indeterminate);
    }
}
