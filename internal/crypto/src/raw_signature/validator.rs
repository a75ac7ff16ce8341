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

use std::str::FromStr;

use thiserror::Error;
use x509_parser::der_parser::Oid;

use crate::{
    hash::DigestAlgorithm,
    raw_signature::{oids::*, validators, EncryptionAlgorithm, SigningAlg},
};

/// A `RawSignatureValidator` implementation checks a signature encoded using a
/// specific signature algorithm and a private/public key pair.
///
/// IMPORTANT: This signature is typically embedded in a wrapper provided by
/// another signature mechanism. In the AdES ecosystem, this wrapper is
/// typically CMS or XMLDSig, but `RawSignatureValidator` does not implement
/// either.
pub trait RawSignatureValidator {
    /// Return `Ok(())` if the signature `sig` is valid for the raw content
    /// `data` and the public key `public_key`.
    fn validate(
        &self,
        sig: &[u8],
        data: &[u8],
        public_key: &[u8],
    ) -> Result<(), RawSignatureValidationError>;
}

/// Return a built-in signature validator for the requested signature
/// algorithm.
pub fn validator_for_signing_alg(alg: SigningAlg) -> Option<Box<dyn RawSignatureValidator>> {
    validators::validator_for_signing_alg(alg)
}

/// Return a built-in signature validator for the requested signature
/// algorithm as identified by OID.
///
/// `hash_alg` is consulted when `sig_alg` does not itself determine the
/// digest (i.e. plain RSA or the EC public key OID).
pub fn validator_for_sig_and_hash_algs(
    sig_alg: &Oid<'_>,
    hash_alg: &Oid<'_>,
) -> Option<Box<dyn RawSignatureValidator>> {
    if *sig_alg == RSA_OID {
        if *hash_alg == SHA256_OID {
            return Some(Box::new(validators::RsaLegacyValidator::Rsa256));
        } else if *hash_alg == SHA384_OID {
            return Some(Box::new(validators::RsaLegacyValidator::Rsa384));
        } else if *hash_alg == SHA512_OID {
            return Some(Box::new(validators::RsaLegacyValidator::Rsa512));
        }
    } else if *sig_alg == SHA256_WITH_RSAENCRYPTION_OID {
        return Some(Box::new(validators::RsaLegacyValidator::Rsa256));
    } else if *sig_alg == SHA384_WITH_RSAENCRYPTION_OID {
        return Some(Box::new(validators::RsaLegacyValidator::Rsa384));
    } else if *sig_alg == SHA512_WITH_RSAENCRYPTION_OID {
        return Some(Box::new(validators::RsaLegacyValidator::Rsa512));
    } else if *sig_alg == RSA_PSS_OID {
        if *hash_alg == SHA256_OID {
            return validator_for_signing_alg(SigningAlg::Ps256);
        } else if *hash_alg == SHA384_OID {
            return validator_for_signing_alg(SigningAlg::Ps384);
        } else if *hash_alg == SHA512_OID {
            return validator_for_signing_alg(SigningAlg::Ps512);
        }
    } else if *sig_alg == EC_PUBLICKEY_OID {
        if *hash_alg == SHA256_OID {
            return validator_for_signing_alg(SigningAlg::Es256);
        } else if *hash_alg == SHA384_OID {
            return validator_for_signing_alg(SigningAlg::Es384);
        } else if *hash_alg == SHA512_OID {
            return validator_for_signing_alg(SigningAlg::Es512);
        }
    } else if *sig_alg == ECDSA_WITH_SHA256_OID {
        return validator_for_signing_alg(SigningAlg::Es256);
    } else if *sig_alg == ECDSA_WITH_SHA384_OID {
        return validator_for_signing_alg(SigningAlg::Es384);
    } else if *sig_alg == ECDSA_WITH_SHA512_OID {
        return validator_for_signing_alg(SigningAlg::Es512);
    } else if *sig_alg == ED25519_OID {
        return validator_for_signing_alg(SigningAlg::Ed25519);
    }

    None
}

/// Same as [`validator_for_sig_and_hash_algs`] but accepting dotted-decimal
/// OID strings, as produced by the rasn decoders.
pub fn validator_for_sig_and_hash_oid_strs(
    sig_alg: &str,
    hash_alg: &str,
) -> Option<Box<dyn RawSignatureValidator>> {
    let sig_alg = Oid::from_str(sig_alg).ok()?;
    let hash_alg = Oid::from_str(hash_alg).ok()?;
    validator_for_sig_and_hash_algs(&sig_alg, &hash_alg)
}

/// Identify the encryption algorithm family from a combined signature
/// algorithm OID, as carried in an X.509 `signatureAlgorithm` field.
pub fn encryption_alg_for_cert_sig_alg(sig_alg: &Oid<'_>) -> Option<EncryptionAlgorithm> {
    if *sig_alg == SHA256_WITH_RSAENCRYPTION_OID
        || *sig_alg == SHA384_WITH_RSAENCRYPTION_OID
        || *sig_alg == SHA512_WITH_RSAENCRYPTION_OID
        || *sig_alg == RSA_OID
        || *sig_alg == RSA_PSS_OID
    {
        Some(EncryptionAlgorithm::Rsa)
    } else if *sig_alg == ECDSA_WITH_SHA256_OID
        || *sig_alg == ECDSA_WITH_SHA384_OID
        || *sig_alg == ECDSA_WITH_SHA512_OID
        || *sig_alg == EC_PUBLICKEY_OID
    {
        Some(EncryptionAlgorithm::Ecdsa)
    } else if *sig_alg == ED25519_OID {
        Some(EncryptionAlgorithm::Ed25519)
    } else {
        None
    }
}

/// Identify the digest algorithm implied by a combined signature algorithm
/// OID.
///
/// Plain RSA-PSS is mapped to its SHA-256 instance; signers using other PSS
/// parameter sets are rare enough that the chain check reports them as
/// unsupported.
pub fn digest_for_cert_sig_alg(sig_alg: &Oid<'_>) -> Option<DigestAlgorithm> {
    if *sig_alg == SHA256_WITH_RSAENCRYPTION_OID || *sig_alg == ECDSA_WITH_SHA256_OID {
        Some(DigestAlgorithm::Sha256)
    } else if *sig_alg == SHA384_WITH_RSAENCRYPTION_OID || *sig_alg == ECDSA_WITH_SHA384_OID {
        Some(DigestAlgorithm::Sha384)
    } else if *sig_alg == SHA512_WITH_RSAENCRYPTION_OID
        || *sig_alg == ECDSA_WITH_SHA512_OID
        || *sig_alg == ED25519_OID
    {
        Some(DigestAlgorithm::Sha512)
    } else if *sig_alg == RSA_PSS_OID {
        Some(DigestAlgorithm::Sha256)
    } else {
        None
    }
}

/// Same as [`encryption_alg_for_cert_sig_alg`] but accepting a
/// dotted-decimal OID string.
pub fn encryption_alg_for_sig_oid_str(sig_alg: &str) -> Option<EncryptionAlgorithm> {
    let sig_alg = Oid::from_str(sig_alg).ok()?;
    encryption_alg_for_cert_sig_alg(&sig_alg)
}

/// Same as [`digest_for_cert_sig_alg`] but accepting a dotted-decimal OID
/// string.
pub fn digest_for_sig_oid_str(sig_alg: &str) -> Option<DigestAlgorithm> {
    let sig_alg = Oid::from_str(sig_alg).ok()?;
    digest_for_cert_sig_alg(&sig_alg)
}

/// Return a validator for a combined signature algorithm OID, as carried in
/// an X.509 `signatureAlgorithm` field.
pub fn validator_for_cert_sig_alg(sig_alg: &Oid<'_>) -> Option<Box<dyn RawSignatureValidator>> {
    let digest = digest_for_cert_sig_alg(sig_alg)?;

    let hash_oid = match digest {
        DigestAlgorithm::Sha1 => SHA1_OID,
        DigestAlgorithm::Sha256 => SHA256_OID,
        DigestAlgorithm::Sha384 => SHA384_OID,
        DigestAlgorithm::Sha512 => SHA512_OID,
    };

    validator_for_sig_and_hash_algs(sig_alg, &hash_oid)
}

/// Describes errors that can be identified when validating a raw signature.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum RawSignatureValidationError {
    /// The signature does not match the provided data or public key.
    #[error("the signature does not match the provided data or public key")]
    SignatureMismatch,

    /// An error was reported by the underlying cryptography implementation.
    #[error("an error was reported by the cryptography library: {0}")]
    CryptoLibraryError(String),

    /// An invalid public key was provided.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// An invalid signature value was provided.
    #[error("invalid signature value")]
    InvalidSignature,

    /// The signature uses an unsupported signing or hash algorithm.
    #[error("signature uses an unsupported algorithm")]
    UnsupportedAlgorithm,

    /// An unexpected internal error occured while validating the signature.
    #[error("internal error ({0})")]
    InternalError(String),
}
