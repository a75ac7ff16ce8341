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

//! OCSP response tokens.

use std::{fmt, hash::Hash, str::FromStr};

use ades_status_tracker::{log_item, validation_codes, StatusTracker};
use chrono::{DateTime, Utc};
use rasn_ocsp::{BasicOcspResponse, CertStatus, OcspResponseStatus};
use x509_parser::der_parser::{der::parse_der, Oid};

use crate::{
    certificate::{strip_leading_zeroes, CertificateToken},
    hash::{sha256, DigestAlgorithm},
    revocation::{RevocationError, RevocationStatus, RevocationType},
};

mod fetch;
pub use fetch::fetch_ocsp_response;

/// An immutable, content-addressed OCSP response.
///
/// The token id is the lowercase hex SHA-256 hash of the DER encoding of the
/// complete `OCSPResponse` structure.
#[derive(Clone)]
pub struct OcspToken {
    der: Vec<u8>,
    id: String,

    produced_at: DateTime<Utc>,

    responder_name_raw: Option<Vec<u8>>,
    responder_key_hash: Option<Vec<u8>>,

    certs: Vec<Vec<u8>>,

    singles: Vec<SingleResponseInfo>,

    sig_alg_oid: String,
    tbs: Vec<u8>,
    signature_value: Vec<u8>,
}

/// Extracted view of one `SingleResponse` inside an OCSP response.
#[derive(Clone, Debug)]
struct SingleResponseInfo {
    hash_alg_oid: String,
    issuer_name_hash: Vec<u8>,
    issuer_key_hash: Vec<u8>,
    serial: Vec<u8>,

    status: RevocationStatus,
    this_update: DateTime<Utc>,
    next_update: Option<DateTime<Utc>>,

    cert_hash: Option<CertHash>,
}

/// The ETSI `certHash` single-response extension (id-isismtt-at-certHash).
///
/// If present, a digest match indicates the OCSP responder knows the
/// certificate as we have it, and so also its revocation state.
#[derive(Clone, Debug)]
struct CertHash {
    digest_alg_oid: String,
    digest: Vec<u8>,
}

/// Result of matching an OCSP response against a certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OcspCertStatus {
    /// The status the response reports for the certificate.
    pub status: RevocationStatus,

    /// thisUpdate of the matching single response.
    pub this_update: DateTime<Utc>,

    /// nextUpdate of the matching single response, if stated.
    pub next_update: Option<DateTime<Utc>>,
}

impl OcspToken {
    /// Build an OCSP token from the DER encoding of an `OCSPResponse`.
    pub fn from_der(der: &[u8]) -> Result<Self, RevocationError> {
        let ocsp_response = rasn::der::decode::<rasn_ocsp::OcspResponse>(der)
            .map_err(|e| RevocationError::DecodeError(e.to_string()))?;

        if ocsp_response.status != OcspResponseStatus::Successful {
            return Err(RevocationError::UnsuccessfulOcspResponse);
        }

        let Some(response_bytes) = ocsp_response.bytes else {
            return Err(RevocationError::DecodeError(
                "missing response bytes".to_string(),
            ));
        };

        let basic_response = rasn::der::decode::<BasicOcspResponse>(&response_bytes.response)
            .map_err(|e| RevocationError::DecodeError(e.to_string()))?;

        let response_data = &basic_response.tbs_response_data;

        let tbs = rasn::der::encode(response_data)
            .map_err(|e| RevocationError::DecodeError(e.to_string()))?;

        let (responder_name_raw, responder_key_hash) = match &response_data.responder_id {
            rasn_ocsp::ResponderId::ByName(name) => (
                Some(
                    rasn::der::encode(name)
                        .map_err(|e| RevocationError::DecodeError(e.to_string()))?,
                ),
                None,
            ),
            rasn_ocsp::ResponderId::ByKey(key_hash) => (None, Some(key_hash.to_vec())),
        };

        let mut certs = vec![];
        if let Some(ocsp_certs) = &basic_response.certs {
            for ocsp_cert in ocsp_certs {
                let cert_der = rasn::der::encode(ocsp_cert)
                    .map_err(|e| RevocationError::DecodeError(e.to_string()))?;
                certs.push(cert_der);
            }
        }

        let mut singles = vec![];
        for single in &response_data.responses {
            let serial_der = rasn::der::encode(&single.cert_id.serial_number)
                .map_err(|e| RevocationError::DecodeError(e.to_string()))?;

            let status = match &single.cert_status {
                CertStatus::Good => RevocationStatus::Good,
                CertStatus::Revoked(revoked_info) => RevocationStatus::Revoked {
                    time: revoked_info.revocation_time.with_timezone(&Utc),
                    reason: revoked_info.revocation_reason.map(|r| format!("{r:?}")),
                },
                CertStatus::Unknown(_) => RevocationStatus::Unknown,
            };

            let mut cert_hash = None;
            if let Some(extensions) = &single.single_extensions {
                for ext in extensions.iter() {
                    if ext.extn_id.to_string() == CERT_HASH_OID {
                        cert_hash = parse_cert_hash(&ext.extn_value);
                    }
                }
            }

            singles.push(SingleResponseInfo {
                hash_alg_oid: single.cert_id.hash_algorithm.algorithm.to_string(),
                issuer_name_hash: single.cert_id.issuer_name_hash.to_vec(),
                issuer_key_hash: single.cert_id.issuer_key_hash.to_vec(),
                serial: der_integer_bytes(&serial_der)?,
                status,
                this_update: single.this_update.with_timezone(&Utc),
                next_update: single.next_update.as_ref().map(|nu| nu.with_timezone(&Utc)),
                cert_hash,
            });
        }

        Ok(OcspToken {
            id: hex::encode(sha256(der)),
            produced_at: response_data.produced_at.with_timezone(&Utc),
            responder_name_raw,
            responder_key_hash,
            certs,
            singles,
            sig_alg_oid: basic_response.signature_algorithm.algorithm.to_string(),
            tbs,
            signature_value: basic_response.signature.as_raw_slice().to_vec(),
            der: der.to_vec(),
        })
    }

    /// Build an OCSP token and record what it reports about `cert` in the
    /// validation log.
    ///
    /// A revoked or undetermined status is logged but never fails the
    /// parse; the policy engine judges sufficiency later.
    pub fn from_der_checked(
        der: &[u8],
        cert: &CertificateToken,
        issuer: &CertificateToken,
        validation_log: &mut StatusTracker,
    ) -> Result<Self, RevocationError> {
        let token = Self::from_der(der)?;

        match token.status_for(cert, issuer) {
            Some(single) if single.status.is_revoked() => {
                log_item!(
                    token.id().to_string(),
                    "certificate revoked",
                    "from_der_checked"
                )
                .validation_status(validation_codes::CERTIFICATE_REVOKED)
                .failure_no_throw(validation_log, RevocationError::InternalError(
                    "certificate revoked".to_string(),
                ));
            }
            Some(single) if single.status.is_good() => {
                log_item!(
                    token.id().to_string(),
                    "certificate not revoked",
                    "from_der_checked"
                )
                .validation_status(validation_codes::CERTIFICATE_NOT_REVOKED)
                .success(validation_log);
            }
            _ => {
                log_item!(
                    token.id().to_string(),
                    "response does not determine the certificate status",
                    "from_der_checked"
                )
                .informational(validation_log);
            }
        }

        Ok(token)
    }

    /// The unique id of this token (hex SHA-256 of the DER encoding).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The DER encoding of this response.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The revocation mechanism represented by this token.
    pub fn revocation_type(&self) -> RevocationType {
        RevocationType::Ocsp
    }

    /// The production time of this token (producedAt).
    pub fn production_time(&self) -> DateTime<Utc> {
        self.produced_at
    }

    /// Certificates embedded in the response, in DER format.
    ///
    /// One of these is normally the responder certificate.
    pub fn certificates(&self) -> &[Vec<u8>] {
        &self.certs
    }

    /// Return `true` if any single response carries the ETSI certHash
    /// extension.
    pub fn is_cert_hash_extension_present(&self) -> bool {
        self.singles.iter().any(|s| s.cert_hash.is_some())
    }

    /// Return `true` if a certHash extension is present for the single
    /// response covering `cert` and its digest matches the certificate.
    pub fn is_cert_hash_match(&self, cert: &CertificateToken) -> bool {
        let Some(single) = self.find_single(cert) else {
            return false;
        };

        let Some(cert_hash) = &single.cert_hash else {
            return false;
        };

        let Some(alg) = DigestAlgorithm::from_oid_str(&cert_hash.digest_alg_oid) else {
            return false;
        };

        cert.digest(alg) == cert_hash.digest
    }

    /// Return `true` if the responder id designates `candidate` (by subject
    /// name or by key hash).
    pub fn responder_matches(&self, candidate: &CertificateToken) -> bool {
        if let Some(name) = &self.responder_name_raw {
            return name == candidate.subject_raw();
        }

        if let Some(key_hash) = &self.responder_key_hash {
            return *key_hash == crate::hash::sha1(candidate.public_key_bits());
        }

        false
    }

    /// Return the status this response reports for `cert`, or `None` when no
    /// single response matches the certificate.
    ///
    /// Matching reconstructs the CertId hashes from the certificate and its
    /// issuer under the digest algorithm the responder used.
    pub fn status_for(
        &self,
        cert: &CertificateToken,
        issuer: &CertificateToken,
    ) -> Option<OcspCertStatus> {
        let single = self.find_single_with_issuer(cert, Some(issuer))?;

        Some(OcspCertStatus {
            status: single.status.clone(),
            this_update: single.this_update,
            next_update: single.next_update,
        })
    }

    // Find a single response by serial and issuer name hash only. Used for
    // certHash evaluation where the issuer key is not required.
    fn find_single(&self, cert: &CertificateToken) -> Option<&SingleResponseInfo> {
        self.find_single_with_issuer(cert, None)
    }

    fn find_single_with_issuer(
        &self,
        cert: &CertificateToken,
        issuer: Option<&CertificateToken>,
    ) -> Option<&SingleResponseInfo> {
        self.singles.iter().find(|single| {
            let Some(alg) = DigestAlgorithm::from_oid_str(&single.hash_alg_oid) else {
                return false;
            };

            if single.serial != cert.serial() {
                return false;
            }

            if single.issuer_name_hash != alg.digest(cert.issuer_raw()) {
                return false;
            }

            match issuer {
                Some(issuer) => single.issuer_key_hash == alg.digest(issuer.public_key_bits()),
                None => true,
            }
        })
    }

    /// Verify the response signature against the public key of `signer`.
    pub fn is_signed_by(&self, signer: &CertificateToken) -> bool {
        let Ok(sig_alg) = Oid::from_str(&self.sig_alg_oid) else {
            return false;
        };

        let Some(validator) = crate::raw_signature::validator_for_cert_sig_alg(&sig_alg) else {
            return false;
        };

        validator
            .validate(&self.signature_value, &self.tbs, signer.public_key_der())
            .is_ok()
    }
}

impl fmt::Debug for OcspToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcspToken")
            .field("id", &self.id)
            .field("produced_at", &self.produced_at)
            .field("singles", &self.singles.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for OcspToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OcspToken {}

impl Hash for OcspToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Dotted form of id-isismtt-at-certHash.
const CERT_HASH_OID: &str = "1.3.36.8.3.13";

// CertHash ::= SEQUENCE { hashAlgorithm AlgorithmIdentifier,
//                         certificateHash OCTET STRING }
fn parse_cert_hash(value: &[u8]) -> Option<CertHash> {
    let (_rem, obj) = parse_der(value).ok()?;
    let seq = obj.as_sequence().ok()?;

    let alg_seq = seq.first()?.as_sequence().ok()?;
    let alg_oid = alg_seq.first()?.as_oid().ok()?;

    let digest = seq.get(1)?.as_slice().ok()?;

    Some(CertHash {
        digest_alg_oid: alg_oid.to_id_string(),
        digest: digest.to_vec(),
    })
}

// Return the unsigned big-endian magnitude of a standalone DER INTEGER.
fn der_integer_bytes(der: &[u8]) -> Result<Vec<u8>, RevocationError> {
    let (_rem, obj) = x509_parser::der_parser::der::parse_der_integer(der)
        .map_err(|e| RevocationError::DecodeError(e.to_string()))?;

    let slice = obj
        .as_slice()
        .map_err(|e| RevocationError::DecodeError(e.to_string()))?;

    Ok(strip_leading_zeroes(slice).to_vec())
}
