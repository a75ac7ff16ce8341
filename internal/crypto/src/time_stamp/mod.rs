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

//! RFC 3161 time-stamp tokens.

use std::{fmt, hash::Hash};

use chrono::{DateTime, Utc};
use rasn::types::{Any, SetOf};
use rasn_cms::pkcs7_compat::SignedData;
use rasn_cms::{Attribute, SignerIdentifier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    certificate::{strip_leading_zeroes, CertificateToken},
    hash::{sha256, DigestAlgorithm},
    raw_signature::validator_for_sig_and_hash_oid_strs,
};

mod tst_info;
pub use tst_info::{Accuracy, MessageImprint, TstInfo};

// Dotted forms of the content types and attributes we care about.
const SIGNED_DATA_OID: &str = "1.2.840.113549.1.7.2";
const TST_INFO_OID: &str = "1.2.840.113549.1.9.16.1.4";
const MESSAGE_DIGEST_OID: &str = "1.2.840.113549.1.9.4";
const RI_OCSP_RESPONSE_OID: &str = "1.3.6.1.5.5.7.16.2";

/// Classification of a time-stamp token by the attribute or structure it was
/// found in.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TimestampType {
    /// A timestamp over the signed content, produced before the signature.
    ContentTimestamp,

    /// A timestamp over the signature value.
    SignatureTimestamp,

    /// A timestamp over collected certificates and revocation data.
    ValidationDataTimestamp,

    /// An archival timestamp over the whole signature structure.
    ArchiveTimestamp,

    /// A standalone timestamp over a detached document (ASiC).
    DetachedTimestamp,
}

impl TimestampType {
    /// Return `true` for archival timestamps.
    pub fn is_archive(&self) -> bool {
        matches!(self, TimestampType::ArchiveTimestamp)
    }

    /// Return `true` when a timestamp of this type covers previously
    /// collected validation data.
    pub fn covers_validation_data(&self) -> bool {
        matches!(
            self,
            TimestampType::ValidationDataTimestamp | TimestampType::ArchiveTimestamp
        )
    }
}

/// The category of an object covered by a time-stamp token.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TimestampedObjectType {
    /// A signature.
    Signature,

    /// A certificate token.
    Certificate,

    /// A revocation token.
    Revocation,

    /// Another time-stamp token.
    Timestamp,

    /// The signed data itself.
    SignedData,
}

/// A reference from a time-stamp token to an object it proves existence for.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimestampedReference {
    /// Id of the covered object.
    pub token_id: String,

    /// Category of the covered object.
    pub category: TimestampedObjectType,
}

/// An RFC 3161 time-stamp token.
///
/// The token id is the lowercase hex SHA-256 hash of the DER encoding. The
/// message-imprint flags are the only mutable state; they record the outcome
/// of [`check_message_imprint`](Self::check_message_imprint) so that "found
/// but broken" is distinguishable from "not found" in the diagnostic data.
#[derive(Clone)]
pub struct TimestampToken {
    der: Vec<u8>,
    id: String,

    timestamp_type: TimestampType,

    gen_time: DateTime<Utc>,
    policy_oid: String,

    message_imprint_alg_oid: String,
    message_imprint_digest: Vec<u8>,

    certs: Vec<Vec<u8>>,
    crls: Vec<Vec<u8>>,
    ocsps: Vec<Vec<u8>>,

    signer_issuer_raw: Option<Vec<u8>>,
    signer_serial: Option<Vec<u8>>,
    signer_ski: Option<Vec<u8>>,

    digest_alg_oid: String,
    sig_alg_oid: String,
    signed_attrs_der: Vec<u8>,
    signature_value: Vec<u8>,

    signed_message_digest: Vec<u8>,
    econtent_digest: Vec<u8>,

    message_imprint_data_found: bool,
    message_imprint_data_intact: bool,

    timestamped_references: Vec<TimestampedReference>,
}

impl TimestampToken {
    /// Build a time-stamp token from the DER encoding of its CMS
    /// `ContentInfo`.
    pub fn from_der(der: &[u8], timestamp_type: TimestampType) -> Result<Self, TimeStampError> {
        let content_info = rasn::der::decode::<rasn_cms::ContentInfo>(der)
            .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;

        if content_info.content_type.to_string() != SIGNED_DATA_OID {
            return Err(TimeStampError::DecodeError(
                "time stamp is not a CMS signed-data structure".to_string(),
            ));
        }

        let sd: SignedData = rasn::der::decode(any_bytes(&content_info.content))
            .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;

        if sd.encap_content_info.content_type.to_string() != TST_INFO_OID {
            return Err(TimeStampError::DecodeError(
                "signed data does not carry a TSTInfo".to_string(),
            ));
        }

        let Some(econtent) = &sd.encap_content_info.content else {
            return Err(TimeStampError::DecodeError(
                "time stamp does not contain digested content".to_string(),
            ));
        };

        // eContent is an OCTET STRING wrapping the DER of TSTInfo.
        let econtent_octets = rasn::der::decode::<rasn::types::OctetString>(any_bytes(econtent))
            .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;
        let tst_info_der = econtent_octets.to_vec();

        let tst: TstInfo = rasn::der::decode(&tst_info_der)
            .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;

        let mut certs = vec![];
        if let Some(cert_set) = &sd.certificates {
            for cc in set_of_items(cert_set) {
                if let rasn_cms::CertificateChoices::Certificate(c) = cc {
                    let cert_der = rasn::der::encode(c)
                        .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;
                    certs.push(cert_der);
                }
            }
        }

        let mut crls = vec![];
        let mut ocsps = vec![];
        if let Some(rev_info) = &sd.crls {
            for ric in set_of_items(rev_info) {
                match ric {
                    rasn_cms::RevocationInfoChoice::Crl(list) => {
                        let crl_der = rasn::der::encode(list)
                            .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;
                        crls.push(crl_der);
                    }
                    rasn_cms::RevocationInfoChoice::Other(other) => {
                        if other.other_rev_info_format.to_string() == RI_OCSP_RESPONSE_OID {
                            ocsps.push(any_bytes(&other.other_rev_info).to_vec());
                        }
                    }
                }
            }
        }

        // A time-stamp token carries exactly one signer.
        let signer_infos = set_of_items(&sd.signer_infos);
        let Some(signer_info) = signer_infos.first() else {
            return Err(TimeStampError::DecodeError(
                "time stamp contains no signer".to_string(),
            ));
        };

        let (signer_issuer_raw, signer_serial, signer_ski) = match &signer_info.sid {
            SignerIdentifier::IssuerAndSerialNumber(iasn) => {
                let issuer_der = rasn::der::encode(&iasn.issuer)
                    .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;
                let serial_der = rasn::der::encode(&iasn.serial_number)
                    .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;

                (
                    Some(issuer_der),
                    Some(der_integer_magnitude(&serial_der)?),
                    None,
                )
            }
            SignerIdentifier::SubjectKeyIdentifier(ski) => (None, None, Some(ski.to_vec())),
        };

        let Some(signed_attrs) = &signer_info.signed_attrs else {
            return Err(TimeStampError::DecodeError(
                "time stamp signer carries no signed attributes".to_string(),
            ));
        };

        // The message digest attribute is mandatory and must have exactly one
        // value.
        let mut signed_message_digest = None;
        for attr in set_of_items(signed_attrs) {
            if attribute_oid(attr) != MESSAGE_DIGEST_OID {
                continue;
            }

            let values = set_of_items(&attr.values);
            if values.len() != 1 {
                return Err(TimeStampError::DecodeError(format!(
                    "message digest attribute has {n} values, should have one",
                    n = values.len()
                )));
            }

            let Some(value) = values.first() else {
                continue;
            };

            let digest = rasn::der::decode::<rasn::types::OctetString>(any_bytes(value))
                .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;
            signed_message_digest = Some(digest.to_vec());
        }

        let Some(signed_message_digest) = signed_message_digest else {
            return Err(TimeStampError::InvalidData);
        };

        let digest_alg_oid = signer_info.digest_algorithm.algorithm.to_string();

        let Some(digest_alg) = DigestAlgorithm::from_oid_str(&digest_alg_oid) else {
            return Err(TimeStampError::UnsupportedAlgorithm);
        };

        // Signed attributes are digested and signed re-tagged as a universal
        // SET OF.
        let signed_attrs_der = rasn::der::encode(signed_attrs)
            .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;

        let message_imprint_alg_oid = tst.message_imprint.hash_algorithm.algorithm.to_string();

        Ok(TimestampToken {
            id: hex::encode(sha256(der)),
            timestamp_type,
            gen_time: tst.gen_time.with_timezone(&Utc),
            policy_oid: tst.policy.to_string(),
            message_imprint_alg_oid,
            message_imprint_digest: tst.message_imprint.hashed_message.to_vec(),
            certs,
            crls,
            ocsps,
            signer_issuer_raw,
            signer_serial,
            signer_ski,
            digest_alg_oid,
            sig_alg_oid: signer_info.signature_algorithm.algorithm.to_string(),
            signed_attrs_der,
            signature_value: signer_info.signature.to_vec(),
            signed_message_digest,
            econtent_digest: digest_alg.digest(&tst_info_der),
            message_imprint_data_found: false,
            message_imprint_data_intact: false,
            timestamped_references: vec![],
            der: der.to_vec(),
        })
    }

    /// The unique id of this token (hex SHA-256 of the DER encoding).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The DER encoding of this token.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The classification of this token.
    pub fn timestamp_type(&self) -> TimestampType {
        self.timestamp_type
    }

    /// The generation time stated by the TSA.
    pub fn gen_time(&self) -> DateTime<Utc> {
        self.gen_time
    }

    /// The TSA policy id, dotted-decimal.
    pub fn policy_oid(&self) -> &str {
        &self.policy_oid
    }

    /// Certificates embedded in the token, in DER format.
    pub fn certificates(&self) -> &[Vec<u8>] {
        &self.certs
    }

    /// CRLs embedded in the token, in DER format.
    pub fn crls(&self) -> &[Vec<u8>] {
        &self.crls
    }

    /// OCSP responses embedded in the token, in DER format.
    pub fn ocsps(&self) -> &[Vec<u8>] {
        &self.ocsps
    }

    /// The digest algorithm of the message imprint, dotted-decimal.
    pub fn message_imprint_alg_oid(&self) -> &str {
        &self.message_imprint_alg_oid
    }

    /// The digest carried by the message imprint.
    pub fn message_imprint_digest(&self) -> &[u8] {
        &self.message_imprint_digest
    }

    /// Check the message imprint against the data this token is claimed to
    /// cover.
    ///
    /// `data` is `None` when the timestamped data could not be
    /// reconstructed; the imprint is then recorded as not found. When the
    /// data is available but its digest differs, the imprint is recorded as
    /// found but not intact — the two conditions stay distinguishable
    /// downstream.
    pub fn check_message_imprint(&mut self, data: Option<&[u8]>) {
        let Some(data) = data else {
            self.message_imprint_data_found = false;
            self.message_imprint_data_intact = false;
            return;
        };

        self.message_imprint_data_found = true;

        self.message_imprint_data_intact =
            match DigestAlgorithm::from_oid_str(&self.message_imprint_alg_oid) {
                Some(alg) => alg.digest(data) == self.message_imprint_digest,
                None => false,
            };
    }

    /// Return `true` if the timestamped data was reconstructed for the
    /// message imprint check.
    pub fn is_message_imprint_data_found(&self) -> bool {
        self.message_imprint_data_found
    }

    /// Return `true` if the reconstructed data matched the message imprint.
    pub fn is_message_imprint_data_intact(&self) -> bool {
        self.message_imprint_data_intact
    }

    /// Return `true` if `cert` matches the signer identification of this
    /// token.
    pub fn signer_matches(&self, cert: &CertificateToken) -> bool {
        if let Some(ski) = &self.signer_ski {
            return cert.ski() == Some(ski.as_slice());
        }

        match (&self.signer_issuer_raw, &self.signer_serial) {
            (Some(issuer), Some(serial)) => {
                issuer == cert.issuer_raw() && serial == cert.serial()
            }
            _ => false,
        }
    }

    /// Verify the CMS signature of this token against the public key of
    /// `cert`.
    ///
    /// This includes the mandatory consistency check between the signed
    /// message digest attribute and the digest of the encapsulated TSTInfo.
    pub fn is_signed_by(&self, cert: &CertificateToken) -> bool {
        if self.signed_message_digest != self.econtent_digest {
            return false;
        }

        let Some(validator) =
            validator_for_sig_and_hash_oid_strs(&self.sig_alg_oid, &self.digest_alg_oid)
        else {
            return false;
        };

        validator
            .validate(
                &self.signature_value,
                &self.signed_attrs_der,
                cert.public_key_der(),
            )
            .is_ok()
    }

    /// Return the first embedded certificate matching the signer
    /// identification, as a token.
    pub fn signing_certificate(&self) -> Option<CertificateToken> {
        for cert_der in &self.certs {
            if let Ok(cert) = CertificateToken::from_der(cert_der) {
                if self.signer_matches(&cert) {
                    return Some(cert);
                }
            }
        }
        None
    }

    /// Objects this token proves existence for.
    pub fn timestamped_references(&self) -> &[TimestampedReference] {
        &self.timestamped_references
    }

    /// Record the objects this token proves existence for.
    ///
    /// Populated during timestamp classification, once the ids of the
    /// covered tokens are known.
    pub fn set_timestamped_references(&mut self, references: Vec<TimestampedReference>) {
        self.timestamped_references = references;
    }
}

impl fmt::Debug for TimestampToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampToken")
            .field("id", &self.id)
            .field("type", &self.timestamp_type)
            .field("gen_time", &self.gen_time)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TimestampToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TimestampToken {}

impl Hash for TimestampToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Describes errors that can be identified when decoding or verifying a
/// time-stamp token.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum TimeStampError {
    /// The DER encoding of the token could not be parsed.
    #[error("unable to decode time stamp: {0}")]
    DecodeError(String),

    /// The time stamp does not match the data it claims to cover.
    #[error("time stamp does not match data")]
    InvalidData,

    /// The time stamp uses an unsupported signing or hash algorithm.
    #[error("time stamp uses an unsupported algorithm")]
    UnsupportedAlgorithm,

    /// An unexpected internal error occured while processing the token.
    #[error("internal error ({0})")]
    InternalError(String),
}

// Single points of contact with the rasn container APIs; every call site
// goes through these.

pub(crate) fn any_bytes(any: &Any) -> &[u8] {
    any.as_bytes()
}

pub(crate) fn set_of_items<T>(set: &SetOf<T>) -> Vec<&T>
where
    T: Eq + std::hash::Hash,
{
    set.to_vec()
}

fn attribute_oid(attr: &Attribute) -> String {
    attr.r#type.to_string()
}

// Return the unsigned big-endian magnitude of a standalone DER INTEGER.
fn der_integer_magnitude(der: &[u8]) -> Result<Vec<u8>, TimeStampError> {
    let (_rem, obj) = x509_parser::der_parser::der::parse_der_integer(der)
        .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;

    let slice = obj
        .as_slice()
        .map_err(|e| TimeStampError::DecodeError(e.to_string()))?;

    Ok(strip_leading_zeroes(slice).to_vec())
}
