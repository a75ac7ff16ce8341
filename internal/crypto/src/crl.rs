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

//! Certificate revocation list tokens.

use std::{borrow::Cow, fmt, hash::Hash};

use chrono::{DateTime, Utc};
use x509_parser::{
    der_parser::Oid,
    extensions::ParsedExtension,
    prelude::{CertificateRevocationList, FromDer},
};

use crate::{
    certificate::{strip_leading_zeroes, CertificateToken},
    hash::sha256,
    raw_signature::validator_for_cert_sig_alg,
    revocation::{RevocationError, RevocationStatus, RevocationType},
};

/// An immutable, content-addressed certificate revocation list.
///
/// The token id is the lowercase hex SHA-256 hash of the DER encoding.
#[derive(Clone)]
pub struct CrlToken {
    der: Vec<u8>,
    id: String,

    issuer: String,
    issuer_raw: Vec<u8>,
    aki: Option<Vec<u8>>,

    this_update: DateTime<Utc>,
    next_update: Option<DateTime<Utc>>,

    revoked: Vec<RevokedEntry>,

    sig_alg_oid: Vec<u8>,
    tbs: Vec<u8>,
    signature_value: Vec<u8>,
}

#[derive(Clone, Debug)]
struct RevokedEntry {
    serial: Vec<u8>,
    revocation_time: DateTime<Utc>,
    reason: Option<String>,
}

impl CrlToken {
    /// Build a CRL token from a DER encoding.
    pub fn from_der(der: &[u8]) -> Result<Self, RevocationError> {
        let (_rem, crl) = CertificateRevocationList::from_der(der)
            .map_err(|e| RevocationError::DecodeError(e.to_string()))?;

        let this_update = DateTime::<Utc>::from_timestamp(crl.last_update().timestamp(), 0)
            .ok_or_else(|| RevocationError::DecodeError("invalid thisUpdate".to_string()))?;

        let next_update = match crl.next_update() {
            Some(nu) => Some(
                DateTime::<Utc>::from_timestamp(nu.timestamp(), 0)
                    .ok_or_else(|| RevocationError::DecodeError("invalid nextUpdate".to_string()))?,
            ),
            None => None,
        };

        let mut revoked = vec![];
        for rc in crl.iter_revoked_certificates() {
            let revocation_time =
                DateTime::<Utc>::from_timestamp(rc.revocation_date.timestamp(), 0).ok_or_else(
                    || RevocationError::DecodeError("invalid revocationDate".to_string()),
                )?;

            revoked.push(RevokedEntry {
                serial: strip_leading_zeroes(&rc.user_certificate.to_bytes_be()).to_vec(),
                revocation_time,
                reason: rc.reason_code().map(|(_, code)| format!("{code}")),
            });
        }

        let mut aki = None;
        for ext in crl.extensions() {
            if let ParsedExtension::AuthorityKeyIdentifier(id) = ext.parsed_extension() {
                aki = id.key_identifier.as_ref().map(|ki| ki.0.to_vec());
            }
        }

        Ok(CrlToken {
            id: hex::encode(sha256(der)),
            issuer: crl.issuer().to_string(),
            issuer_raw: crl.issuer().as_raw().to_vec(),
            aki,
            this_update,
            next_update,
            revoked,
            sig_alg_oid: crl.signature_algorithm.algorithm.as_bytes().to_vec(),
            tbs: crl.tbs_cert_list.as_ref().to_vec(),
            signature_value: crl.signature_value.data.to_vec(),
            der: der.to_vec(),
        })
    }

    /// The unique id of this token (hex SHA-256 of the DER encoding).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The DER encoding of this CRL.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The revocation mechanism represented by this token.
    pub fn revocation_type(&self) -> RevocationType {
        RevocationType::Crl
    }

    /// The issuer distinguished name.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The authority key identifier, if present.
    pub fn aki(&self) -> Option<&[u8]> {
        self.aki.as_deref()
    }

    /// The production time of this token (CRL thisUpdate).
    pub fn production_time(&self) -> DateTime<Utc> {
        self.this_update
    }

    /// The time by which a newer CRL is promised, if stated.
    pub fn next_update(&self) -> Option<DateTime<Utc>> {
        self.next_update
    }

    /// Return `true` if the CRL issuer name matches the subject name of
    /// `cert`.
    pub fn is_issued_by_subject_of(&self, cert: &CertificateToken) -> bool {
        self.issuer_raw == cert.subject_raw()
    }

    /// Return the status this CRL reports for `cert`.
    ///
    /// A CRL whose issuer does not match the certificate's issuer name
    /// determines nothing and reports [`RevocationStatus::Unknown`].
    pub fn status_for(&self, cert: &CertificateToken) -> RevocationStatus {
        if self.issuer_raw != cert.issuer_raw() {
            return RevocationStatus::Unknown;
        }

        for entry in &self.revoked {
            if entry.serial == cert.serial() {
                return RevocationStatus::Revoked {
                    time: entry.revocation_time,
                    reason: entry.reason.clone(),
                };
            }
        }

        RevocationStatus::Good
    }

    /// Verify the CRL signature against the public key of `signer`.
    pub fn is_signed_by(&self, signer: &CertificateToken) -> bool {
        let sig_alg = Oid::new(Cow::Borrowed(self.sig_alg_oid.as_slice()));

        let Some(validator) = validator_for_cert_sig_alg(&sig_alg) else {
            return false;
        };

        validator
            .validate(&self.signature_value, &self.tbs, signer.public_key_der())
            .is_ok()
    }
}

/// Retrieve a CRL from a distribution point URL.
///
/// Returns the raw DER bytes, or `None` on any transport failure. Callers
/// treat a missing CRL as an evidence gap, never as an error.
pub fn fetch_crl(url: &str) -> Option<Vec<u8>> {
    use std::io::Read;

    let response = ureq::get(url).call().ok()?;

    if response.status() != 200 {
        return None;
    }

    let len = response
        .header("Content-Length")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10000);

    let mut crl_der: Vec<u8> = Vec::with_capacity(len);

    response
        .into_reader()
        .take(10000000)
        .read_to_end(&mut crl_der)
        .ok()?;

    Some(crl_der)
}

impl fmt::Debug for CrlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrlToken")
            .field("id", &self.id)
            .field("issuer", &self.issuer)
            .field("this_update", &self.this_update)
            .field("next_update", &self.next_update)
            .field("revoked_count", &self.revoked.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for CrlToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CrlToken {}

impl Hash for CrlToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
