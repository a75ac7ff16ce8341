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

//! X.509 certificate tokens.

use std::{borrow::Cow, fmt, hash::Hash};

use chrono::{DateTime, Utc};
use thiserror::Error;
use x509_parser::{
    der_parser::Oid,
    extensions::{DistributionPointName, GeneralName, ParsedExtension},
    pem::Pem,
    prelude::{FromDer, X509Certificate},
};

use crate::{
    hash::{sha256, DigestAlgorithm},
    raw_signature::{
        digest_for_cert_sig_alg, encryption_alg_for_cert_sig_alg,
        oids::{AD_CA_ISSUERS_OID, AD_OCSP_OID, ID_PKIX_OCSP_NOCHECK_OID},
        validator_for_cert_sig_alg, EncryptionAlgorithm,
    },
};

/// An immutable, content-addressed X.509 certificate.
///
/// The token id is the lowercase hex SHA-256 hash of the DER encoding;
/// equality and hashing are by id. All attributes consulted during chain
/// building are extracted once at construction time so the token owns its
/// data.
#[derive(Clone)]
pub struct CertificateToken {
    der: Vec<u8>,
    id: String,

    subject: String,
    issuer: String,
    subject_raw: Vec<u8>,
    issuer_raw: Vec<u8>,
    serial: Vec<u8>,

    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,

    ski: Option<Vec<u8>>,
    aki: Option<Vec<u8>>,

    self_signed: bool,
    ca: bool,
    key_cert_sign: bool,
    crl_sign: bool,
    ocsp_signing: bool,
    time_stamping: bool,
    ocsp_no_check: bool,

    aia_issuer_urls: Vec<String>,
    ocsp_responder_urls: Vec<String>,
    crl_distribution_urls: Vec<String>,

    public_key_der: Vec<u8>,
    public_key_bits: Vec<u8>,
    public_key_size_bits: usize,

    encryption_algorithm: Option<EncryptionAlgorithm>,
    digest_algorithm: Option<DigestAlgorithm>,
    sig_alg_oid: Vec<u8>,

    tbs: Vec<u8>,
    signature_value: Vec<u8>,
}

impl CertificateToken {
    /// Build a certificate token from a DER encoding.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_rem, cert) = X509Certificate::from_der(der)
            .map_err(|e| CertificateError::ParseError(e.to_string()))?;

        let not_before = DateTime::<Utc>::from_timestamp(cert.validity().not_before.timestamp(), 0)
            .ok_or_else(|| CertificateError::ParseError("invalid notBefore".to_string()))?;
        let not_after = DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
            .ok_or_else(|| CertificateError::ParseError("invalid notAfter".to_string()))?;

        let mut ski = None;
        let mut aki = None;
        let mut ca = false;
        let mut key_cert_sign = false;
        let mut crl_sign = false;
        let mut ocsp_signing = false;
        let mut time_stamping = false;
        let mut ocsp_no_check = false;
        let mut aia_issuer_urls = vec![];
        let mut ocsp_responder_urls = vec![];
        let mut crl_distribution_urls = vec![];

        for ext in cert.extensions() {
            match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(id) => {
                    ski = Some(id.0.to_vec());
                }

                ParsedExtension::AuthorityKeyIdentifier(id) => {
                    aki = id.key_identifier.as_ref().map(|ki| ki.0.to_vec());
                }

                ParsedExtension::BasicConstraints(bc) => {
                    ca = bc.ca;
                }

                ParsedExtension::KeyUsage(ku) => {
                    key_cert_sign = ku.key_cert_sign();
                    crl_sign = ku.crl_sign();
                }

                ParsedExtension::ExtendedKeyUsage(eku) => {
                    ocsp_signing = eku.ocsp_signing;
                    time_stamping = eku.time_stamping;
                }

                ParsedExtension::AuthorityInfoAccess(aia) => {
                    for ad in &aia.accessdescs {
                        if let GeneralName::URI(uri) = ad.access_location {
                            if ad.access_method == AD_OCSP_OID {
                                ocsp_responder_urls.push(uri.to_string());
                            } else if ad.access_method == AD_CA_ISSUERS_OID {
                                aia_issuer_urls.push(uri.to_string());
                            }
                        }
                    }
                }

                ParsedExtension::CRLDistributionPoints(cdp) => {
                    for point in &cdp.points {
                        if let Some(DistributionPointName::FullName(names)) =
                            &point.distribution_point
                        {
                            for name in names {
                                if let GeneralName::URI(uri) = name {
                                    crl_distribution_urls.push(uri.to_string());
                                }
                            }
                        }
                    }
                }

                _ => {
                    if ext.oid == ID_PKIX_OCSP_NOCHECK_OID {
                        ocsp_no_check = true;
                    }
                }
            }
        }

        let mut public_key_size_bits = cert
            .public_key()
            .parsed()
            .map(|pk| pk.key_size())
            .unwrap_or(0);

        if public_key_size_bits == 0 {
            // Derive the size from the named curve when the parser cannot.
            public_key_size_bits = match crate::ec_utils::ec_curve_from_public_key_der(
                cert.public_key().raw,
            ) {
                Some(curve) => curve.p1363_sig_len() * 4,
                None => 0,
            };
        }

        let sig_alg = &cert.signature_algorithm.algorithm;

        Ok(CertificateToken {
            id: hex::encode(sha256(der)),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            subject_raw: cert.subject().as_raw().to_vec(),
            issuer_raw: cert.issuer().as_raw().to_vec(),
            serial: strip_leading_zeroes(cert.raw_serial()).to_vec(),
            not_before,
            not_after,
            ski,
            aki,
            self_signed: cert.subject().as_raw() == cert.issuer().as_raw(),
            ca,
            key_cert_sign,
            crl_sign,
            ocsp_signing,
            time_stamping,
            ocsp_no_check,
            aia_issuer_urls,
            ocsp_responder_urls,
            crl_distribution_urls,
            public_key_der: cert.public_key().raw.to_vec(),
            public_key_bits: cert.public_key().subject_public_key.data.to_vec(),
            public_key_size_bits,
            encryption_algorithm: encryption_alg_for_cert_sig_alg(sig_alg),
            digest_algorithm: digest_for_cert_sig_alg(sig_alg),
            sig_alg_oid: sig_alg.as_bytes().to_vec(),
            tbs: cert.tbs_certificate.as_ref().to_vec(),
            signature_value: cert.signature_value.data.to_vec(),
            der: der.to_vec(),
        })
    }

    /// Read zero or more certificates from a PEM bundle.
    ///
    /// Lines outside of PEM blocks are ignored.
    pub fn from_pem_bundle(pems: &[u8]) -> Result<Vec<Self>, CertificateError> {
        let mut certs = vec![];

        for maybe_pem in Pem::iter_from_buffer(pems) {
            // NOTE: The `x509_parser::pem::Pem` struct's `contents` field contains the
            // decoded PEM content, which is expected to be in DER format.
            match maybe_pem {
                Ok(pem) => certs.push(Self::from_der(&pem.contents)?),
                Err(e) => {
                    return Err(CertificateError::ParseError(e.to_string()));
                }
            }
        }

        Ok(certs)
    }

    /// The unique id of this token (hex SHA-256 of the DER encoding).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The DER encoding of this certificate.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The subject distinguished name.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The issuer distinguished name.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The raw DER encoding of the subject name.
    pub fn subject_raw(&self) -> &[u8] {
        &self.subject_raw
    }

    /// The raw DER encoding of the issuer name.
    pub fn issuer_raw(&self) -> &[u8] {
        &self.issuer_raw
    }

    /// The certificate serial number as big-endian bytes without leading
    /// zeroes.
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }

    /// Start of the validity interval.
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity interval.
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Return `true` if `time` falls within the validity interval.
    pub fn is_valid_at(&self, time: DateTime<Utc>) -> bool {
        time >= self.not_before && time <= self.not_after
    }

    /// The subject key identifier, if present.
    pub fn ski(&self) -> Option<&[u8]> {
        self.ski.as_deref()
    }

    /// The authority key identifier, if present.
    pub fn aki(&self) -> Option<&[u8]> {
        self.aki.as_deref()
    }

    /// Return `true` if subject and issuer name are identical.
    pub fn is_self_signed(&self) -> bool {
        self.self_signed
    }

    /// Return `true` if the basic constraints extension marks this
    /// certificate as a CA.
    pub fn is_ca(&self) -> bool {
        self.ca
    }

    /// Return `true` if the key usage extension allows certificate signing.
    pub fn can_sign_certificates(&self) -> bool {
        self.key_cert_sign
    }

    /// Return `true` if the key usage extension allows CRL signing.
    pub fn can_sign_crls(&self) -> bool {
        self.crl_sign
    }

    /// Return `true` if the extended key usage extension allows OCSP
    /// response signing.
    pub fn is_ocsp_signing(&self) -> bool {
        self.ocsp_signing
    }

    /// Return `true` if the extended key usage extension allows time
    /// stamping.
    pub fn is_time_stamping(&self) -> bool {
        self.time_stamping
    }

    /// Return `true` if the certificate carries the `id-pkix-ocsp-nocheck`
    /// extension.
    pub fn is_id_pkix_ocsp_no_check(&self) -> bool {
        self.ocsp_no_check
    }

    /// URLs from the AIA extension pointing to the issuer certificate.
    pub fn aia_issuer_urls(&self) -> &[String] {
        &self.aia_issuer_urls
    }

    /// URLs from the AIA extension pointing to an OCSP responder.
    pub fn ocsp_responder_urls(&self) -> &[String] {
        &self.ocsp_responder_urls
    }

    /// URLs from the CRL distribution points extension.
    pub fn crl_distribution_urls(&self) -> &[String] {
        &self.crl_distribution_urls
    }

    /// The DER encoding of the SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// The raw contents of the subjectPublicKey BIT STRING.
    ///
    /// This is the value OCSP responders hash for by-key responder ids and
    /// CertId issuer key hashes.
    pub fn public_key_bits(&self) -> &[u8] {
        &self.public_key_bits
    }

    /// The public key size in bits, or 0 when it could not be determined.
    pub fn public_key_size_bits(&self) -> usize {
        self.public_key_size_bits
    }

    /// The encryption algorithm family of the certificate's own signature.
    pub fn encryption_algorithm(&self) -> Option<EncryptionAlgorithm> {
        self.encryption_algorithm
    }

    /// The digest algorithm of the certificate's own signature.
    pub fn digest_algorithm(&self) -> Option<DigestAlgorithm> {
        self.digest_algorithm
    }

    /// Return the digest of the DER encoding under the requested algorithm.
    pub fn digest(&self, alg: DigestAlgorithm) -> Vec<u8> {
        alg.digest(&self.der)
    }

    /// Return `true` if `issuer` could have issued this certificate, judged
    /// by name chaining and (when both key identifiers are present) the
    /// AKI/SKI linkage.
    pub fn is_issued_by(&self, issuer: &CertificateToken) -> bool {
        if self.issuer_raw != issuer.subject_raw {
            return false;
        }

        match (&self.aki, &issuer.ski) {
            (Some(aki), Some(ski)) => aki == ski,
            _ => true,
        }
    }

    /// Verify the certificate signature against the public key of `issuer`.
    pub fn is_signed_by(&self, issuer: &CertificateToken) -> bool {
        let sig_alg = Oid::new(Cow::Borrowed(self.sig_alg_oid.as_slice()));

        let Some(validator) = validator_for_cert_sig_alg(&sig_alg) else {
            return false;
        };

        validator
            .validate(&self.signature_value, &self.tbs, &issuer.public_key_der)
            .is_ok()
    }
}

impl fmt::Debug for CertificateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateToken")
            .field("id", &self.id)
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CertificateToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CertificateToken {}

impl Hash for CertificateToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Retrieve the issuer certificate of `cert` through its AIA caIssuers
/// URLs.
///
/// Returns the raw DER bytes of the first reachable candidate, or `None` on
/// any transport failure. Callers treat an unreachable issuer as an orphan
/// condition, never as an error.
pub fn fetch_issuer_via_aia(cert: &CertificateToken) -> Option<Vec<u8>> {
    use std::io::Read;

    for url in cert.aia_issuer_urls() {
        let Ok(response) = ureq::get(url).call() else {
            continue;
        };

        if response.status() != 200 {
            continue;
        }

        let len = response
            .header("Content-Length")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(10000);

        let mut cert_der: Vec<u8> = Vec::with_capacity(len);

        if response
            .into_reader()
            .take(1000000)
            .read_to_end(&mut cert_der)
            .is_ok()
        {
            return Some(cert_der);
        }
    }

    None
}

pub(crate) fn strip_leading_zeroes(bytes: &[u8]) -> &[u8] {
    let mut slice = bytes;
    while slice.len() > 1 && slice[0] == 0 {
        slice = &slice[1..];
    }
    slice
}

/// Describes errors that can be identified when reading a certificate.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum CertificateError {
    /// The certificate encoding could not be parsed.
    #[error("unable to parse certificate: {0}")]
    ParseError(String),
}
