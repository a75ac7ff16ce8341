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

use ades_crypto::{
    hash::DigestAlgorithm,
    raw_signature::EncryptionAlgorithm,
    revocation::{RevocationStatus, RevocationType},
    time_stamp::{TimestampType, TimestampedReference},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    format::SignatureForm,
    signature::SignatureScope,
    source::{CertificateOrigin, CertificateSourceType},
};

/// The frozen, serializable snapshot of everything discovered during one
/// validation run.
///
/// Every signature, certificate, revocation and timestamp carries a stable
/// unique id; all relations are expressed through those ids.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DiagnosticData {
    /// Name of the validated document, if known.
    pub document_name: Option<String>,

    /// The control time of the run.
    pub validation_date: DateTime<Utc>,

    /// All signatures, counter-signatures included (flattened; see
    /// `parent_id`).
    pub signatures: Vec<SignatureDiagnostic>,

    /// All certificates processed during the run.
    pub used_certificates: Vec<CertificateDiagnostic>,

    /// All revocation tokens processed during the run.
    pub used_revocations: Vec<RevocationDiagnostic>,

    /// All timestamps processed during the run.
    pub used_timestamps: Vec<TimestampDiagnostic>,

    /// Evidence referenced but not resolvable to a verified object.
    pub orphan_tokens: Vec<OrphanTokenDiagnostic>,
}

impl DiagnosticData {
    /// Look up a signature by id.
    pub fn signature_by_id(&self, id: &str) -> Option<&SignatureDiagnostic> {
        self.signatures.iter().find(|s| s.id == id)
    }

    /// Look up a certificate by id.
    pub fn certificate_by_id(&self, id: &str) -> Option<&CertificateDiagnostic> {
        self.used_certificates.iter().find(|c| c.id == id)
    }

    /// Look up a revocation token by id.
    pub fn revocation_by_id(&self, id: &str) -> Option<&RevocationDiagnostic> {
        self.used_revocations.iter().find(|r| r.id == id)
    }

    /// Look up a timestamp by id.
    pub fn timestamp_by_id(&self, id: &str) -> Option<&TimestampDiagnostic> {
        self.used_timestamps.iter().find(|t| t.id == id)
    }

    /// The direct counter-signatures of `master_id`.
    pub fn counter_signatures_of(&self, master_id: &str) -> Vec<&SignatureDiagnostic> {
        self.signatures
            .iter()
            .filter(|s| s.parent_id.as_deref() == Some(master_id))
            .collect()
    }

    /// Return `true` if the certificate is a configured trust anchor.
    pub fn is_trusted(&self, cert_id: &str) -> bool {
        self.certificate_by_id(cert_id)
            .map(|c| c.trusted)
            .unwrap_or(false)
    }

    /// The revocation relations of a certificate, joined with the
    /// underlying revocation tokens.
    pub fn certificate_revocations(
        &self,
        cert_id: &str,
    ) -> Vec<(&CertificateRevocationDiagnostic, &RevocationDiagnostic)> {
        let Some(cert) = self.certificate_by_id(cert_id) else {
            return vec![];
        };

        cert.revocations
            .iter()
            .filter_map(|cr| {
                self.revocation_by_id(&cr.revocation_id)
                    .map(|token| (cr, token))
            })
            .collect()
    }

    /// Ids of all orphan tokens, sorted.
    pub fn orphan_token_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.orphan_tokens.iter().map(|o| o.id.clone()).collect();
        ids.sort();
        ids
    }
}

/// Snapshot of one signature.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SignatureDiagnostic {
    /// Unique id of the signature.
    pub id: String,

    /// The signature family.
    pub signature_format: SignatureForm,

    /// Filename inside the container, if any.
    pub filename: Option<String>,

    /// Id of the master signature when this is a counter-signature.
    pub parent_id: Option<String>,

    /// The signing time claimed inside the signature.
    pub claimed_signing_time: Option<DateTime<Utc>>,

    /// Id of the certificate the signature verified against.
    pub signing_certificate_id: Option<String>,

    /// Chain from the signing certificate towards a trust anchor.
    pub certificate_chain_ids: Vec<String>,

    /// A signing certificate candidate was identified.
    pub signing_certificate_found: bool,

    /// The signature value verified against the signing certificate.
    pub signature_intact: bool,

    /// The digest algorithm of the signature.
    pub digest_algorithm: Option<DigestAlgorithm>,

    /// The encryption algorithm family of the signature.
    pub encryption_algorithm: Option<EncryptionAlgorithm>,

    /// Public key length of the signing certificate, in bits.
    pub key_length_bits: usize,

    /// What the signature covers.
    pub scopes: Vec<SignatureScope>,

    /// Ids of the timestamps attached to this signature.
    pub timestamp_ids: Vec<String>,

    /// Why the integrity check failed, when it did.
    pub error_message: Option<String>,
}

/// Snapshot of one certificate.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CertificateDiagnostic {
    /// Unique id of the certificate.
    pub id: String,

    /// Subject distinguished name.
    pub subject: String,

    /// Issuer distinguished name.
    pub issuer: String,

    /// Hex-encoded serial number.
    pub serial: String,

    /// Start of the validity interval.
    pub not_before: DateTime<Utc>,

    /// End of the validity interval.
    pub not_after: DateTime<Utc>,

    /// Id of the resolved issuer certificate, if any.
    pub signing_certificate_id: Option<String>,

    /// Chain from this certificate towards a trust anchor.
    pub certificate_chain_ids: Vec<String>,

    /// The certificate belongs to a configured trust anchor store.
    pub trusted: bool,

    /// Subject and issuer name are identical.
    pub self_signed: bool,

    /// The certificate carries id-pkix-ocsp-nocheck.
    pub id_pkix_ocsp_no_check: bool,

    /// The certificate signature verified against its resolved issuer.
    pub signature_intact: bool,

    /// Digest algorithm of the certificate's own signature.
    pub digest_algorithm: Option<DigestAlgorithm>,

    /// Encryption algorithm family of the certificate's own signature.
    pub encryption_algorithm: Option<EncryptionAlgorithm>,

    /// Public key length in bits.
    pub key_length_bits: usize,

    /// Revocation tokens covering this certificate.
    pub revocations: Vec<CertificateRevocationDiagnostic>,

    /// Every (source type, origin) pair the certificate was found under.
    pub provenance: Vec<CertificateProvenance>,
}

/// Where a certificate was found.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CertificateProvenance {
    /// The type of the source holding the certificate.
    pub source_type: Option<CertificateSourceType>,

    /// The structure the certificate was found in.
    pub origin: CertificateOrigin,
}

/// One revocation token viewed with respect to one certificate.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CertificateRevocationDiagnostic {
    /// Id of the revocation token.
    pub revocation_id: String,

    /// Status the token reports for the certificate.
    pub status: RevocationStatus,

    /// thisUpdate of the matching response, when applicable.
    pub this_update: Option<DateTime<Utc>>,

    /// nextUpdate of the matching response, when stated.
    pub next_update: Option<DateTime<Utc>>,

    /// Outcome of the OCSP certHash comparison for this certificate;
    /// `None` when the extension is absent or the token is a CRL.
    pub cert_hash_ok: Option<bool>,
}

/// Snapshot of one revocation token.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RevocationDiagnostic {
    /// Unique id of the token.
    pub id: String,

    /// CRL or OCSP.
    pub revocation_type: RevocationType,

    /// Production time (CRL thisUpdate / OCSP producedAt).
    pub production_date: DateTime<Utc>,

    /// nextUpdate, when stated.
    pub next_update: Option<DateTime<Utc>>,

    /// Id of the certificate that signed the token, if resolved.
    pub signing_certificate_id: Option<String>,

    /// Chain of the token's signer towards a trust anchor.
    pub certificate_chain_ids: Vec<String>,

    /// The token signature verified against its resolved signer.
    pub signature_intact: bool,

    /// An ETSI certHash extension is present (OCSP only).
    pub cert_hash_extension_present: bool,
}

/// Snapshot of one timestamp.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimestampDiagnostic {
    /// Unique id of the token.
    pub id: String,

    /// Classification of the timestamp.
    pub timestamp_type: TimestampType,

    /// Generation time stated by the TSA.
    pub production_time: DateTime<Utc>,

    /// Id of the certificate that signed the token, if resolved.
    pub signing_certificate_id: Option<String>,

    /// Chain of the token's signer towards a trust anchor.
    pub certificate_chain_ids: Vec<String>,

    /// The token signature verified against its resolved signer.
    pub signature_intact: bool,

    /// The timestamped data could be reconstructed.
    pub message_imprint_data_found: bool,

    /// The reconstructed data matched the message imprint.
    pub message_imprint_data_intact: bool,

    /// Digest algorithm of the message imprint.
    pub digest_algorithm: Option<DigestAlgorithm>,

    /// Objects this timestamp proves existence for.
    pub timestamped_objects: Vec<TimestampedReference>,
}

/// A token referenced by the evidence but not resolvable to a known,
/// verified object.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OrphanTokenDiagnostic {
    /// Id of the affected token.
    pub id: String,

    /// What kind of evidence is missing.
    pub token_type: OrphanTokenType,

    /// Why the token is considered orphan.
    pub description: String,
}

/// Kind of an orphan token record.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrphanTokenType {
    /// A certificate without a resolvable issuer.
    Certificate,

    /// A certificate without available revocation data.
    Revocation,
}
