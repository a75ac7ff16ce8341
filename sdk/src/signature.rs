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

//! The signature evidence unit produced by format handlers.

use ades_crypto::{
    certificate::CertificateToken,
    crl::CrlToken,
    hash::{sha256, DigestAlgorithm},
    ocsp::OcspToken,
    raw_signature::{
        digest_for_sig_oid_str, encryption_alg_for_sig_oid_str,
        validator_for_sig_and_hash_oid_strs, EncryptionAlgorithm,
    },
    time_stamp::{
        TimestampToken, TimestampType, TimestampedObjectType, TimestampedReference,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    format::SignatureForm,
    manifest::ManifestFile,
    source::{CertificateOrigin, CommonCertificateSource, CommonRevocationSource},
};

/// The part of a document a signature actually covers.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SignatureScope {
    /// Name of the covered object (document name, part name, or signature
    /// id for counter-signatures).
    pub name: String,

    /// Kind of coverage.
    pub scope_type: SignatureScopeType,

    /// Human-readable description.
    pub description: String,
}

/// Kind of coverage of a [`SignatureScope`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SignatureScopeType {
    /// The full document is covered.
    Full,

    /// Only parts of the document are covered.
    Partial,

    /// Only a digest of the document was available.
    DigestOnly,

    /// A counter-signature covering another signature's value.
    CounterSignedSignature,
}

/// How the signature designates its signing certificate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SigningCertificateRef {
    /// Issuer name (raw DER) and serial of the designated certificate.
    pub issuer_serial: Option<(Vec<u8>, Vec<u8>)>,

    /// Subject key identifier of the designated certificate.
    pub ski: Option<Vec<u8>>,

    /// Digest of the designated certificate.
    pub cert_digest: Option<(DigestAlgorithm, Vec<u8>)>,
}

impl SigningCertificateRef {
    fn matches(&self, cert: &CertificateToken) -> bool {
        if let Some((issuer, serial)) = &self.issuer_serial {
            if issuer == cert.issuer_raw() && serial == cert.serial() {
                return true;
            }
        }

        if let Some(ski) = &self.ski {
            if cert.ski() == Some(ski.as_slice()) {
                return true;
            }
        }

        if let Some((alg, digest)) = &self.cert_digest {
            if &cert.digest(*alg) == digest {
                return true;
            }
        }

        false
    }
}

/// Outcome of the structural/cryptographic intactness check of one
/// signature, independent of trust-chain validity.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SignatureCryptoVerification {
    /// A signing certificate candidate was identified.
    pub signing_certificate_found: bool,

    /// The signature value verified against the signing certificate.
    pub signature_intact: bool,

    /// Id of the certificate the signature verified against.
    pub signing_certificate_id: Option<String>,

    /// Why verification failed, when it did.
    pub error_message: Option<String>,
}

/// Classified timestamps of one signature.
#[derive(Clone, Debug, Default)]
pub struct TimestampSource {
    content_timestamps: Vec<TimestampToken>,
    signature_timestamps: Vec<TimestampToken>,
    validation_data_timestamps: Vec<TimestampToken>,
    archive_timestamps: Vec<TimestampToken>,
}

impl TimestampSource {
    /// Add a timestamp; routed by its type.
    pub fn add(&mut self, token: TimestampToken) {
        match token.timestamp_type() {
            TimestampType::ContentTimestamp => self.content_timestamps.push(token),
            TimestampType::SignatureTimestamp | TimestampType::DetachedTimestamp => {
                self.signature_timestamps.push(token)
            }
            TimestampType::ValidationDataTimestamp => {
                self.validation_data_timestamps.push(token)
            }
            TimestampType::ArchiveTimestamp => self.archive_timestamps.push(token),
        }
    }

    /// Timestamps over the signed content.
    pub fn content_timestamps(&self) -> &[TimestampToken] {
        &self.content_timestamps
    }

    /// Timestamps over the signature value.
    pub fn signature_timestamps(&self) -> &[TimestampToken] {
        &self.signature_timestamps
    }

    /// Timestamps over collected validation data.
    pub fn validation_data_timestamps(&self) -> &[TimestampToken] {
        &self.validation_data_timestamps
    }

    /// Archival timestamps.
    pub fn archive_timestamps(&self) -> &[TimestampToken] {
        &self.archive_timestamps
    }

    /// All timestamps, content first, archive last.
    pub fn all(&self) -> Vec<&TimestampToken> {
        self.content_timestamps
            .iter()
            .chain(&self.signature_timestamps)
            .chain(&self.validation_data_timestamps)
            .chain(&self.archive_timestamps)
            .collect()
    }

    fn all_mut(&mut self) -> Vec<&mut TimestampToken> {
        self.content_timestamps
            .iter_mut()
            .chain(&mut self.signature_timestamps)
            .chain(&mut self.validation_data_timestamps)
            .chain(&mut self.archive_timestamps)
            .collect()
    }

    /// Certificate sources of every timestamp (embedded certificates).
    pub fn timestamp_certificate_sources(&self) -> Vec<CommonCertificateSource> {
        let mut sources = vec![];

        for ts in self.all() {
            let mut source = CommonCertificateSource::of_type(
                crate::source::CertificateSourceType::Timestamp,
            );
            for cert_der in ts.certificates() {
                if let Ok(token) = CertificateToken::from_der(cert_der) {
                    source.add_certificate_with_origin(token, CertificateOrigin::KeyInfo);
                }
            }
            sources.push(source);
        }

        sources
    }

    /// CRL sources of every timestamp (embedded revocation data).
    pub fn timestamp_crl_sources(&self) -> Vec<CommonRevocationSource<CrlToken>> {
        let mut sources = vec![];

        for ts in self.all() {
            let mut source = CommonRevocationSource::new();
            for crl_der in ts.crls() {
                if let Ok(token) = CrlToken::from_der(crl_der) {
                    source.add(token);
                }
            }
            sources.push(source);
        }

        sources
    }

    /// OCSP sources of every timestamp (embedded revocation data).
    pub fn timestamp_ocsp_sources(&self) -> Vec<CommonRevocationSource<OcspToken>> {
        let mut sources = vec![];

        for ts in self.all() {
            let mut source = CommonRevocationSource::new();
            for ocsp_der in ts.ocsps() {
                if let Ok(token) = OcspToken::from_der(ocsp_der) {
                    source.add(token);
                }
            }
            sources.push(source);
        }

        sources
    }
}

/// The root evidence unit of a validation run.
///
/// Produced by a [`SignatureFormatHandler`](crate::format::SignatureFormatHandler);
/// owns its counter-signatures as a tree. The validator flattens the tree
/// into an id-indexed arena with `parent` links — signatures never hold a
/// back-pointer to their parent.
#[derive(Clone)]
pub struct AdvancedSignature {
    id: String,
    form: SignatureForm,
    filename: Option<String>,

    signature_value: Vec<u8>,
    signed_data: Vec<u8>,
    archive_timestamp_data: Option<Vec<u8>>,

    sig_alg_oid: String,
    digest_alg_oid: String,

    claimed_signing_time: Option<DateTime<Utc>>,

    certificate_source: CommonCertificateSource,
    crl_source: CommonRevocationSource<CrlToken>,
    ocsp_source: CommonRevocationSource<OcspToken>,

    signing_certificate_ref: Option<SigningCertificateRef>,

    timestamp_source: TimestampSource,

    counter_signatures: Vec<AdvancedSignature>,

    scopes: Vec<SignatureScope>,
    manifest: Option<ManifestFile>,

    crypto_verification: Option<SignatureCryptoVerification>,
}

impl AdvancedSignature {
    /// Create a signature evidence unit.
    ///
    /// `sig_alg_oid` and `digest_alg_oid` are the dotted-decimal OIDs of the
    /// signature and digest algorithms; `signed_data` is the exact byte
    /// sequence the signature value was computed over.
    pub fn new(
        form: SignatureForm,
        signature_value: Vec<u8>,
        signed_data: Vec<u8>,
        sig_alg_oid: &str,
        digest_alg_oid: &str,
    ) -> Self {
        AdvancedSignature {
            id: hex::encode(sha256(&signature_value)),
            form,
            filename: None,
            signature_value,
            signed_data,
            archive_timestamp_data: None,
            sig_alg_oid: sig_alg_oid.to_string(),
            digest_alg_oid: digest_alg_oid.to_string(),
            claimed_signing_time: None,
            certificate_source: CommonCertificateSource::of_type(
                crate::source::CertificateSourceType::Signature,
            ),
            crl_source: CommonRevocationSource::new(),
            ocsp_source: CommonRevocationSource::new(),
            signing_certificate_ref: None,
            timestamp_source: TimestampSource::default(),
            counter_signatures: vec![],
            scopes: vec![],
            manifest: None,
            crypto_verification: None,
        }
    }

    /// The unique id of this signature (hex SHA-256 of the signature
    /// value).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The signature family.
    pub fn form(&self) -> SignatureForm {
        self.form
    }

    /// Filename of the signature inside its container, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Set the container filename.
    pub fn set_filename<S: Into<String>>(&mut self, filename: S) {
        self.filename = Some(filename.into());
    }

    /// The raw signature value.
    pub fn signature_value(&self) -> &[u8] {
        &self.signature_value
    }

    /// The exact bytes the signature value covers.
    pub fn signed_data(&self) -> &[u8] {
        &self.signed_data
    }

    /// The dotted-decimal OID of the signature algorithm.
    pub fn signature_algorithm_oid(&self) -> &str {
        &self.sig_alg_oid
    }

    /// The digest algorithm of the signature, when recognized.
    pub fn digest_algorithm(&self) -> Option<DigestAlgorithm> {
        DigestAlgorithm::from_oid_str(&self.digest_alg_oid)
            .or_else(|| digest_for_sig_oid_str(&self.sig_alg_oid))
    }

    /// The encryption algorithm family of the signature, when recognized.
    pub fn encryption_algorithm(&self) -> Option<EncryptionAlgorithm> {
        encryption_alg_for_sig_oid_str(&self.sig_alg_oid)
    }

    /// The signing time claimed inside the signature, if present.
    pub fn claimed_signing_time(&self) -> Option<DateTime<Utc>> {
        self.claimed_signing_time
    }

    /// Set the claimed signing time.
    pub fn set_claimed_signing_time(&mut self, time: DateTime<Utc>) {
        self.claimed_signing_time = Some(time);
    }

    /// The bytes covered by validation-data and archive timestamps, when
    /// the format handler could reconstruct them.
    pub fn archive_timestamp_data(&self) -> Option<&[u8]> {
        self.archive_timestamp_data.as_deref()
    }

    /// Provide the bytes covered by validation-data and archive
    /// timestamps.
    ///
    /// When absent, those timestamps report their message imprint data as
    /// not found.
    pub fn set_archive_timestamp_data(&mut self, data: Vec<u8>) {
        self.archive_timestamp_data = Some(data);
    }

    /// Add an embedded certificate found under `origin`.
    pub fn add_certificate(&mut self, token: CertificateToken, origin: CertificateOrigin) {
        self.certificate_source
            .add_certificate_with_origin(token, origin);
    }

    /// Add an embedded CRL.
    pub fn add_crl(&mut self, token: CrlToken) {
        self.crl_source.add(token);
    }

    /// Add an embedded OCSP response.
    pub fn add_ocsp(&mut self, token: OcspToken) {
        self.ocsp_source.add(token);
    }

    /// Add a timestamp.
    pub fn add_timestamp(&mut self, token: TimestampToken) {
        self.timestamp_source.add(token);
    }

    /// Record how the signature designates its signing certificate.
    pub fn set_signing_certificate_ref(&mut self, reference: SigningCertificateRef) {
        self.signing_certificate_ref = Some(reference);
    }

    /// Attach a counter-signature.
    pub fn add_counter_signature(&mut self, counter_signature: AdvancedSignature) {
        self.counter_signatures.push(counter_signature);
    }

    /// The direct counter-signatures of this signature.
    pub fn counter_signatures(&self) -> &[AdvancedSignature] {
        &self.counter_signatures
    }

    /// Take ownership of the direct counter-signatures (used when the
    /// validator flattens the tree).
    pub(crate) fn take_counter_signatures(&mut self) -> Vec<AdvancedSignature> {
        std::mem::take(&mut self.counter_signatures)
    }

    /// The certificates embedded in this signature.
    pub fn certificate_source(&self) -> &CommonCertificateSource {
        &self.certificate_source
    }

    /// The CRLs embedded in this signature.
    pub fn crl_source(&self) -> &CommonRevocationSource<CrlToken> {
        &self.crl_source
    }

    /// The OCSP responses embedded in this signature.
    pub fn ocsp_source(&self) -> &CommonRevocationSource<OcspToken> {
        &self.ocsp_source
    }

    /// The classified timestamps of this signature.
    pub fn timestamp_source(&self) -> &TimestampSource {
        &self.timestamp_source
    }

    /// Attach the ASiC manifest this signature is associated with.
    pub fn set_manifest(&mut self, manifest: ManifestFile) {
        self.manifest = Some(manifest);
    }

    /// The ASiC manifest, if any.
    pub fn manifest(&self) -> Option<&ManifestFile> {
        self.manifest.as_ref()
    }

    /// The computed signature scopes.
    pub fn scopes(&self) -> &[SignatureScope] {
        &self.scopes
    }

    /// Candidate signing certificates: the embedded certificates matching
    /// the signing-certificate reference, or every embedded certificate if
    /// the signature carries no reference.
    pub fn signing_certificate_candidates(&self) -> Vec<&CertificateToken> {
        let all = self.certificate_source.certificates();

        match &self.signing_certificate_ref {
            Some(reference) => all.iter().filter(|c| reference.matches(c)).collect(),
            None => all.iter().collect(),
        }
    }

    /// Compute the signature scopes.
    ///
    /// Must run before certificate merging because content timestamps are
    /// checked against the scoped data.
    pub fn find_signature_scopes(&mut self, document_name: Option<&str>, parent: Option<&str>) {
        if !self.scopes.is_empty() {
            return;
        }

        if let Some(parent_id) = parent {
            self.scopes.push(SignatureScope {
                name: parent_id.to_string(),
                scope_type: SignatureScopeType::CounterSignedSignature,
                description: "The signature value of the master signature".to_string(),
            });
            return;
        }

        if let Some(manifest) = &self.manifest {
            for entry in &manifest.entries {
                self.scopes.push(SignatureScope {
                    name: entry.uri.clone(),
                    scope_type: SignatureScopeType::Partial,
                    description: "Manifest entry".to_string(),
                });
            }
            return;
        }

        self.scopes.push(SignatureScope {
            name: document_name.unwrap_or("full document").to_string(),
            scope_type: SignatureScopeType::Full,
            description: "Full document".to_string(),
        });
    }

    /// Check the message imprint of every timestamp and record what each
    /// one covers.
    ///
    /// Content timestamps are checked against the signed data, signature
    /// timestamps against the signature value, and validation-data and
    /// archive timestamps against the handler-provided archive data (their
    /// imprint is recorded as not found when that data is unavailable).
    pub fn validate_timestamps(&mut self) {
        let signature_id = self.id.clone();
        let signed_data = self.signed_data.clone();
        let signature_value = self.signature_value.clone();
        let archive_data = self.archive_timestamp_data.clone();

        let cert_ids: Vec<String> = self
            .certificate_source
            .certificates()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        let crl_ids: Vec<String> = self
            .crl_source
            .tokens()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        let ocsp_ids: Vec<String> = self
            .ocsp_source
            .tokens()
            .iter()
            .map(|t| t.id().to_string())
            .collect();

        let earlier_timestamp_ids: Vec<String> = self
            .timestamp_source
            .content_timestamps()
            .iter()
            .chain(self.timestamp_source.signature_timestamps())
            .map(|t| t.id().to_string())
            .collect();

        for ts in self.timestamp_source.all_mut() {
            let mut references = vec![];

            match ts.timestamp_type() {
                TimestampType::ContentTimestamp => {
                    ts.check_message_imprint(Some(&signed_data));
                    references.push(TimestampedReference {
                        token_id: signature_id.clone(),
                        category: TimestampedObjectType::SignedData,
                    });
                }

                TimestampType::SignatureTimestamp | TimestampType::DetachedTimestamp => {
                    ts.check_message_imprint(Some(&signature_value));
                    references.push(TimestampedReference {
                        token_id: signature_id.clone(),
                        category: TimestampedObjectType::Signature,
                    });
                }

                TimestampType::ValidationDataTimestamp | TimestampType::ArchiveTimestamp => {
                    ts.check_message_imprint(archive_data.as_deref());

                    references.push(TimestampedReference {
                        token_id: signature_id.clone(),
                        category: TimestampedObjectType::Signature,
                    });
                    for id in &cert_ids {
                        references.push(TimestampedReference {
                            token_id: id.clone(),
                            category: TimestampedObjectType::Certificate,
                        });
                    }
                    for id in crl_ids.iter().chain(&ocsp_ids) {
                        references.push(TimestampedReference {
                            token_id: id.clone(),
                            category: TimestampedObjectType::Revocation,
                        });
                    }
                    for id in &earlier_timestamp_ids {
                        references.push(TimestampedReference {
                            token_id: id.clone(),
                            category: TimestampedObjectType::Timestamp,
                        });
                    }
                }
            }

            ts.set_timestamped_references(references);
        }
    }

    /// Verify the cryptographic intactness of this signature.
    ///
    /// A structural check independent of trust-chain validity: each signing
    /// certificate candidate is tried until the signature value verifies.
    /// The outcome is cached.
    pub fn check_signature_integrity(&mut self) -> &SignatureCryptoVerification {
        if self.crypto_verification.is_none() {
            self.crypto_verification = Some(self.verify_signature_value());
        }

        // Guaranteed set above; the default is unreachable.
        self.crypto_verification
            .get_or_insert_with(SignatureCryptoVerification::default)
    }

    /// The cached intactness outcome, when already computed.
    pub fn crypto_verification(&self) -> Option<&SignatureCryptoVerification> {
        self.crypto_verification.as_ref()
    }

    fn verify_signature_value(&self) -> SignatureCryptoVerification {
        let candidates = self.signing_certificate_candidates();

        if candidates.is_empty() {
            return SignatureCryptoVerification {
                signing_certificate_found: false,
                signature_intact: false,
                signing_certificate_id: None,
                error_message: Some("no candidate signing certificate found".to_string()),
            };
        }

        let Some(validator) =
            validator_for_sig_and_hash_oid_strs(&self.sig_alg_oid, &self.digest_alg_oid)
        else {
            return SignatureCryptoVerification {
                signing_certificate_found: true,
                signature_intact: false,
                signing_certificate_id: candidates.first().map(|c| c.id().to_string()),
                error_message: Some(format!(
                    "unsupported signature algorithm {}",
                    self.sig_alg_oid
                )),
            };
        };

        for candidate in &candidates {
            if validator
                .validate(
                    &self.signature_value,
                    &self.signed_data,
                    candidate.public_key_der(),
                )
                .is_ok()
            {
                return SignatureCryptoVerification {
                    signing_certificate_found: true,
                    signature_intact: true,
                    signing_certificate_id: Some(candidate.id().to_string()),
                    error_message: None,
                };
            }
        }

        // Identification of the signing certificate is independent of
        // verification success: the designated candidate stays identified
        // even when the value does not verify.
        SignatureCryptoVerification {
            signing_certificate_found: true,
            signature_intact: false,
            signing_certificate_id: candidates.first().map(|c| c.id().to_string()),
            error_message: Some("signature value does not verify against any candidate".to_string()),
        }
    }
}

impl std::fmt::Debug for AdvancedSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvancedSignature")
            .field("id", &self.id)
            .field("form", &self.form)
            .field("counter_signatures", &self.counter_signatures.len())
            .finish_non_exhaustive()
    }
}
