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
    certificate::CertificateToken,
    hash::DigestAlgorithm,
    revocation::{RevocationStatus, RevocationType},
    time_stamp::TimestampToken,
};
use chrono::{DateTime, Utc};

use crate::{
    context::ValidationContext,
    diagnostic::{
        CertificateDiagnostic, CertificateProvenance, CertificateRevocationDiagnostic,
        DiagnosticData, OrphanTokenDiagnostic, OrphanTokenType, RevocationDiagnostic,
        SignatureDiagnostic, TimestampDiagnostic,
    },
    signature::AdvancedSignature,
    source::ListCertificateSource,
};

/// Builds the frozen [`DiagnosticData`] snapshot from the live working set
/// of a validation run.
pub struct DiagnosticDataBuilder<'a> {
    document_name: Option<String>,
    validation_date: DateTime<Utc>,
    signatures: &'a [(AdvancedSignature, Option<String>)],
    context: &'a ValidationContext<'a>,
    complete_certificate_source: Option<&'a ListCertificateSource>,
}

impl<'a> DiagnosticDataBuilder<'a> {
    /// Create a builder over the run's working set.
    ///
    /// `signatures` is the flattened signature list with the parent id of
    /// each counter-signature. Detached timestamps flow in through the
    /// context.
    pub fn new(
        validation_date: DateTime<Utc>,
        signatures: &'a [(AdvancedSignature, Option<String>)],
        context: &'a ValidationContext<'a>,
    ) -> Self {
        DiagnosticDataBuilder {
            document_name: None,
            validation_date,
            signatures,
            context,
            complete_certificate_source: None,
        }
    }

    /// Record the validated document's name.
    pub fn document_name<S: Into<String>>(mut self, name: S) -> Self {
        self.document_name = Some(name.into());
        self
    }

    /// Attach the merged certificate source for provenance reporting.
    pub fn complete_certificate_source(mut self, source: &'a ListCertificateSource) -> Self {
        self.complete_certificate_source = Some(source);
        self
    }

    /// Freeze the snapshot.
    pub fn build(self) -> DiagnosticData {
        let mut data = DiagnosticData {
            document_name: self.document_name.clone(),
            validation_date: self.validation_date,
            signatures: vec![],
            used_certificates: vec![],
            used_revocations: vec![],
            used_timestamps: vec![],
            orphan_tokens: vec![],
        };

        for cert in self.context.processed_certificates() {
            data.used_certificates.push(self.build_certificate(cert));
        }

        for crl in self.context.processed_crls() {
            data.used_revocations.push(self.build_crl_diagnostic(crl));
        }

        for ocsp in self.context.processed_ocsps() {
            data.used_revocations.push(self.build_ocsp_diagnostic(ocsp));
        }

        for ts in self.context.processed_timestamps() {
            data.used_timestamps.push(self.build_timestamp(ts));
        }

        for (signature, parent) in self.signatures {
            data.signatures
                .push(self.build_signature(signature, parent.as_deref()));
        }

        for id in self.context.orphan_certificate_ids() {
            data.orphan_tokens.push(OrphanTokenDiagnostic {
                id: id.clone(),
                token_type: OrphanTokenType::Certificate,
                description: "certificate issuer could not be resolved".to_string(),
            });
        }

        for id in self.context.revocation_unavailable_ids() {
            data.orphan_tokens.push(OrphanTokenDiagnostic {
                id: id.clone(),
                token_type: OrphanTokenType::Revocation,
                description: "no revocation data available for certificate".to_string(),
            });
        }

        data
    }

    fn build_certificate(&self, cert: &CertificateToken) -> CertificateDiagnostic {
        let issuer_id = self
            .context
            .issuer_id_of(cert.id())
            .filter(|iid| *iid != cert.id())
            .map(|s| s.to_string());

        let signature_intact = if cert.is_self_signed() {
            cert.is_signed_by(cert)
        } else {
            issuer_id
                .as_ref()
                .and_then(|iid| self.context.certificate(iid))
                .map(|issuer| cert.is_signed_by(issuer))
                .unwrap_or(false)
        };

        let mut revocations = vec![];
        let issuer = issuer_id
            .as_ref()
            .and_then(|iid| self.context.certificate(iid));

        for rref in self.context.revocations_of(cert.id()) {
            match rref.revocation_type {
                RevocationType::Crl => {
                    if let Some(crl) = self
                        .context
                        .processed_crls()
                        .find(|c| c.id() == rref.id)
                    {
                        revocations.push(CertificateRevocationDiagnostic {
                            revocation_id: crl.id().to_string(),
                            status: crl.status_for(cert),
                            this_update: Some(crl.production_time()),
                            next_update: crl.next_update(),
                            cert_hash_ok: None,
                        });
                    }
                }
                RevocationType::Ocsp => {
                    if let Some(ocsp) = self
                        .context
                        .processed_ocsps()
                        .find(|o| o.id() == rref.id)
                    {
                        let status = issuer.and_then(|issuer| ocsp.status_for(cert, issuer));

                        let cert_hash_ok = if ocsp.is_cert_hash_extension_present() {
                            Some(ocsp.is_cert_hash_match(cert))
                        } else {
                            None
                        };

                        revocations.push(CertificateRevocationDiagnostic {
                            revocation_id: ocsp.id().to_string(),
                            status: status
                                .as_ref()
                                .map(|s| s.status.clone())
                                .unwrap_or(RevocationStatus::Unknown),
                            this_update: status.as_ref().map(|s| s.this_update),
                            next_update: status.as_ref().and_then(|s| s.next_update),
                            cert_hash_ok,
                        });
                    }
                }
            }
        }

        let provenance = self
            .complete_certificate_source
            .map(|source| {
                source
                    .origins_of(cert.id())
                    .into_iter()
                    .map(|(source_type, origin)| CertificateProvenance {
                        source_type,
                        origin,
                    })
                    .collect()
            })
            .unwrap_or_default();

        CertificateDiagnostic {
            id: cert.id().to_string(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: hex::encode(cert.serial()),
            not_before: cert.not_before(),
            not_after: cert.not_after(),
            signing_certificate_id: issuer_id,
            certificate_chain_ids: self.context.certificate_chain_of(cert.id()),
            trusted: self.context.is_trusted_id(cert.id()),
            self_signed: cert.is_self_signed(),
            id_pkix_ocsp_no_check: cert.is_id_pkix_ocsp_no_check(),
            signature_intact,
            digest_algorithm: cert.digest_algorithm(),
            encryption_algorithm: cert.encryption_algorithm(),
            key_length_bits: cert.public_key_size_bits(),
            revocations,
            provenance,
        }
    }

    fn build_crl_diagnostic(&self, crl: &ades_crypto::crl::CrlToken) -> RevocationDiagnostic {
        let signer = self
            .context
            .processed_certificates()
            .find(|cert| crl.is_issued_by_subject_of(cert) && crl.is_signed_by(cert));

        RevocationDiagnostic {
            id: crl.id().to_string(),
            revocation_type: RevocationType::Crl,
            production_date: crl.production_time(),
            next_update: crl.next_update(),
            signing_certificate_id: signer.map(|c| c.id().to_string()),
            certificate_chain_ids: signer
                .map(|c| self.context.certificate_chain_of(c.id()))
                .unwrap_or_default(),
            signature_intact: signer.is_some(),
            cert_hash_extension_present: false,
        }
    }

    fn build_ocsp_diagnostic(&self, ocsp: &ades_crypto::ocsp::OcspToken) -> RevocationDiagnostic {
        // Prefer the designated responder; fall back to any certificate
        // whose key verifies the response.
        let signer = self
            .context
            .processed_certificates()
            .find(|cert| ocsp.responder_matches(cert) && ocsp.is_signed_by(cert))
            .or_else(|| {
                self.context
                    .processed_certificates()
                    .find(|cert| ocsp.is_signed_by(cert))
            });

        RevocationDiagnostic {
            id: ocsp.id().to_string(),
            revocation_type: RevocationType::Ocsp,
            production_date: ocsp.production_time(),
            next_update: None,
            signing_certificate_id: signer.map(|c| c.id().to_string()),
            certificate_chain_ids: signer
                .map(|c| self.context.certificate_chain_of(c.id()))
                .unwrap_or_default(),
            signature_intact: signer.is_some(),
            cert_hash_extension_present: ocsp.is_cert_hash_extension_present(),
        }
    }

    fn build_timestamp(&self, ts: &TimestampToken) -> TimestampDiagnostic {
        let signer = self
            .context
            .processed_certificates()
            .find(|cert| ts.signer_matches(cert));

        let signature_intact = signer.map(|cert| ts.is_signed_by(cert)).unwrap_or(false);

        TimestampDiagnostic {
            id: ts.id().to_string(),
            timestamp_type: ts.timestamp_type(),
            production_time: ts.gen_time(),
            signing_certificate_id: signer.map(|c| c.id().to_string()),
            certificate_chain_ids: signer
                .map(|c| self.context.certificate_chain_of(c.id()))
                .unwrap_or_default(),
            signature_intact,
            message_imprint_data_found: ts.is_message_imprint_data_found(),
            message_imprint_data_intact: ts.is_message_imprint_data_intact(),
            digest_algorithm: DigestAlgorithm::from_oid_str(ts.message_imprint_alg_oid()),
            timestamped_objects: ts.timestamped_references().to_vec(),
        }
    }

    fn build_signature(
        &self,
        signature: &AdvancedSignature,
        parent_id: Option<&str>,
    ) -> SignatureDiagnostic {
        let verification = signature.crypto_verification().cloned().unwrap_or_default();

        let signing_certificate_id = verification.signing_certificate_id.clone();

        let key_length_bits = signing_certificate_id
            .as_ref()
            .and_then(|id| self.context.certificate(id))
            .map(|c| c.public_key_size_bits())
            .unwrap_or(0);

        SignatureDiagnostic {
            id: signature.id().to_string(),
            signature_format: signature.form(),
            filename: signature.filename().map(|s| s.to_string()),
            parent_id: parent_id.map(|s| s.to_string()),
            claimed_signing_time: signature.claimed_signing_time(),
            certificate_chain_ids: signing_certificate_id
                .as_ref()
                .map(|id| self.context.certificate_chain_of(id))
                .unwrap_or_default(),
            signing_certificate_id,
            signing_certificate_found: verification.signing_certificate_found,
            signature_intact: verification.signature_intact,
            digest_algorithm: signature.digest_algorithm(),
            encryption_algorithm: signature.encryption_algorithm(),
            key_length_bits,
            scopes: signature.scopes().to_vec(),
            timestamp_ids: signature
                .timestamp_source()
                .all()
                .iter()
                .map(|ts| ts.id().to_string())
                .collect(),
            error_message: verification.error_message,
        }
    }
}
