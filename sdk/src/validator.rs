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

//! The single entry point orchestrating one validation run.

use ades_crypto::time_stamp::TimestampToken;
use ades_status_tracker::{log_item, validation_codes, StatusTracker};
use chrono::{DateTime, Utc};
use log::info;

use crate::{
    context::ValidationContext,
    diagnostic::DiagnosticDataBuilder,
    document::Document,
    format::FormatHandlerRegistry,
    manifest::ManifestFile,
    process::{ValidationPolicy, ValidationProcessExecutor},
    reports::Reports,
    signature::AdvancedSignature,
    source::{ListCertificateSource, ListRevocationSource},
    verifier::CertificateVerifier,
    CrlToken, Error, OcspToken, Result,
};

/// Validates a signed document.
///
/// The document format is resolved through an explicit
/// [`FormatHandlerRegistry`]; everything downstream is format independent.
pub struct DocumentValidator<'a> {
    document: Document,
    registry: &'a FormatHandlerRegistry,
    verifier: CertificateVerifier,
    validation_time: Option<DateTime<Utc>>,
    manifest_files: Vec<ManifestFile>,
    skip_validation_context_execution: bool,
    validation_log: StatusTracker,
}

impl<'a> DocumentValidator<'a> {
    /// Create a validator for `document`.
    ///
    /// Fails with [`Error::UnsupportedDocument`] when no registered handler
    /// recognizes the document.
    pub fn from_document(
        document: Document,
        registry: &'a FormatHandlerRegistry,
        verifier: CertificateVerifier,
    ) -> Result<Self> {
        if registry.handler_for(&document).is_none() {
            return Err(Error::UnsupportedDocument);
        }

        Ok(DocumentValidator {
            document,
            registry,
            verifier,
            validation_time: None,
            manifest_files: vec![],
            skip_validation_context_execution: false,
            validation_log: StatusTracker::default(),
        })
    }

    /// The log items accumulated during the last validation run.
    pub fn validation_log(&self) -> &StatusTracker {
        &self.validation_log
    }

    /// Define a custom validation time. Defaults to the current time.
    pub fn set_validation_time(&mut self, time: DateTime<Utc>) {
        self.validation_time = Some(time);
    }

    /// Attach the container manifest files (ASiC-E).
    pub fn set_manifest_files(&mut self, manifests: Vec<ManifestFile>) {
        self.manifest_files = manifests;
    }

    /// Disable certificate chain building and revocation data collection.
    pub fn set_skip_validation_context_execution(&mut self, skip: bool) {
        self.skip_validation_context_execution = skip;
    }

    /// The container manifest files.
    pub fn manifest_files(&self) -> &[ManifestFile] {
        &self.manifest_files
    }

    /// Validate the document and all its signatures against `policy`.
    pub fn validate_document(&mut self, policy: &ValidationPolicy) -> Result<Reports> {
        info!("Document validation...");

        let handler = self
            .registry
            .handler_for(&self.document)
            .ok_or(Error::UnsupportedDocument)?;

        // (a) Extract all signatures, flattening nested counter-signatures
        // depth-first while recording the parent link.
        let extracted = handler.extract_signatures(&self.document)?;
        let mut detached_timestamps = handler.extract_detached_timestamps(&self.document)?;

        let mut signatures: Vec<(AdvancedSignature, Option<String>)> = vec![];
        for signature in extracted {
            append_counter_signatures(&mut signatures, signature, None);
        }

        // (b) Signature scopes must be computed before certificate merging
        // because content timestamps depend on the scoped data.
        let document_name = self.document.name().map(|s| s.to_string());
        for (signature, parent) in &mut signatures {
            signature.find_signature_scopes(document_name.as_deref(), parent.as_deref());
            signature.validate_timestamps();
        }

        for ts in &mut detached_timestamps {
            ts.check_message_imprint(Some(self.document.bytes()));
        }

        // Integrity of each signature is checked independently of
        // trust-chain validity.
        for (signature, _) in &mut signatures {
            let id = signature.id().to_string();
            let verification = signature.check_signature_integrity();

            if verification.signature_intact {
                log_item!(id, "signature value verified", "validate_document")
                    .validation_status(validation_codes::SIGNATURE_INTACT)
                    .success(&mut self.validation_log);
            } else if !verification.signing_certificate_found {
                log_item!(
                    id,
                    "no candidate signing certificate found",
                    "validate_document"
                )
                .validation_status(validation_codes::SIGNING_CERTIFICATE_NOT_FOUND)
                .failure_no_throw(&mut self.validation_log, Error::InvalidSignatureEncoding(
                    "no candidate signing certificate".to_string(),
                ));
            } else {
                log_item!(id, "signature value does not verify", "validate_document")
                    .validation_status(validation_codes::SIGNATURE_MISMATCH)
                    .failure_no_throw(&mut self.validation_log, Error::InvalidSignatureEncoding(
                        "signature mismatch".to_string(),
                    ));
            }

            for ts in signature.timestamp_source().all() {
                if ts.is_message_imprint_data_found() && ts.is_message_imprint_data_intact() {
                    log_item!(
                        ts.id().to_string(),
                        "timestamp message imprint verified",
                        "validate_document"
                    )
                    .validation_status(validation_codes::TIMESTAMP_VALIDATED)
                    .success(&mut self.validation_log);
                } else {
                    log_item!(
                        ts.id().to_string(),
                        "timestamp message imprint mismatch",
                        "validate_document"
                    )
                    .validation_status(validation_codes::TIMESTAMP_MISMATCH)
                    .failure_no_throw(&mut self.validation_log, Error::InvalidSignatureEncoding(
                        "timestamp mismatch".to_string(),
                    ));
                }
            }
        }

        // (c) Merge the evidence embedded across every signature and
        // detached timestamp into unified list sources.
        let list_certificate_source =
            merge_certificate_sources(&signatures, &detached_timestamps);
        let list_crl_source = merge_crl_sources(&signatures, &detached_timestamps);
        let list_ocsp_source = merge_ocsp_sources(&signatures, &detached_timestamps);

        // (d) Feed the merged sources into the certificate verifier.
        self.verifier
            .set_signature_certificate_source(list_certificate_source.clone());
        self.verifier.set_signature_crl_source(list_crl_source);
        self.verifier.set_signature_ocsp_source(list_ocsp_source);

        // (e) Prepare the validation context.
        let validation_time = self.validation_time.unwrap_or_else(Utc::now);
        let mut context = ValidationContext::new(validation_time);
        context.initialize(&self.verifier);

        for (signature, _) in &signatures {
            for cert in signature.certificate_source().certificates() {
                context.add_certificate_token_for_verification(cert.clone());
            }

            for crl in signature.crl_source().tokens() {
                context.add_crl_token(crl.clone());
            }

            for ocsp in signature.ocsp_source().tokens() {
                context.add_ocsp_token(ocsp.clone());
            }

            for ts in signature.timestamp_source().all() {
                context.add_timestamp_token_for_verification(ts.clone());
            }
        }

        for ts in &detached_timestamps {
            context.add_timestamp_token_for_verification(ts.clone());
        }

        // (f) Resolve chains and revocation data.
        if !self.skip_validation_context_execution {
            context.validate();
        }

        for orphan_id in context.orphan_certificate_ids() {
            log_item!(
                orphan_id.clone(),
                "certificate issuer could not be resolved",
                "validate_document"
            )
            .validation_status(validation_codes::TOKEN_ORPHANED)
            .informational(&mut self.validation_log);
        }

        for id in context.revocation_unavailable_ids() {
            log_item!(
                id.clone(),
                "no revocation data available",
                "validate_document"
            )
            .validation_status(validation_codes::REVOCATION_MISSING)
            .informational(&mut self.validation_log);
        }

        // (g) Freeze the diagnostic data.
        let mut builder = DiagnosticDataBuilder::new(validation_time, &signatures, &context)
            .complete_certificate_source(&list_certificate_source);
        if let Some(name) = &document_name {
            builder = builder.document_name(name.clone());
        }
        let diagnostic_data = builder.build();

        // (h) Execute the policy engine.
        Ok(ValidationProcessExecutor::new(diagnostic_data, policy).execute())
    }
}

// Flatten the counter-signature tree depth-first, recording parent ids.
fn append_counter_signatures(
    list: &mut Vec<(AdvancedSignature, Option<String>)>,
    mut signature: AdvancedSignature,
    parent: Option<String>,
) {
    let counter_signatures = signature.take_counter_signatures();
    let id = signature.id().to_string();

    list.push((signature, parent));

    for counter_signature in counter_signatures {
        append_counter_signatures(list, counter_signature, Some(id.clone()));
    }
}

// For all signatures to be validated, merge the certificate sources,
// including every timestamp's embedded certificates.
fn merge_certificate_sources(
    signatures: &[(AdvancedSignature, Option<String>)],
    detached_timestamps: &[TimestampToken],
) -> ListCertificateSource {
    let mut merged = ListCertificateSource::new();

    for (signature, _) in signatures {
        merged.add(signature.certificate_source().clone());

        for source in signature.timestamp_source().timestamp_certificate_sources() {
            merged.add(source);
        }
    }

    for ts in detached_timestamps {
        let mut source = crate::source::CommonCertificateSource::of_type(
            crate::source::CertificateSourceType::Timestamp,
        );
        for cert_der in ts.certificates() {
            if let Ok(token) = crate::CertificateToken::from_der(cert_der) {
                source.add_certificate_with_origin(
                    token,
                    crate::source::CertificateOrigin::KeyInfo,
                );
            }
        }
        merged.add(source);
    }

    merged
}

// For all signatures to be validated, merge the CRL sources.
fn merge_crl_sources(
    signatures: &[(AdvancedSignature, Option<String>)],
    detached_timestamps: &[TimestampToken],
) -> ListRevocationSource<CrlToken> {
    let mut merged = ListRevocationSource::new();

    for (signature, _) in signatures {
        merged.add(signature.crl_source().clone());

        for source in signature.timestamp_source().timestamp_crl_sources() {
            merged.add(source);
        }
    }

    for ts in detached_timestamps {
        let mut source = crate::source::CommonRevocationSource::new();
        for crl_der in ts.crls() {
            if let Ok(token) = CrlToken::from_der(crl_der) {
                source.add(token);
            }
        }
        merged.add(source);
    }

    merged
}

// For all signatures to be validated, merge the OCSP sources.
fn merge_ocsp_sources(
    signatures: &[(AdvancedSignature, Option<String>)],
    detached_timestamps: &[TimestampToken],
) -> ListRevocationSource<OcspToken> {
    let mut merged = ListRevocationSource::new();

    for (signature, _) in signatures {
        merged.add(signature.ocsp_source().clone());

        for source in signature.timestamp_source().timestamp_ocsp_sources() {
            merged.add(source);
        }
    }

    for ts in detached_timestamps {
        let mut source = crate::source::CommonRevocationSource::new();
        for ocsp_der in ts.ocsps() {
            if let Ok(token) = OcspToken::from_der(ocsp_der) {
                source.add(token);
            }
        }
        merged.add(source);
    }

    merged
}
