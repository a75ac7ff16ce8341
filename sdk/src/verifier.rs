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

//! Configuration shared by every validation run.

use ades_crypto::{crl::CrlToken, hash::DigestAlgorithm, ocsp::OcspToken};

use crate::{
    alert::StatusAlert,
    source::{
        AiaSource, CommonCertificateSource, ListCertificateSource, ListRevocationSource,
        RevocationSource,
    },
};

/// The `CertificateVerifier` carries the external sources of certificates
/// and revocation data used during signature validation, together with the
/// escalation policy for evidence-gap conditions.
///
/// It is read many times during a run but never mutated by validation
/// itself; the signature-embedded sources are set by the validator before
/// the run starts.
pub struct CertificateVerifier {
    trusted_sources: Vec<CommonCertificateSource>,
    adjunct_source: Option<CommonCertificateSource>,

    signature_certificate_source: Option<ListCertificateSource>,
    signature_crl_source: Option<ListRevocationSource<CrlToken>>,
    signature_ocsp_source: Option<ListRevocationSource<OcspToken>>,

    online_crl_source: Option<Box<dyn RevocationSource<CrlToken>>>,
    online_ocsp_source: Option<Box<dyn RevocationSource<OcspToken>>>,
    aia_source: Option<Box<dyn AiaSource>>,

    default_digest_algorithm: DigestAlgorithm,

    // Escalation policy for conditions discovered at augmentation time.
    alert_on_invalid_timestamp: StatusAlert,
    alert_on_missing_revocation_data: StatusAlert,
    alert_on_revoked_certificate: StatusAlert,
    alert_on_no_revocation_after_best_signature_time: StatusAlert,
    alert_on_uncovered_poe: StatusAlert,
}

impl Default for CertificateVerifier {
    fn default() -> Self {
        CertificateVerifier {
            trusted_sources: vec![],
            adjunct_source: None,
            signature_certificate_source: None,
            signature_crl_source: None,
            signature_ocsp_source: None,
            online_crl_source: None,
            online_ocsp_source: None,
            aia_source: None,
            default_digest_algorithm: DigestAlgorithm::Sha256,
            alert_on_invalid_timestamp: StatusAlert::Throw,
            alert_on_missing_revocation_data: StatusAlert::Throw,
            alert_on_revoked_certificate: StatusAlert::Throw,
            alert_on_no_revocation_after_best_signature_time: StatusAlert::LogWarn,
            alert_on_uncovered_poe: StatusAlert::LogWarn,
        }
    }
}

impl CertificateVerifier {
    /// Create a verifier with no sources and the default alert policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trust anchor store.
    ///
    /// Certificates in trusted sources terminate chain building and are
    /// exempt from revocation checks.
    pub fn add_trusted_cert_source(&mut self, source: CommonCertificateSource) {
        self.trusted_sources.push(source);
    }

    /// The configured trust anchor stores.
    pub fn trusted_cert_sources(&self) -> &[CommonCertificateSource] {
        &self.trusted_sources
    }

    /// Return `true` if `id` belongs to a certificate of a trusted source.
    pub fn is_trusted_id(&self, id: &str) -> bool {
        self.trusted_sources
            .iter()
            .any(|s| s.get_by_id(id).is_some())
    }

    /// Set a store of additional untrusted certificates usable for chain
    /// building.
    pub fn set_adjunct_cert_source(&mut self, source: CommonCertificateSource) {
        self.adjunct_source = Some(source);
    }

    /// The adjunct certificate source, if configured.
    pub fn adjunct_cert_source(&self) -> Option<&CommonCertificateSource> {
        self.adjunct_source.as_ref()
    }

    /// Set the merged certificate source extracted from the signatures under
    /// validation. Called by the validator before a run.
    pub fn set_signature_certificate_source(&mut self, source: ListCertificateSource) {
        self.signature_certificate_source = Some(source);
    }

    /// The merged signature certificate source of the current run.
    pub fn signature_certificate_source(&self) -> Option<&ListCertificateSource> {
        self.signature_certificate_source.as_ref()
    }

    /// Set the merged CRL source extracted from the signatures under
    /// validation. Called by the validator before a run.
    pub fn set_signature_crl_source(&mut self, source: ListRevocationSource<CrlToken>) {
        self.signature_crl_source = Some(source);
    }

    /// The merged signature CRL source of the current run.
    pub fn signature_crl_source(&self) -> Option<&ListRevocationSource<CrlToken>> {
        self.signature_crl_source.as_ref()
    }

    /// Set the merged OCSP source extracted from the signatures under
    /// validation. Called by the validator before a run.
    pub fn set_signature_ocsp_source(&mut self, source: ListRevocationSource<OcspToken>) {
        self.signature_ocsp_source = Some(source);
    }

    /// The merged signature OCSP source of the current run.
    pub fn signature_ocsp_source(&self) -> Option<&ListRevocationSource<OcspToken>> {
        self.signature_ocsp_source.as_ref()
    }

    /// Set an online CRL source.
    pub fn set_crl_source(&mut self, source: Box<dyn RevocationSource<CrlToken>>) {
        self.online_crl_source = Some(source);
    }

    /// The online CRL source, if configured.
    pub fn crl_source(&self) -> Option<&dyn RevocationSource<CrlToken>> {
        self.online_crl_source.as_deref()
    }

    /// Set an online OCSP source.
    pub fn set_ocsp_source(&mut self, source: Box<dyn RevocationSource<OcspToken>>) {
        self.online_ocsp_source = Some(source);
    }

    /// The online OCSP source, if configured.
    pub fn ocsp_source(&self) -> Option<&dyn RevocationSource<OcspToken>> {
        self.online_ocsp_source.as_deref()
    }

    /// Set the AIA issuer resolver.
    pub fn set_aia_source(&mut self, source: Box<dyn AiaSource>) {
        self.aia_source = Some(source);
    }

    /// The AIA issuer resolver, if configured.
    pub fn aia_source(&self) -> Option<&dyn AiaSource> {
        self.aia_source.as_deref()
    }

    /// Set the digest algorithm used where none is imposed by the data.
    pub fn set_default_digest_algorithm(&mut self, alg: DigestAlgorithm) {
        self.default_digest_algorithm = alg;
    }

    /// The digest algorithm used where none is imposed by the data.
    pub fn default_digest_algorithm(&self) -> DigestAlgorithm {
        self.default_digest_algorithm
    }

    /// Set the escalation policy for an invalid timestamp found at
    /// augmentation time. Default: [`StatusAlert::Throw`].
    pub fn set_alert_on_invalid_timestamp(&mut self, alert: StatusAlert) {
        self.alert_on_invalid_timestamp = alert;
    }

    /// The escalation policy for an invalid timestamp.
    pub fn alert_on_invalid_timestamp(&self) -> StatusAlert {
        self.alert_on_invalid_timestamp
    }

    /// Set the escalation policy for missing revocation data at
    /// augmentation time. Default: [`StatusAlert::Throw`].
    pub fn set_alert_on_missing_revocation_data(&mut self, alert: StatusAlert) {
        self.alert_on_missing_revocation_data = alert;
    }

    /// The escalation policy for missing revocation data.
    pub fn alert_on_missing_revocation_data(&self) -> StatusAlert {
        self.alert_on_missing_revocation_data
    }

    /// Set the escalation policy for a revoked certificate encountered at
    /// augmentation time. Default: [`StatusAlert::Throw`].
    pub fn set_alert_on_revoked_certificate(&mut self, alert: StatusAlert) {
        self.alert_on_revoked_certificate = alert;
    }

    /// The escalation policy for a revoked certificate.
    pub fn alert_on_revoked_certificate(&self) -> StatusAlert {
        self.alert_on_revoked_certificate
    }

    /// Set the escalation policy for the absence of any revocation data
    /// produced after the best signature time. Default:
    /// [`StatusAlert::LogWarn`].
    pub fn set_alert_on_no_revocation_after_best_signature_time(&mut self, alert: StatusAlert) {
        self.alert_on_no_revocation_after_best_signature_time = alert;
    }

    /// The escalation policy for missing fresh revocation data.
    pub fn alert_on_no_revocation_after_best_signature_time(&self) -> StatusAlert {
        self.alert_on_no_revocation_after_best_signature_time
    }

    /// Set the escalation policy for tokens without a proof of existence.
    /// Default: [`StatusAlert::LogWarn`].
    pub fn set_alert_on_uncovered_poe(&mut self, alert: StatusAlert) {
        self.alert_on_uncovered_poe = alert;
    }

    /// The escalation policy for tokens without a proof of existence.
    pub fn alert_on_uncovered_poe(&self) -> StatusAlert {
        self.alert_on_uncovered_poe
    }
}

impl std::fmt::Debug for CertificateVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateVerifier")
            .field("trusted_sources", &self.trusted_sources.len())
            .field("has_adjunct", &self.adjunct_source.is_some())
            .field("has_aia_source", &self.aia_source.is_some())
            .field("default_digest_algorithm", &self.default_digest_algorithm)
            .finish_non_exhaustive()
    }
}
