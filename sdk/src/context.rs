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

//! The working set of one validation run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ades_crypto::{
    certificate::CertificateToken,
    crl::CrlToken,
    ocsp::OcspToken,
    revocation::{RevocationStatus, RevocationType},
    time_stamp::TimestampToken,
};
use chrono::{DateTime, Utc};
use log::warn;

use crate::{
    alert::TokenStatus, source::RevocationSource, verifier::CertificateVerifier, Result,
};

/// Reference from a certificate to one revocation token covering it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevocationRef {
    /// Id of the revocation token.
    pub id: String,

    /// CRL or OCSP.
    pub revocation_type: RevocationType,
}

/// `ValidationContext` resolves the complete certificate chain and
/// revocation status closure needed to reach a trust anchor, or proves that
/// no such anchor exists.
///
/// It is owned exclusively by a single validation invocation and discarded
/// once the reports are produced.
pub struct ValidationContext<'a> {
    verifier: Option<&'a CertificateVerifier>,
    validation_time: DateTime<Utc>,

    certificates: BTreeMap<String, CertificateToken>,
    crls: BTreeMap<String, CrlToken>,
    ocsps: BTreeMap<String, OcspToken>,
    timestamps: BTreeMap<String, TimestampToken>,

    issuer_of: HashMap<String, String>,
    revocations_of: HashMap<String, Vec<RevocationRef>>,
    revocation_checked: BTreeSet<String>,

    orphan_certificate_ids: BTreeSet<String>,
    revocation_unavailable_ids: BTreeSet<String>,
    trusted_ids: BTreeSet<String>,
}

impl<'a> ValidationContext<'a> {
    /// Create a context validating at the given time.
    pub fn new(validation_time: DateTime<Utc>) -> Self {
        ValidationContext {
            verifier: None,
            validation_time,
            certificates: BTreeMap::new(),
            crls: BTreeMap::new(),
            ocsps: BTreeMap::new(),
            timestamps: BTreeMap::new(),
            issuer_of: HashMap::new(),
            revocations_of: HashMap::new(),
            revocation_checked: BTreeSet::new(),
            orphan_certificate_ids: BTreeSet::new(),
            revocation_unavailable_ids: BTreeSet::new(),
            trusted_ids: BTreeSet::new(),
        }
    }

    /// Wire the trusted/adjunct/signature certificate sources and the
    /// revocation sources.
    pub fn initialize(&mut self, verifier: &'a CertificateVerifier) {
        self.verifier = Some(verifier);
    }

    /// The control time of this run.
    pub fn validation_time(&self) -> DateTime<Utc> {
        self.validation_time
    }

    /// Register a certificate as needing issuer resolution.
    ///
    /// Idempotent by token id.
    pub fn add_certificate_token_for_verification(&mut self, cert: CertificateToken) {
        self.certificates.entry(cert.id().to_string()).or_insert(cert);
    }

    /// Register a timestamp, transitively pulling in its embedded
    /// certificates and revocation data.
    pub fn add_timestamp_token_for_verification(&mut self, timestamp: TimestampToken) {
        for cert_der in timestamp.certificates() {
            if let Ok(cert) = CertificateToken::from_der(cert_der) {
                self.add_certificate_token_for_verification(cert);
            }
        }

        for crl_der in timestamp.crls() {
            if let Ok(crl) = CrlToken::from_der(crl_der) {
                self.crls.entry(crl.id().to_string()).or_insert(crl);
            }
        }

        for ocsp_der in timestamp.ocsps() {
            if let Ok(ocsp) = OcspToken::from_der(ocsp_der) {
                self.register_ocsp(ocsp);
            }
        }

        self.timestamps
            .entry(timestamp.id().to_string())
            .or_insert(timestamp);
    }

    /// Register a revocation token directly (embedded revocation data).
    pub fn add_crl_token(&mut self, crl: CrlToken) {
        self.crls.entry(crl.id().to_string()).or_insert(crl);
    }

    /// Register a revocation token directly (embedded revocation data),
    /// pulling in its embedded responder certificates.
    pub fn add_ocsp_token(&mut self, ocsp: OcspToken) {
        self.register_ocsp(ocsp);
    }

    /// Resolve issuers and revocation data by fixed-point iteration.
    ///
    /// Each pass attempts to find an issuer for every unresolved
    /// certificate and revocation data for every non-trust-anchor
    /// certificate; it stops when a pass discovers nothing new. A pass that
    /// makes progress adds at least one token, so the pass count is bounded
    /// by the number of distinct tokens; the explicit cap below is a guard
    /// against bookkeeping errors, not a tuning knob.
    pub fn validate(&mut self) {
        let mut passes = 0usize;

        loop {
            let mut changed = false;

            changed |= self.resolve_issuers();
            changed |= self.collect_revocation_data();

            if !changed {
                break;
            }

            passes += 1;
            if passes > self.token_count() + 1 {
                warn!(
                    "validation context did not reach a fixed point after {passes} passes; \
                     continuing with the tokens resolved so far"
                );
                break;
            }
        }
    }

    fn token_count(&self) -> usize {
        self.certificates.len() + self.crls.len() + self.ocsps.len() + self.timestamps.len()
    }

    fn resolve_issuers(&mut self) -> bool {
        let mut changed = false;

        let ids: Vec<String> = self.certificates.keys().cloned().collect();

        for id in ids {
            if self.issuer_of.contains_key(&id) {
                continue;
            }

            let Some(cert) = self.certificates.get(&id) else {
                continue;
            };

            if self.is_trusted(cert) {
                self.trusted_ids.insert(id.clone());
            }

            if cert.is_self_signed() {
                // Chain building terminates here; a self-signed certificate
                // is its own issuer.
                self.issuer_of.insert(id.clone(), id.clone());
                self.orphan_certificate_ids.remove(&id);
                continue;
            }

            match self.find_issuer(cert) {
                Some(issuer) => {
                    let issuer_id = issuer.id().to_string();

                    if !self.certificates.contains_key(&issuer_id) {
                        self.certificates.insert(issuer_id.clone(), issuer);
                        changed = true;
                    }

                    self.issuer_of.insert(id.clone(), issuer_id);
                    self.orphan_certificate_ids.remove(&id);
                    changed = true;
                }
                None => {
                    // Not an error; surfaced downstream as a
                    // policy-evaluable fact.
                    self.orphan_certificate_ids.insert(id.clone());
                }
            }
        }

        changed
    }

    // Find an issuer among the processed certificates first, then the
    // configured sources, finally through AIA download.
    fn find_issuer(&self, cert: &CertificateToken) -> Option<CertificateToken> {
        let mut candidates: Vec<CertificateToken> = vec![];

        for candidate in self.certificates.values() {
            if cert.is_issued_by(candidate) {
                candidates.push(candidate.clone());
            }
        }

        if let Some(verifier) = self.verifier {
            for source in verifier.trusted_cert_sources() {
                for candidate in source.get_by_subject(cert.issuer_raw()) {
                    candidates.push(candidate.clone());
                }
            }

            if let Some(adjunct) = verifier.adjunct_cert_source() {
                for candidate in adjunct.get_by_subject(cert.issuer_raw()) {
                    candidates.push(candidate.clone());
                }
            }

            if let Some(signature_source) = verifier.signature_certificate_source() {
                for candidate in signature_source.get_by_subject(cert.issuer_raw()) {
                    candidates.push(candidate.clone());
                }
            }
        }

        // Only an issuer whose key actually verifies the signature counts.
        for candidate in &candidates {
            if cert.is_issued_by(candidate) && cert.is_signed_by(candidate) {
                return Some(candidate.clone());
            }
        }

        // Fall back to AIA download when configured. Network errors are
        // swallowed by the source; the certificate stays an orphan.
        if let Some(verifier) = self.verifier {
            if let Some(aia) = verifier.aia_source() {
                for candidate in aia.get_issuer_candidates(cert) {
                    if cert.is_signed_by(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }

        None
    }

    fn collect_revocation_data(&mut self) -> bool {
        let mut changed = false;

        let ids: Vec<String> = self.certificates.keys().cloned().collect();

        for id in ids {
            if self.revocation_checked.contains(&id) {
                continue;
            }

            let Some(cert) = self.certificates.get(&id).cloned() else {
                continue;
            };

            // Trust anchors and ocsp-no-check certificates are exempt.
            if self.trusted_ids.contains(&id)
                || cert.is_self_signed()
                || cert.is_id_pkix_ocsp_no_check()
            {
                self.revocation_checked.insert(id);
                continue;
            }

            let Some(issuer) = self
                .issuer_of
                .get(&id)
                .and_then(|iid| self.certificates.get(iid))
                .cloned()
            else {
                // Retry next pass; the issuer may still get resolved.
                continue;
            };

            let mut refs: Vec<RevocationRef> = vec![];

            if let Some(verifier) = self.verifier {
                if let Some(source) = verifier.signature_ocsp_source() {
                    for token in source.get_revocation_tokens(&cert, &issuer) {
                        refs.push(RevocationRef {
                            id: token.id().to_string(),
                            revocation_type: RevocationType::Ocsp,
                        });
                        if self.register_ocsp(token) {
                            changed = true;
                        }
                    }
                }

                if let Some(source) = verifier.signature_crl_source() {
                    for token in source.get_revocation_tokens(&cert, &issuer) {
                        refs.push(RevocationRef {
                            id: token.id().to_string(),
                            revocation_type: RevocationType::Crl,
                        });
                        if self.register_crl(token) {
                            changed = true;
                        }
                    }
                }

                if refs.is_empty() {
                    if let Some(source) = verifier.ocsp_source() {
                        for token in source.get_revocation_tokens(&cert, &issuer) {
                            refs.push(RevocationRef {
                                id: token.id().to_string(),
                                revocation_type: RevocationType::Ocsp,
                            });
                            if self.register_ocsp(token) {
                                changed = true;
                            }
                        }
                    }
                }

                if refs.is_empty() {
                    if let Some(source) = verifier.crl_source() {
                        for token in source.get_revocation_tokens(&cert, &issuer) {
                            refs.push(RevocationRef {
                                id: token.id().to_string(),
                                revocation_type: RevocationType::Crl,
                            });
                            if self.register_crl(token) {
                                changed = true;
                            }
                        }
                    }
                }
            }

            // Also consider revocation tokens already registered (embedded
            // in the signature or a timestamp).
            for ocsp in self.ocsps.values() {
                if ocsp.status_for(&cert, &issuer).is_some()
                    && !refs.iter().any(|r| r.id == ocsp.id())
                {
                    refs.push(RevocationRef {
                        id: ocsp.id().to_string(),
                        revocation_type: RevocationType::Ocsp,
                    });
                }
            }
            for crl in self.crls.values() {
                if crl.status_for(&cert).is_known() && !refs.iter().any(|r| r.id == crl.id()) {
                    refs.push(RevocationRef {
                        id: crl.id().to_string(),
                        revocation_type: RevocationType::Crl,
                    });
                }
            }

            if refs.is_empty() {
                self.revocation_unavailable_ids.insert(id.clone());
            } else {
                self.revocation_unavailable_ids.remove(&id);
                self.revocations_of.insert(id.clone(), refs);
            }

            self.revocation_checked.insert(id);
            changed = true;
        }

        changed
    }

    // Register an OCSP token and pull in its embedded responder
    // certificates for verification.
    fn register_ocsp(&mut self, token: OcspToken) -> bool {
        let mut changed = false;

        for cert_der in token.certificates() {
            if let Ok(cert) = CertificateToken::from_der(cert_der) {
                if !self.certificates.contains_key(cert.id()) {
                    self.certificates.insert(cert.id().to_string(), cert);
                    changed = true;
                }
            }
        }

        if !self.ocsps.contains_key(token.id()) {
            self.ocsps.insert(token.id().to_string(), token);
            changed = true;
        }

        changed
    }

    fn register_crl(&mut self, token: CrlToken) -> bool {
        if !self.crls.contains_key(token.id()) {
            self.crls.insert(token.id().to_string(), token);
            true
        } else {
            false
        }
    }

    fn is_trusted(&self, cert: &CertificateToken) -> bool {
        self.verifier
            .map(|v| v.is_trusted_id(cert.id()))
            .unwrap_or(false)
    }

    /// All certificates processed during the run.
    pub fn processed_certificates(&self) -> impl Iterator<Item = &CertificateToken> {
        self.certificates.values()
    }

    /// All CRLs processed during the run.
    pub fn processed_crls(&self) -> impl Iterator<Item = &CrlToken> {
        self.crls.values()
    }

    /// All OCSP responses processed during the run.
    pub fn processed_ocsps(&self) -> impl Iterator<Item = &OcspToken> {
        self.ocsps.values()
    }

    /// All timestamps processed during the run.
    pub fn processed_timestamps(&self) -> impl Iterator<Item = &TimestampToken> {
        self.timestamps.values()
    }

    /// Look up a processed certificate.
    pub fn certificate(&self, id: &str) -> Option<&CertificateToken> {
        self.certificates.get(id)
    }

    /// Id of the resolved issuer of `cert_id`, if any. A self-signed
    /// certificate is its own issuer.
    pub fn issuer_id_of(&self, cert_id: &str) -> Option<&str> {
        self.issuer_of.get(cert_id).map(|s| s.as_str())
    }

    /// The revocation tokens covering `cert_id`.
    pub fn revocations_of(&self, cert_id: &str) -> &[RevocationRef] {
        self.revocations_of
            .get(cert_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Ids of certificates whose issuer could not be resolved.
    pub fn orphan_certificate_ids(&self) -> impl Iterator<Item = &String> {
        self.orphan_certificate_ids.iter()
    }

    /// Ids of certificates for which no revocation data was found.
    pub fn revocation_unavailable_ids(&self) -> impl Iterator<Item = &String> {
        self.revocation_unavailable_ids.iter()
    }

    /// Return `true` if the certificate is a configured trust anchor.
    pub fn is_trusted_id(&self, cert_id: &str) -> bool {
        self.trusted_ids.contains(cert_id)
    }

    /// The certificate chain of `cert_id`, starting at the certificate
    /// itself and ending at a trust anchor, a self-signed certificate, or
    /// the last resolvable link.
    pub fn certificate_chain_of(&self, cert_id: &str) -> Vec<String> {
        let mut chain = vec![];
        let mut current = cert_id.to_string();
        let mut seen = BTreeSet::new();

        loop {
            if !seen.insert(current.clone()) {
                break;
            }
            chain.push(current.clone());

            if self.trusted_ids.contains(&current) {
                break;
            }

            match self.issuer_of.get(&current) {
                Some(issuer) if *issuer != current => current = issuer.clone(),
                _ => break,
            }
        }

        chain
    }

    /// The earliest proof of existence for `token_id`: the generation time
    /// of the earliest timestamp covering it, or the validation time when
    /// no timestamp does.
    pub fn poe_time(&self, token_id: &str) -> DateTime<Utc> {
        self.timestamps
            .values()
            .filter(|ts| {
                ts.timestamped_references()
                    .iter()
                    .any(|r| r.token_id == token_id)
            })
            .map(|ts| ts.gen_time())
            .min()
            .unwrap_or(self.validation_time)
    }

    /// The production time of the latest revocation known for `cert_id`.
    pub fn latest_revocation_production_time(&self, cert_id: &str) -> Option<DateTime<Utc>> {
        self.revocations_of(cert_id)
            .iter()
            .filter_map(|r| match r.revocation_type {
                RevocationType::Crl => self.crls.get(&r.id).map(|c| c.production_time()),
                RevocationType::Ocsp => self.ocsps.get(&r.id).map(|o| o.production_time()),
            })
            .max()
    }

    // ---- Alert-routed checks consumed at augmentation time ----

    /// Verify that every processed timestamp is cryptographically sound.
    ///
    /// Escalation is governed by the verifier's invalid-timestamp alert
    /// (default: hard failure).
    pub fn check_all_timestamps_valid(&self) -> Result<()> {
        let mut invalid = vec![];

        for ts in self.timestamps.values() {
            let signer_ok = self
                .certificates
                .values()
                .any(|cert| ts.signer_matches(cert) && ts.is_signed_by(cert));

            let imprint_ok =
                ts.is_message_imprint_data_found() && ts.is_message_imprint_data_intact();

            if !signer_ok || !imprint_ok {
                invalid.push(ts.id().to_string());
            }
        }

        if invalid.is_empty() {
            return Ok(());
        }

        let alert = self
            .verifier
            .map(|v| v.alert_on_invalid_timestamp())
            .unwrap_or(crate::alert::StatusAlert::Throw);

        alert.handle(TokenStatus::new("broken timestamp(s) detected", invalid))
    }

    /// Verify that revocation data was found for every certificate that
    /// requires it.
    ///
    /// Escalation is governed by the verifier's missing-revocation alert
    /// (default: hard failure).
    pub fn check_all_required_revocation_data_present(&self) -> Result<()> {
        if self.revocation_unavailable_ids.is_empty() {
            return Ok(());
        }

        let alert = self
            .verifier
            .map(|v| v.alert_on_missing_revocation_data())
            .unwrap_or(crate::alert::StatusAlert::Throw);

        alert.handle(TokenStatus::new(
            "revocation data is missing for certificate(s)",
            self.revocation_unavailable_ids.iter().cloned().collect(),
        ))
    }

    /// Verify that no processed certificate is reported revoked.
    ///
    /// Escalation is governed by the verifier's revoked-certificate alert
    /// (default: hard failure).
    pub fn check_certificates_not_revoked(&self) -> Result<()> {
        let mut revoked = vec![];

        for (cert_id, refs) in &self.revocations_of {
            let Some(cert) = self.certificates.get(cert_id) else {
                continue;
            };
            let issuer = self
                .issuer_of
                .get(cert_id)
                .and_then(|iid| self.certificates.get(iid));

            for r in refs {
                let status = match r.revocation_type {
                    RevocationType::Crl => {
                        self.crls.get(&r.id).map(|crl| crl.status_for(cert))
                    }
                    RevocationType::Ocsp => issuer.and_then(|issuer| {
                        self.ocsps
                            .get(&r.id)
                            .and_then(|ocsp| ocsp.status_for(cert, issuer))
                            .map(|s| s.status)
                    }),
                };

                if let Some(RevocationStatus::Revoked { .. }) = status {
                    revoked.push(cert_id.clone());
                    break;
                }
            }
        }

        if revoked.is_empty() {
            return Ok(());
        }

        let alert = self
            .verifier
            .map(|v| v.alert_on_revoked_certificate())
            .unwrap_or(crate::alert::StatusAlert::Throw);

        alert.handle(TokenStatus::new("revoked certificate(s) detected", revoked))
    }

    /// Verify that every proof of existence is covered by revocation data
    /// produced after it.
    ///
    /// Escalation is governed by the verifier's uncovered-POE alert
    /// (default: warning).
    pub fn check_all_poe_covered_by_revocation_data(&self) -> Result<()> {
        let mut uncovered = vec![];

        for ts in self.timestamps.values() {
            let covered = self
                .crls
                .values()
                .map(|c| c.production_time())
                .chain(self.ocsps.values().map(|o| o.production_time()))
                .any(|production| production >= ts.gen_time());

            if !covered {
                uncovered.push(ts.id().to_string());
            }
        }

        if uncovered.is_empty() {
            return Ok(());
        }

        let alert = self
            .verifier
            .map(|v| v.alert_on_uncovered_poe())
            .unwrap_or(crate::alert::StatusAlert::LogWarn);

        alert.handle(TokenStatus::new(
            "POE(s) not covered by revocation data",
            uncovered,
        ))
    }

    /// Verify that at least one revocation token was produced after the
    /// best signature time.
    ///
    /// Escalation is governed by the verifier's
    /// no-revocation-after-best-signature-time alert (default: warning).
    pub fn check_at_least_one_revocation_after_best_signature_time(
        &self,
        best_signature_time: DateTime<Utc>,
    ) -> Result<()> {
        let found = self
            .crls
            .values()
            .map(|c| c.production_time())
            .chain(self.ocsps.values().map(|o| o.production_time()))
            .any(|production| production > best_signature_time);

        if found {
            return Ok(());
        }

        let alert = self
            .verifier
            .map(|v| v.alert_on_no_revocation_after_best_signature_time())
            .unwrap_or(crate::alert::StatusAlert::LogWarn);

        alert.handle(TokenStatus::new(
            "no revocation data produced after the best signature time",
            vec![],
        ))
    }
}
