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

//! Revocation acceptance checking.
//!
//! Decides whether a revocation token may be trusted as evidence for a
//! certificate's status at a control time. The checker validates the
//! revocation token itself, then walks the token's own signer chain and
//! recursively validates the revocation data of every non-trusted
//! certificate in it. A shared list of already-visited token ids bounds the
//! recursion: a token visited twice is treated as already satisfied rather
//! than re-validated, so the process terminates on any cyclic signer graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    diagnostic::{
        CertificateDiagnostic, CertificateRevocationDiagnostic, DiagnosticData,
        RevocationDiagnostic,
    },
    process::{Chain, ChainResult, Context, Indication, SubContext, SubIndication, ValidationPolicy},
    RevocationType,
};

/// Result of one revocation acceptance check, nested results included.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RacResult {
    /// Id of the checked revocation token.
    pub id: String,

    /// Production date of the checked revocation token.
    pub revocation_production_date: DateTime<Utc>,

    /// The executed chain.
    pub chain: ChainResult,

    /// Results of the recursive checks over the token's signer chain.
    pub nested: Vec<RacResult>,
}

impl RacResult {
    /// Return `true` if the revocation token was accepted.
    pub fn is_valid(&self) -> bool {
        self.chain.is_passed()
    }
}

/// Checks if a revocation token is acceptable and can be used.
pub struct RevocationAcceptanceChecker<'a> {
    diag: &'a DiagnosticData,
    certificate: &'a CertificateDiagnostic,
    relation: &'a CertificateRevocationDiagnostic,
    revocation: &'a RevocationDiagnostic,
    control_time: DateTime<Utc>,
    policy: &'a ValidationPolicy,
}

impl<'a> RevocationAcceptanceChecker<'a> {
    /// Create a checker for `revocation` as evidence about `certificate`.
    pub fn new(
        diag: &'a DiagnosticData,
        certificate: &'a CertificateDiagnostic,
        relation: &'a CertificateRevocationDiagnostic,
        revocation: &'a RevocationDiagnostic,
        control_time: DateTime<Utc>,
        policy: &'a ValidationPolicy,
    ) -> Self {
        RevocationAcceptanceChecker {
            diag,
            certificate,
            relation,
            revocation,
            control_time,
            policy,
        }
    }

    /// Execute the check with a fresh visited-token list.
    pub fn execute(self) -> RacResult {
        let mut validated_tokens = vec![];
        self.execute_with(&mut validated_tokens)
    }

    /// Execute the check, sharing `validated_tokens` across the recursion.
    pub fn execute_with(self, validated_tokens: &mut Vec<String>) -> RacResult {
        let mut chain = Chain::new("RAC");
        let mut nested = vec![];

        mark_validated(validated_tokens, &self.revocation.id);

        chain.check(
            "revocation data known",
            self.relation.status.is_known(),
            self.policy.unknown_status,
            Indication::Indeterminate,
            Some(SubIndication::TryLater),
            "the revocation token does not determine the certificate status",
        );

        // certHash extension can be present in an OCSP response. If present,
        // a digest match indicates the OCSP responder knows the certificate
        // as we have it, and so also its revocation state.
        if self.revocation.revocation_type == RevocationType::Ocsp {
            chain.check(
                "certHash extension present",
                self.revocation.cert_hash_extension_present,
                self.policy.ocsp_cert_hash_present,
                Indication::Indeterminate,
                Some(SubIndication::TryLater),
                "the OCSP response does not carry the certHash extension",
            );

            if self.revocation.cert_hash_extension_present {
                chain.check(
                    "certHash matches the certificate",
                    self.relation.cert_hash_ok == Some(true),
                    self.policy.ocsp_cert_hash_match,
                    Indication::Failed,
                    Some(SubIndication::FormatFailure),
                    "the certHash of the OCSP response does not match the certificate",
                );
            }

            chain.check(
                "OCSP is not self-issued",
                self.revocation.signing_certificate_id.as_deref() != Some(&self.certificate.id),
                self.policy.self_issued_ocsp,
                Indication::Indeterminate,
                Some(SubIndication::TryLater),
                "the OCSP response is signed with the certificate it covers",
            );
        }

        chain.check(
            "revocation data consistent",
            self.is_revocation_consistent(),
            self.policy.revocation_consistent,
            Indication::Indeterminate,
            Some(SubIndication::TryLater),
            "the revocation token is not consistent with the covered certificate",
        );

        chain.check(
            "revocation signature intact",
            self.revocation.signature_intact,
            self.policy.signature_intact_constraint(Context::Revocation),
            Indication::Failed,
            Some(SubIndication::SigCryptoFailure),
            "the revocation token signature does not verify",
        );

        chain.check(
            "prospective certificate chain",
            self.chain_reaches_trust_anchor(),
            self.policy.prospective_certificate_chain_constraint(Context::Revocation),
            Indication::Indeterminate,
            Some(SubIndication::NoCertificateChainFound),
            "no prospective chain to a trust anchor for the revocation signer",
        );

        for chain_cert_id in &self.revocation.certificate_chain_ids {
            let Some(chain_cert) = self.diag.certificate_by_id(chain_cert_id) else {
                continue;
            };

            if chain_cert.trusted {
                break;
            }

            if is_token_validated(validated_tokens, chain_cert_id) {
                continue;
            }
            mark_validated(validated_tokens, chain_cert_id);

            chain.check(
                "chain certificate intact",
                chain_cert.signature_intact,
                self.policy.signature_intact_constraint(Context::Certificate),
                Indication::Failed,
                Some(SubIndication::SigCryptoFailure),
                &format!("the signature of chain certificate {chain_cert_id} does not verify"),
            );

            if chain_cert.id_pkix_ocsp_no_check {
                // Revocation checks are waived for the responder.
                chain.check(
                    "id-pkix-ocsp-nocheck",
                    true,
                    crate::process::Level::Warn,
                    Indication::Indeterminate,
                    None,
                    "the certificate carries id-pkix-ocsp-nocheck",
                );
                continue;
            }

            chain.check(
                "revocation data present for chain certificate",
                !chain_cert.revocations.is_empty(),
                self.policy.revocation_data_available_constraint(
                    Context::Revocation,
                    self.sub_context_of(chain_cert_id),
                ),
                Indication::Indeterminate,
                Some(SubIndication::TryLater),
                &format!("no revocation data for chain certificate {chain_cert_id}"),
            );

            let mut latest: Option<&RevocationDiagnostic> = None;

            for (relation, token) in self.diag.certificate_revocations(chain_cert_id) {
                if is_token_validated(validated_tokens, &token.id) {
                    // Already seen earlier in the recursion; counts as
                    // satisfied without re-validation.
                    if latest.is_none() {
                        latest = Some(token);
                    }
                    continue;
                }

                let rac = RevocationAcceptanceChecker::new(
                    self.diag,
                    chain_cert,
                    relation,
                    token,
                    self.control_time,
                    self.policy,
                );
                let result = rac.execute_with(validated_tokens);
                let valid = result.is_valid();

                chain.check(
                    "revocation acceptance result",
                    valid,
                    crate::process::Level::Warn,
                    Indication::Indeterminate,
                    Some(SubIndication::TryLater),
                    &format!("the revocation token {} was not accepted", token.id),
                );

                nested.push(result);

                if valid && is_later_than(token, latest) {
                    latest = Some(token);
                }
            }

            chain.check(
                "acceptable revocation data available",
                latest.is_some(),
                self.policy.revocation_data_available_constraint(
                    Context::Revocation,
                    self.sub_context_of(chain_cert_id),
                ),
                Indication::Indeterminate,
                Some(SubIndication::TryLater),
                &format!("no acceptable revocation data for chain certificate {chain_cert_id}"),
            );
        }

        RacResult {
            id: self.revocation.id.clone(),
            revocation_production_date: self.revocation.production_date,
            chain: chain.conclude(),
            nested,
        }
    }

    // The signing certificate of the revocation token sits in SigningCert
    // position; every other chain certificate is a CA.
    fn sub_context_of(&self, chain_cert_id: &str) -> SubContext {
        if self.revocation.signing_certificate_id.as_deref() == Some(chain_cert_id) {
            SubContext::SigningCert
        } else {
            SubContext::CaCertificate
        }
    }

    // The revocation token must have been produced while the certificate
    // was valid; otherwise it cannot speak about this certificate.
    fn is_revocation_consistent(&self) -> bool {
        let Some(this_update) = self.relation.this_update else {
            return false;
        };

        this_update >= self.certificate.not_before && this_update <= self.certificate.not_after
    }

    fn chain_reaches_trust_anchor(&self) -> bool {
        self.revocation
            .certificate_chain_ids
            .iter()
            .any(|id| self.diag.is_trusted(id))
    }
}

// Among multiple acceptable revocations the one with the latest production
// date wins; on equal dates the greater token id is chosen so the outcome
// is deterministic.
fn is_later_than(candidate: &RevocationDiagnostic, current: Option<&RevocationDiagnostic>) -> bool {
    match current {
        None => true,
        Some(current) => {
            candidate.production_date > current.production_date
                || (candidate.production_date == current.production_date
                    && candidate.id > current.id)
        }
    }
}

fn is_token_validated(validated_tokens: &[String], id: &str) -> bool {
    validated_tokens.iter().any(|t| t == id)
}

fn mark_validated(validated_tokens: &mut Vec<String>, id: &str) {
    if !is_token_validated(validated_tokens, id) {
        validated_tokens.push(id.to_string());
    }
}
