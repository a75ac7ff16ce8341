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

//! Basic building blocks (ETSI EN 319 102-1 §5.2).
//!
//! Every signature and every timestamp goes through the same sequence of
//! sub-processes: format checking, identification of the signing
//! certificate, cryptographic verification, signature acceptance
//! validation, and X.509 certificate validation. Each sub-process is a
//! [`Chain`]; the block's conclusion is the first non-passed chain
//! conclusion.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    diagnostic::{CertificateDiagnostic, DiagnosticData, SignatureDiagnostic, TimestampDiagnostic},
    process::{
        check_cryptographic_constraints, Chain, ChainResult, Conclusion, Context,
        CryptographicInput, Indication, Level, RacResult, RevocationAcceptanceChecker,
        SubContext, SubIndication, ValidationPolicy,
    },
    RevocationStatus,
};

/// The token kind a [`BbbResult`] belongs to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BbbTokenType {
    /// A document signature or counter-signature.
    Signature,

    /// A time-stamp token.
    Timestamp,
}

/// Executed basic building blocks of one token.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BbbResult {
    /// Id of the validated token.
    pub token_id: String,

    /// Signature or timestamp.
    pub token_type: BbbTokenType,

    /// Format checking.
    pub fc: ChainResult,

    /// Identification of the signing certificate.
    pub isc: ChainResult,

    /// Cryptographic verification.
    pub cv: ChainResult,

    /// Signature acceptance validation (cryptographic constraints).
    pub sav: ChainResult,

    /// X.509 certificate validation.
    pub xcv: ChainResult,

    /// Revocation acceptance results produced under XCV.
    pub rac_results: Vec<RacResult>,

    /// The block conclusion: the first non-passed sub-process conclusion.
    pub conclusion: Conclusion,
}

impl BbbResult {
    fn conclude(
        token_id: String,
        token_type: BbbTokenType,
        fc: ChainResult,
        isc: ChainResult,
        cv: ChainResult,
        sav: ChainResult,
        xcv: ChainResult,
        rac_results: Vec<RacResult>,
    ) -> Self {
        let conclusion = [&fc, &isc, &cv, &sav, &xcv]
            .iter()
            .map(|chain| &chain.conclusion)
            .find(|c| !c.is_passed())
            .cloned()
            .unwrap_or_else(Conclusion::passed);

        BbbResult {
            token_id,
            token_type,
            fc,
            isc,
            cv,
            sav,
            xcv,
            rac_results,
            conclusion,
        }
    }

    /// Return `true` if every sub-process passed.
    pub fn is_passed(&self) -> bool {
        self.conclusion.is_passed()
    }
}

/// Execute the basic building blocks of one signature.
pub fn execute_signature_bbb(
    diag: &DiagnosticData,
    signature: &SignatureDiagnostic,
    policy: &ValidationPolicy,
    control_time: DateTime<Utc>,
) -> BbbResult {
    // FC: the format handler recognized and decoded the signature; a
    // malformed encoding never reaches the diagnostic data, so the check
    // records the recognized format.
    let mut fc = Chain::new("FC");
    fc.check(
        "signature format recognized",
        true,
        Level::Fail,
        Indication::Failed,
        Some(SubIndication::FormatFailure),
        "the signature format is not supported",
    );

    let mut isc = Chain::new("ISC");
    isc.check(
        "signing certificate identified",
        signature.signing_certificate_found && signature.signing_certificate_id.is_some(),
        policy.signing_certificate_recognition,
        Indication::Indeterminate,
        Some(SubIndication::NoSigningCertificateFound),
        "no signing certificate could be identified",
    );

    let mut cv = Chain::new("CV");
    cv.check(
        "signature value intact",
        signature.signature_intact,
        policy.signature_intact_constraint(signature_context(signature)),
        Indication::Failed,
        Some(SubIndication::SigCryptoFailure),
        "the signature value does not verify",
    );

    let mut sav = Chain::new("SAV");
    check_cryptographic_constraints(
        &mut sav,
        &CryptographicInput {
            digest_algorithm: signature.digest_algorithm,
            encryption_algorithm: signature.encryption_algorithm,
            key_length_bits: signature.key_length_bits,
        },
        &policy.cryptographic,
        control_time,
    );
    check_timestamp_coherence(&mut sav, diag, signature, policy);

    let (xcv, rac_results) = execute_xcv(
        diag,
        signature.signing_certificate_id.as_deref(),
        &signature.certificate_chain_ids,
        policy,
        control_time,
    );

    BbbResult::conclude(
        signature.id.clone(),
        BbbTokenType::Signature,
        fc.conclude(),
        isc.conclude(),
        cv.conclude(),
        sav.conclude(),
        xcv,
        rac_results,
    )
}

/// Execute the basic building blocks of one timestamp.
pub fn execute_timestamp_bbb(
    diag: &DiagnosticData,
    timestamp: &TimestampDiagnostic,
    policy: &ValidationPolicy,
    control_time: DateTime<Utc>,
) -> BbbResult {
    let mut fc = Chain::new("FC");
    fc.check(
        "timestamp format recognized",
        true,
        Level::Fail,
        Indication::Failed,
        Some(SubIndication::FormatFailure),
        "the timestamp format is not supported",
    );

    let mut isc = Chain::new("ISC");
    isc.check(
        "signing certificate identified",
        timestamp.signing_certificate_id.is_some(),
        policy.signing_certificate_recognition,
        Indication::Indeterminate,
        Some(SubIndication::NoSigningCertificateFound),
        "no signing certificate could be identified for the timestamp",
    );

    let mut cv = Chain::new("CV");

    // "Found but broken" and "not found" stay distinct conclusions.
    cv.check(
        "message imprint data found",
        timestamp.message_imprint_data_found,
        policy.message_imprint_intact,
        Indication::Indeterminate,
        Some(SubIndication::SignedDataNotFound),
        "the timestamped data could not be reconstructed",
    );

    cv.check(
        "message imprint data intact",
        timestamp.message_imprint_data_intact,
        policy.message_imprint_intact,
        Indication::Failed,
        Some(SubIndication::HashFailure),
        "the message imprint does not match the timestamped data",
    );

    cv.check(
        "timestamp signature intact",
        timestamp.signature_intact,
        policy.signature_intact_constraint(Context::Timestamp),
        Indication::Failed,
        Some(SubIndication::SigCryptoFailure),
        "the timestamp signature does not verify",
    );

    let mut sav = Chain::new("SAV");
    let key_length_bits = timestamp
        .signing_certificate_id
        .as_deref()
        .and_then(|id| diag.certificate_by_id(id))
        .map(|c| c.key_length_bits)
        .unwrap_or(0);

    check_cryptographic_constraints(
        &mut sav,
        &CryptographicInput {
            digest_algorithm: timestamp.digest_algorithm,
            encryption_algorithm: timestamp
                .signing_certificate_id
                .as_deref()
                .and_then(|id| diag.certificate_by_id(id))
                .and_then(|c| c.encryption_algorithm),
            key_length_bits,
        },
        &policy.cryptographic,
        control_time,
    );

    let (xcv, rac_results) = execute_xcv(
        diag,
        timestamp.signing_certificate_id.as_deref(),
        &timestamp.certificate_chain_ids,
        policy,
        control_time,
    );

    BbbResult::conclude(
        timestamp.id.clone(),
        BbbTokenType::Timestamp,
        fc.conclude(),
        isc.conclude(),
        cv.conclude(),
        sav.conclude(),
        xcv,
        rac_results,
    )
}

// X.509 certificate validation: prospective chain, then per-certificate
// validity, cryptographic soundness, and revocation acceptance.
fn execute_xcv(
    diag: &DiagnosticData,
    signing_certificate_id: Option<&str>,
    certificate_chain_ids: &[String],
    policy: &ValidationPolicy,
    control_time: DateTime<Utc>,
) -> (ChainResult, Vec<RacResult>) {
    let mut xcv = Chain::new("XCV");
    let mut rac_results = vec![];

    let Some(signing_certificate_id) = signing_certificate_id else {
        xcv.check(
            "prospective certificate chain",
            false,
            policy.prospective_certificate_chain_constraint(Context::Certificate),
            Indication::Indeterminate,
            Some(SubIndication::NoCertificateChainFound),
            "no signing certificate, hence no certificate chain",
        );
        return (xcv.conclude(), rac_results);
    };

    let reaches_anchor = certificate_chain_ids.iter().any(|id| diag.is_trusted(id));

    xcv.check(
        "prospective certificate chain",
        reaches_anchor,
        policy.prospective_certificate_chain_constraint(Context::Certificate),
        Indication::Indeterminate,
        Some(SubIndication::NoCertificateChainFound),
        "the certificate chain does not reach a trust anchor",
    );

    let mut validated_tokens: Vec<String> = vec![];

    for chain_cert_id in certificate_chain_ids {
        let Some(chain_cert) = diag.certificate_by_id(chain_cert_id) else {
            continue;
        };

        if chain_cert.trusted {
            break;
        }

        let is_signing_cert = chain_cert_id == signing_certificate_id;

        xcv.check(
            "certificate validity range",
            control_time >= chain_cert.not_before && control_time <= chain_cert.not_after,
            policy.certificate_validity_range,
            Indication::Indeterminate,
            Some(SubIndication::OutOfBoundsNoPoe),
            &format!("certificate {chain_cert_id} is outside its validity range at the control time"),
        );

        xcv.check(
            "certificate signature intact",
            chain_cert.signature_intact,
            policy.signature_intact_constraint(Context::Certificate),
            Indication::Indeterminate,
            Some(SubIndication::CertificateChainGeneralFailure),
            &format!("the signature of certificate {chain_cert_id} does not verify"),
        );

        check_cryptographic_constraints(
            &mut xcv,
            &CryptographicInput {
                digest_algorithm: chain_cert.digest_algorithm,
                encryption_algorithm: chain_cert.encryption_algorithm,
                key_length_bits: chain_cert.key_length_bits,
            },
            &policy.cryptographic,
            control_time,
        );

        if chain_cert.id_pkix_ocsp_no_check {
            continue;
        }

        xcv.check(
            "revocation data available",
            !chain_cert.revocations.is_empty(),
            policy.revocation_data_available_constraint(
                Context::Certificate,
                sub_context(chain_cert_id, signing_certificate_id),
            ),
            Indication::Indeterminate,
            Some(SubIndication::TryLater),
            &format!("no revocation data for certificate {chain_cert_id}"),
        );

        let accepted = run_racs(
            diag,
            chain_cert,
            policy,
            control_time,
            &mut validated_tokens,
            &mut rac_results,
        );

        if !chain_cert.revocations.is_empty() {
            xcv.check(
                "acceptable revocation data available",
                accepted.is_some(),
                policy.revocation_data_available_constraint(
                    Context::Certificate,
                    sub_context(chain_cert_id, signing_certificate_id),
                ),
                Indication::Indeterminate,
                Some(SubIndication::TryLater),
                &format!("no acceptable revocation data for certificate {chain_cert_id}"),
            );
        }

        if let Some(latest) = accepted {
            let (revoked_sub, unknown_sub) = if is_signing_cert {
                (SubIndication::RevokedNoPoe, SubIndication::TryLater)
            } else {
                (SubIndication::RevokedCaNoPoe, SubIndication::TryLater)
            };

            xcv.check(
                "certificate not revoked",
                !latest.status.is_revoked(),
                policy.certificate_not_revoked,
                Indication::Indeterminate,
                Some(revoked_sub),
                &format!("certificate {chain_cert_id} is revoked"),
            );

            xcv.check(
                "revocation status known",
                latest.status.is_known(),
                policy.unknown_status,
                Indication::Indeterminate,
                Some(unknown_sub),
                &format!("the revocation status of certificate {chain_cert_id} is unknown"),
            );

            if policy.revocation_freshness != Level::Ignore {
                let fresh = latest
                    .this_update
                    .map(|this_update| {
                        control_time - this_update
                            <= Duration::seconds(policy.revocation_freshness_seconds)
                    })
                    .unwrap_or(false);

                xcv.check(
                    "revocation data fresh",
                    fresh,
                    policy.revocation_freshness,
                    Indication::Indeterminate,
                    Some(SubIndication::TryLater),
                    &format!("the revocation data for certificate {chain_cert_id} is not fresh"),
                );
            } else {
                xcv.check(
                    "revocation data fresh",
                    true,
                    Level::Ignore,
                    Indication::Indeterminate,
                    None,
                    "",
                );
            }
        }
    }

    (xcv.conclude(), rac_results)
}

// Run the revocation acceptance checker over every revocation of the
// certificate and return the freshest accepted relation.
fn run_racs<'d>(
    diag: &'d DiagnosticData,
    cert: &'d CertificateDiagnostic,
    policy: &ValidationPolicy,
    control_time: DateTime<Utc>,
    validated_tokens: &mut Vec<String>,
    rac_results: &mut Vec<RacResult>,
) -> Option<AcceptedRevocation> {
    let mut latest: Option<AcceptedRevocation> = None;

    for (relation, token) in diag.certificate_revocations(&cert.id) {
        let rac = RevocationAcceptanceChecker::new(
            diag,
            cert,
            relation,
            token,
            control_time,
            policy,
        );
        let result = rac.execute_with(validated_tokens);
        let valid = result.is_valid();
        let production = result.revocation_production_date;
        let id = result.id.clone();

        rac_results.push(result);

        if !valid {
            continue;
        }

        let replace = match &latest {
            None => true,
            Some(current) => {
                production > current.production_date
                    || (production == current.production_date && id > current.revocation_id)
            }
        };

        if replace {
            latest = Some(AcceptedRevocation {
                revocation_id: id,
                production_date: production,
                status: relation.status.clone(),
                this_update: relation.this_update,
            });
        }
    }

    latest
}

struct AcceptedRevocation {
    revocation_id: String,
    production_date: DateTime<Utc>,
    status: RevocationStatus,
    this_update: Option<DateTime<Utc>>,
}

fn signature_context(signature: &SignatureDiagnostic) -> Context {
    if signature.parent_id.is_some() {
        Context::CounterSignature
    } else {
        Context::Signature
    }
}

fn sub_context(chain_cert_id: &str, signing_certificate_id: &str) -> SubContext {
    if chain_cert_id == signing_certificate_id {
        SubContext::SigningCert
    } else {
        SubContext::CaCertificate
    }
}

// Content timestamps must predate signature timestamps.
fn check_timestamp_coherence(
    sav: &mut Chain,
    diag: &DiagnosticData,
    signature: &SignatureDiagnostic,
    policy: &ValidationPolicy,
) {
    let timestamps: Vec<&TimestampDiagnostic> = signature
        .timestamp_ids
        .iter()
        .filter_map(|id| diag.timestamp_by_id(id))
        .collect();

    let latest_content = timestamps
        .iter()
        .filter(|t| t.timestamp_type == crate::TimestampType::ContentTimestamp)
        .map(|t| t.production_time)
        .max();

    let earliest_signature = timestamps
        .iter()
        .filter(|t| t.timestamp_type == crate::TimestampType::SignatureTimestamp)
        .map(|t| t.production_time)
        .min();

    if let (Some(content), Some(signature_ts)) = (latest_content, earliest_signature) {
        sav.check(
            "timestamp order coherent",
            content <= signature_ts,
            policy.timestamp_coherence,
            Indication::Indeterminate,
            Some(SubIndication::TimestampOrderFailure),
            "a content timestamp postdates a signature timestamp",
        );
    }
}
