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

//! Runs the policy engine over a frozen diagnostic data snapshot.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::{
    diagnostic::{DiagnosticData, SignatureDiagnostic},
    process::{execute_signature_bbb, execute_timestamp_bbb, BbbResult, ValidationPolicy},
    reports::{
        DetailedReport, Reports, SignatureValidationBlock, SimpleReport, SimpleSignatureReport,
    },
};

/// Executes the validation policy against diagnostic data and renders the
/// reports.
pub struct ValidationProcessExecutor<'a> {
    diagnostic_data: DiagnosticData,
    policy: &'a ValidationPolicy,
}

impl<'a> ValidationProcessExecutor<'a> {
    /// Create an executor over a frozen snapshot.
    pub fn new(diagnostic_data: DiagnosticData, policy: &'a ValidationPolicy) -> Self {
        ValidationProcessExecutor {
            diagnostic_data,
            policy,
        }
    }

    /// Run every building block and produce the reports.
    pub fn execute(self) -> Reports {
        let diag = &self.diagnostic_data;
        let control_time = diag.validation_date;

        let mut signature_blocks = vec![];
        let mut simple_signatures = vec![];
        let mut attached_timestamp_ids: BTreeSet<String> = BTreeSet::new();

        for signature in &diag.signatures {
            let bbb = execute_signature_bbb(diag, signature, self.policy, control_time);

            let mut timestamp_bbbs = vec![];
            for ts_id in &signature.timestamp_ids {
                attached_timestamp_ids.insert(ts_id.clone());

                if let Some(ts) = diag.timestamp_by_id(ts_id) {
                    timestamp_bbbs.push(execute_timestamp_bbb(
                        diag,
                        ts,
                        self.policy,
                        control_time,
                    ));
                }
            }

            let best_signature_time =
                best_signature_time(diag, signature, &timestamp_bbbs, control_time);

            simple_signatures.push(SimpleSignatureReport {
                id: signature.id.clone(),
                signature_format: signature.signature_format,
                signed_by: signature
                    .signing_certificate_id
                    .as_deref()
                    .and_then(|id| diag.certificate_by_id(id))
                    .map(|c| c.subject.clone()),
                claimed_signing_time: signature.claimed_signing_time,
                best_signature_time,
                indication: bbb.conclusion.indication,
                sub_indication: bbb.conclusion.sub_indication,
                errors: bbb.conclusion.errors.clone(),
                warnings: bbb.conclusion.warnings.clone(),
                infos: bbb.conclusion.infos.clone(),
                scopes: signature.scopes.clone(),
                counter_signature_of: signature.parent_id.clone(),
            });

            signature_blocks.push(SignatureValidationBlock {
                signature_id: signature.id.clone(),
                bbb,
                timestamp_bbbs,
            });
        }

        // Timestamps not attached to any signature (detached ASiC
        // timestamps) get their own building blocks.
        let mut detached_timestamps = vec![];
        for ts in &diag.used_timestamps {
            if !attached_timestamp_ids.contains(&ts.id) {
                detached_timestamps.push(execute_timestamp_bbb(
                    diag,
                    ts,
                    self.policy,
                    control_time,
                ));
            }
        }

        let simple_report = SimpleReport {
            validation_time: control_time,
            document_name: diag.document_name.clone(),
            signatures: simple_signatures,
        };

        let detailed_report = DetailedReport {
            signatures: signature_blocks,
            detached_timestamps,
        };

        Reports {
            diagnostic_data: self.diagnostic_data,
            detailed_report,
            simple_report,
        }
    }
}

// The earliest generation time among sound signature timestamps, or the
// control time when none qualifies.
fn best_signature_time(
    diag: &DiagnosticData,
    signature: &SignatureDiagnostic,
    timestamp_bbbs: &[BbbResult],
    control_time: DateTime<Utc>,
) -> DateTime<Utc> {
    signature
        .timestamp_ids
        .iter()
        .filter_map(|id| diag.timestamp_by_id(id))
        .filter(|ts| {
            ts.timestamp_type == crate::TimestampType::SignatureTimestamp
                && ts.signature_intact
                && ts.message_imprint_data_intact
        })
        .filter(|ts| {
            timestamp_bbbs
                .iter()
                .find(|bbb| bbb.token_id == ts.id)
                .map(|bbb| bbb.is_passed())
                .unwrap_or(false)
        })
        .map(|ts| ts.production_time)
        .min()
        .unwrap_or(control_time)
}
