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

//! The structured validation outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    diagnostic::DiagnosticData,
    format::SignatureForm,
    process::{BbbResult, Indication, SubIndication},
    signature::SignatureScope,
    Error, Result,
};

/// The complete outcome of one validation run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reports {
    /// The frozen evidence snapshot the verdicts were derived from.
    pub diagnostic_data: DiagnosticData,

    /// Per-check detail for every signature and timestamp.
    pub detailed_report: DetailedReport,

    /// The per-signature verdicts.
    pub simple_report: SimpleReport,
}

impl Reports {
    /// Render the simple report as JSON.
    pub fn simple_report_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.simple_report)
            .map_err(|e| Error::ReportSerialization(e.to_string()))
    }

    /// Render the detailed report as JSON.
    pub fn detailed_report_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.detailed_report)
            .map_err(|e| Error::ReportSerialization(e.to_string()))
    }

    /// Render the diagnostic data as JSON.
    pub fn diagnostic_data_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.diagnostic_data)
            .map_err(|e| Error::ReportSerialization(e.to_string()))
    }
}

/// Per-check detail for every signature and timestamp of the run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DetailedReport {
    /// One block per signature, counter-signatures included.
    pub signatures: Vec<SignatureValidationBlock>,

    /// Building blocks of timestamps not attached to any signature.
    pub detached_timestamps: Vec<BbbResult>,
}

/// The detailed outcome of one signature.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SignatureValidationBlock {
    /// Id of the signature.
    pub signature_id: String,

    /// Basic building blocks of the signature.
    pub bbb: BbbResult,

    /// Basic building blocks of each attached timestamp.
    pub timestamp_bbbs: Vec<BbbResult>,
}

/// The per-signature verdicts of the run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimpleReport {
    /// The control time of the run.
    pub validation_time: DateTime<Utc>,

    /// Name of the validated document, if known.
    pub document_name: Option<String>,

    /// One entry per signature.
    pub signatures: Vec<SimpleSignatureReport>,
}

impl SimpleReport {
    /// The verdict for a signature id, if present.
    pub fn indication_for(&self, signature_id: &str) -> Option<Indication> {
        self.signatures
            .iter()
            .find(|s| s.id == signature_id)
            .map(|s| s.indication)
    }
}

/// Verdict summary of one signature.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimpleSignatureReport {
    /// Id of the signature.
    pub id: String,

    /// The signature family.
    pub signature_format: SignatureForm,

    /// Subject of the signing certificate, if identified.
    pub signed_by: Option<String>,

    /// The signing time claimed inside the signature.
    pub claimed_signing_time: Option<DateTime<Utc>>,

    /// The earliest proven time of existence of the signature.
    pub best_signature_time: DateTime<Utc>,

    /// The verdict.
    pub indication: Indication,

    /// Refinement of a non-passed verdict.
    pub sub_indication: Option<SubIndication>,

    /// Messages of concluding failures.
    pub errors: Vec<String>,

    /// Messages of warn-level failures.
    pub warnings: Vec<String>,

    /// Messages of inform-level failures.
    pub infos: Vec<String>,

    /// What the signature covers.
    pub scopes: Vec<SignatureScope>,

    /// Set when the signature is a counter-signature of another signature.
    pub counter_signature_of: Option<String>,
}
