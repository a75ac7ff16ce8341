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

use thiserror::Error;

/// `Error` enumerates the errors this crate reports.
///
/// Structural failures abort a validation run with one of these; evidence
/// gaps discovered during validation never do — they are recorded in the
/// diagnostic data and judged by the policy engine instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No registered format handler recognizes the document.
    #[error("document format not recognized/handled")]
    UnsupportedDocument,

    /// The document was recognized, but a signature inside it could not be
    /// decoded.
    #[error("malformed signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    /// A counter-signature cannot be created over the requested signature.
    #[error("the counter signature is not possible! Reason : a signature with a filename '{0}' is covered by another manifest")]
    CounterSignatureCoveredByManifest(String),

    /// A configured status alert escalated an evidence gap to a failure.
    #[error("alert: {0}")]
    AlertFailure(String),

    /// The validator was not configured correctly.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Error while decoding a certificate token.
    #[error(transparent)]
    Certificate(#[from] ades_crypto::certificate::CertificateError),

    /// Error while decoding a revocation token.
    #[error(transparent)]
    Revocation(#[from] ades_crypto::revocation::RevocationError),

    /// Error while decoding a time-stamp token.
    #[error(transparent)]
    TimeStamp(#[from] ades_crypto::time_stamp::TimeStampError),

    /// Error while serializing a report.
    #[error("unable to serialize report: {0}")]
    ReportSerialization(String),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
