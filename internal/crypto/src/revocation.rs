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

//! Status taxonomy shared by the CRL and OCSP token types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The mechanism a revocation token was produced by.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum RevocationType {
    /// Certificate revocation list (RFC 5280).
    #[serde(rename = "CRL")]
    Crl,

    /// Online certificate status protocol response (RFC 6960).
    #[serde(rename = "OCSP")]
    Ocsp,
}

/// The status a revocation token reports for one certificate.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RevocationStatus {
    /// The certificate is not known to be revoked.
    Good,

    /// The certificate was revoked at the given time.
    Revoked {
        /// Time of revocation.
        time: DateTime<Utc>,

        /// Revocation reason, if the token carries one.
        reason: Option<String>,
    },

    /// The token does not determine the certificate's status.
    Unknown,
}

impl RevocationStatus {
    /// Return `true` unless the status is [`RevocationStatus::Unknown`].
    pub fn is_known(&self) -> bool {
        !matches!(self, RevocationStatus::Unknown)
    }

    /// Return `true` if the status is [`RevocationStatus::Good`].
    pub fn is_good(&self) -> bool {
        matches!(self, RevocationStatus::Good)
    }

    /// Return `true` if the status is [`RevocationStatus::Revoked`].
    pub fn is_revoked(&self) -> bool {
        matches!(self, RevocationStatus::Revoked { .. })
    }
}

/// Describes errors that can be identified when decoding a revocation token.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum RevocationError {
    /// The DER encoding of the token could not be parsed.
    #[error("unable to decode revocation data: {0}")]
    DecodeError(String),

    /// The OCSP response did not report a successful status.
    #[error("the OCSP responder reported an unsuccessful status")]
    UnsuccessfulOcspResponse,

    /// An unexpected internal error occured while processing the token.
    #[error("internal error ({0})")]
    InternalError(String),
}
