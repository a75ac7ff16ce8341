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

//! The verdict taxonomy of ETSI EN 319 102-1.

use serde::{Deserialize, Serialize};

/// Top-level verdict of a validation sub-process.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Indication {
    /// The checks of the sub-process succeeded.
    #[serde(rename = "PASSED")]
    Passed,

    /// The signature is invalid.
    #[serde(rename = "FAILED")]
    Failed,

    /// The available evidence does not suffice to pass or fail.
    #[serde(rename = "INDETERMINATE")]
    Indeterminate,
}

impl Indication {
    /// Return `true` for [`Indication::Passed`].
    pub fn is_passed(&self) -> bool {
        matches!(self, Indication::Passed)
    }
}

/// Refinement of a non-passed [`Indication`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubIndication {
    /// The signature or document encoding does not match its format
    /// specification.
    FormatFailure,

    /// No signing certificate candidate could be identified.
    NoSigningCertificateFound,

    /// The signature value does not verify.
    SigCryptoFailure,

    /// A digest of referenced data does not match.
    HashFailure,

    /// The timestamped data could not be reconstructed.
    SignedDataNotFound,

    /// A cryptographic constraint failed and no proof of existence rescues
    /// it.
    CryptoConstraintsFailureNoPoe,

    /// A certificate was used outside its validity range without a proof of
    /// existence inside it.
    OutOfBoundsNoPoe,

    /// No prospective certificate chain up to a trust anchor was found.
    NoCertificateChainFound,

    /// The certificate chain failed for a reason without a dedicated code.
    CertificateChainGeneralFailure,

    /// Required information (typically revocation data) is missing but may
    /// become available later.
    TryLater,

    /// The signing certificate is revoked and no proof of existence
    /// predates the revocation.
    RevokedNoPoe,

    /// A CA certificate of the chain is revoked and no proof of existence
    /// predates the revocation.
    RevokedCaNoPoe,

    /// No proof of existence is available at the required time.
    NoPoe,

    /// The timestamps of the signature contradict each other's order.
    TimestampOrderFailure,
}
