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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Describes the digital signature algorithms allowed by the validation
/// process.
///
/// Identifiers follow the JOSE registry where one exists.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SigningAlg {
    /// ECDSA with SHA-256
    #[serde(rename = "es256")]
    Es256,

    /// ECDSA with SHA-384
    #[serde(rename = "es384")]
    Es384,

    /// ECDSA with SHA-512
    #[serde(rename = "es512")]
    Es512,

    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256
    #[serde(rename = "ps256")]
    Ps256,

    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384
    #[serde(rename = "ps384")]
    Ps384,

    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512
    #[serde(rename = "ps512")]
    Ps512,

    /// Edwards-Curve DSA (Ed25519 instance only)
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl SigningAlg {
    /// Return the encryption algorithm family of this signing algorithm.
    pub fn encryption_algorithm(&self) -> EncryptionAlgorithm {
        match self {
            Self::Es256 | Self::Es384 | Self::Es512 => EncryptionAlgorithm::Ecdsa,
            Self::Ps256 | Self::Ps384 | Self::Ps512 => EncryptionAlgorithm::Rsa,
            Self::Ed25519 => EncryptionAlgorithm::Ed25519,
        }
    }
}

impl FromStr for SigningAlg {
    type Err = UnknownAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "es256" => Ok(Self::Es256),
            "es384" => Ok(Self::Es384),
            "es512" => Ok(Self::Es512),
            "ps256" => Ok(Self::Ps256),
            "ps384" => Ok(Self::Ps384),
            "ps512" => Ok(Self::Ps512),
            "ed25519" => Ok(Self::Ed25519),
            _ => Err(UnknownAlgorithmError(s.to_owned())),
        }
    }
}

impl fmt::Display for SigningAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Es256 => "es256",
                Self::Es384 => "es384",
                Self::Es512 => "es512",
                Self::Ps256 => "ps256",
                Self::Ps384 => "ps384",
                Self::Ps512 => "ps512",
                Self::Ed25519 => "ed25519",
            }
        )
    }
}

/// The encryption algorithm family behind a signature.
///
/// This is the granularity at which the validation policy expresses
/// acceptable encryption algorithms and minimum key sizes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum EncryptionAlgorithm {
    /// RSA (PKCS#1 v1.5 or PSS padding).
    #[serde(rename = "RSA")]
    Rsa,

    /// ECDSA over a NIST prime curve.
    #[serde(rename = "ECDSA")]
    Ecdsa,

    /// Edwards-Curve DSA.
    #[serde(rename = "Ed25519")]
    Ed25519,
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::Ecdsa => write!(f, "ECDSA"),
            Self::Ed25519 => write!(f, "Ed25519"),
        }
    }
}

/// This error is thrown when converting from a string to [`SigningAlg`]
/// and the algorithm is not recognized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownAlgorithmError(pub String);

impl fmt::Display for UnknownAlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnknownAlgorithmError({})", self.0)
    }
}

impl std::error::Error for UnknownAlgorithmError {}
