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

//! Hash convenience functions and the digest algorithm taxonomy.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use sha2::{Sha256, Sha384, Sha512};
use x509_parser::der_parser::Oid;

use crate::raw_signature::oids::{SHA1_OID, SHA256_OID, SHA384_OID, SHA512_OID};

/// Given a byte slice, return the SHA-1 hash of that content.
pub fn sha1(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha1::default();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Given a byte slice, return the SHA-256 hash of that content.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::default();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Given a byte slice, return the SHA-384 hash of that content.
pub fn sha384(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha384::default();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Given a byte slice, return the SHA-512 hash of that content.
pub fn sha512(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha512::default();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Digest algorithms understood by the validation process.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum DigestAlgorithm {
    /// SHA-1 (legacy; accepted for token identification only).
    #[serde(rename = "SHA1")]
    Sha1,

    /// SHA-256.
    #[serde(rename = "SHA256")]
    Sha256,

    /// SHA-384.
    #[serde(rename = "SHA384")]
    Sha384,

    /// SHA-512.
    #[serde(rename = "SHA512")]
    Sha512,
}

impl DigestAlgorithm {
    /// Return the digest of `data` under this algorithm.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => sha1(data),
            Self::Sha256 => sha256(data),
            Self::Sha384 => sha384(data),
            Self::Sha512 => sha512(data),
        }
    }

    /// Identify a digest algorithm from its object identifier.
    pub fn from_oid(oid: &Oid<'_>) -> Option<Self> {
        if *oid == SHA1_OID {
            Some(Self::Sha1)
        } else if *oid == SHA256_OID {
            Some(Self::Sha256)
        } else if *oid == SHA384_OID {
            Some(Self::Sha384)
        } else if *oid == SHA512_OID {
            Some(Self::Sha512)
        } else {
            None
        }
    }

    /// Identify a digest algorithm from a dotted-decimal OID string.
    pub fn from_oid_str(oid: &str) -> Option<Self> {
        let oid = Oid::from_str(oid).ok()?;
        Self::from_oid(&oid)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha384 => write!(f, "SHA384"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}
