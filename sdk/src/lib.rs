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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg, doc_cfg_hide))]

pub mod alert;
pub mod context;
pub mod counter_signature;
pub mod diagnostic;
pub mod document;
mod error;
pub mod format;
pub mod manifest;
pub mod process;
pub mod reports;
pub mod signature;
pub mod source;
pub mod validator;
pub mod verifier;

pub use error::{Error, Result};

// The token model is part of this crate's public API surface.
pub use ades_crypto::{
    certificate::CertificateToken,
    crl::CrlToken,
    hash::DigestAlgorithm,
    ocsp::OcspToken,
    raw_signature::EncryptionAlgorithm,
    revocation::{RevocationStatus, RevocationType},
    time_stamp::{TimestampToken, TimestampType, TimestampedObjectType, TimestampedReference},
};
