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

use rsa::{pkcs8::DecodePublicKey, Pkcs1v15Sign, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};

use crate::{
    hash::{sha256, sha384, sha512},
    raw_signature::{RawSignatureValidationError, RawSignatureValidator},
};

/// An `RsaLegacyValidator` can validate raw signatures with the PKCS#1 v1.5
/// padded RSA signature algorithms still common in X.509 certificates and
/// CMS structures.
pub enum RsaLegacyValidator {
    /// RSA with SHA-256
    Rsa256,

    /// RSA with SHA-384
    Rsa384,

    /// RSA with SHA-512
    Rsa512,
}

impl RawSignatureValidator for RsaLegacyValidator {
    fn validate(
        &self,
        sig: &[u8],
        data: &[u8],
        public_key: &[u8],
    ) -> Result<(), RawSignatureValidationError> {
        let public_key = RsaPublicKey::from_public_key_der(public_key)
            .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

        let result = match self {
            Self::Rsa256 => {
                public_key.verify(Pkcs1v15Sign::new::<Sha256>(), &sha256(data), sig)
            }
            Self::Rsa384 => {
                public_key.verify(Pkcs1v15Sign::new::<Sha384>(), &sha384(data), sig)
            }
            Self::Rsa512 => {
                public_key.verify(Pkcs1v15Sign::new::<Sha512>(), &sha512(data), sig)
            }
        };

        result.map_err(|_| RawSignatureValidationError::SignatureMismatch)
    }
}
