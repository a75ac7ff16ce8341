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

use ades_crypto::certificate::{fetch_issuer_via_aia, CertificateToken};
use log::warn;

/// Resolves issuer certificates through the AIA (caIssuers) extension.
///
/// Configured on the certificate verifier; when absent, chain building stops
/// at the certificates already known to the sources.
pub trait AiaSource {
    /// Return candidate issuer certificates for `cert`.
    ///
    /// Transport failures yield an empty list, never an error; the
    /// certificate is then retained as an orphan.
    fn get_issuer_candidates(&self, cert: &CertificateToken) -> Vec<CertificateToken>;
}

/// The default [`AiaSource`], downloading over HTTP.
#[derive(Clone, Debug, Default)]
pub struct OnlineAiaSource;

impl OnlineAiaSource {
    /// Create the source.
    pub fn new() -> Self {
        OnlineAiaSource
    }
}

impl AiaSource for OnlineAiaSource {
    fn get_issuer_candidates(&self, cert: &CertificateToken) -> Vec<CertificateToken> {
        let Some(der) = fetch_issuer_via_aia(cert) else {
            return vec![];
        };

        match CertificateToken::from_der(&der) {
            Ok(token) => vec![token],
            Err(e) => {
                warn!(
                    "discarding unparseable AIA issuer for certificate {}: {e}",
                    cert.id()
                );
                vec![]
            }
        }
    }
}
