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

use std::collections::BTreeSet;

use ades_crypto::{
    certificate::CertificateToken,
    crl::{fetch_crl, CrlToken},
    ocsp::{fetch_ocsp_response, OcspToken},
};
use log::warn;

/// Common surface of CRL and OCSP tokens as far as sources are concerned.
///
/// Sealed to the two token types of this crate.
pub trait RevocationToken: Clone {
    /// The unique token id.
    fn token_id(&self) -> &str;

    /// Return `true` if this token determines the status of `cert`.
    fn covers(&self, cert: &CertificateToken, issuer: &CertificateToken) -> bool;
}

impl RevocationToken for CrlToken {
    fn token_id(&self) -> &str {
        self.id()
    }

    fn covers(&self, cert: &CertificateToken, _issuer: &CertificateToken) -> bool {
        // Good or revoked both mean the CRL determines the status; an
        // unrelated issuer yields Unknown.
        self.status_for(cert).is_known()
    }
}

impl RevocationToken for OcspToken {
    fn token_id(&self) -> &str {
        self.id()
    }

    fn covers(&self, cert: &CertificateToken, issuer: &CertificateToken) -> bool {
        self.status_for(cert, issuer).is_some()
    }
}

/// A provider of revocation tokens for a certificate.
pub trait RevocationSource<T: RevocationToken> {
    /// Return every known revocation token determining the status of
    /// `cert`, whose issuer certificate is `issuer`.
    fn get_revocation_tokens(
        &self,
        cert: &CertificateToken,
        issuer: &CertificateToken,
    ) -> Vec<T>;
}

/// An id-deduplicated in-memory store of revocation tokens.
#[derive(Clone, Debug, Default)]
pub struct CommonRevocationSource<T: RevocationToken> {
    tokens: Vec<T>,
}

impl<T: RevocationToken> CommonRevocationSource<T> {
    /// Create an empty source.
    pub fn new() -> Self {
        CommonRevocationSource { tokens: vec![] }
    }

    /// Add a token; idempotent by token id.
    pub fn add(&mut self, token: T) {
        if !self.tokens.iter().any(|t| t.token_id() == token.token_id()) {
            self.tokens.push(token);
        }
    }

    /// All tokens in insertion order.
    pub fn tokens(&self) -> &[T] {
        &self.tokens
    }

    /// Return `true` if the source holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<T: RevocationToken> RevocationSource<T> for CommonRevocationSource<T> {
    fn get_revocation_tokens(
        &self,
        cert: &CertificateToken,
        issuer: &CertificateToken,
    ) -> Vec<T> {
        self.tokens
            .iter()
            .filter(|t| t.covers(cert, issuer))
            .cloned()
            .collect()
    }
}

/// An ordered aggregation of revocation sources.
///
/// Lookups walk every source and deduplicate results by token id, keeping
/// the first-seen instance.
#[derive(Clone, Debug, Default)]
pub struct ListRevocationSource<T: RevocationToken> {
    sources: Vec<CommonRevocationSource<T>>,
}

impl<T: RevocationToken> ListRevocationSource<T> {
    /// Create an empty aggregation.
    pub fn new() -> Self {
        ListRevocationSource { sources: vec![] }
    }

    /// Append one source.
    pub fn add(&mut self, source: CommonRevocationSource<T>) {
        self.sources.push(source);
    }

    /// Append every source of another aggregation.
    pub fn add_all(&mut self, other: &ListRevocationSource<T>) {
        for source in &other.sources {
            self.sources.push(source.clone());
        }
    }

    /// Number of underlying sources.
    pub fn number_of_sources(&self) -> usize {
        self.sources.len()
    }

    /// All distinct tokens across every source.
    pub fn all_tokens(&self) -> Vec<&T> {
        let mut seen = BTreeSet::new();
        let mut result = vec![];

        for source in &self.sources {
            for token in source.tokens() {
                if seen.insert(token.token_id().to_string()) {
                    result.push(token);
                }
            }
        }

        result
    }
}

impl<T: RevocationToken> RevocationSource<T> for ListRevocationSource<T> {
    fn get_revocation_tokens(
        &self,
        cert: &CertificateToken,
        issuer: &CertificateToken,
    ) -> Vec<T> {
        let mut seen = BTreeSet::new();
        let mut result = vec![];

        for source in &self.sources {
            for token in source.get_revocation_tokens(cert, issuer) {
                if seen.insert(token.token_id().to_string()) {
                    result.push(token);
                }
            }
        }

        result
    }
}

/// A revocation source querying the OCSP responders named in the
/// certificate's AIA extension.
#[derive(Clone, Debug, Default)]
pub struct OnlineOcspSource;

impl OnlineOcspSource {
    /// Create the source.
    pub fn new() -> Self {
        OnlineOcspSource
    }
}

impl RevocationSource<OcspToken> for OnlineOcspSource {
    fn get_revocation_tokens(
        &self,
        cert: &CertificateToken,
        issuer: &CertificateToken,
    ) -> Vec<OcspToken> {
        let Some(der) = fetch_ocsp_response(cert, issuer) else {
            return vec![];
        };

        match OcspToken::from_der(&der) {
            Ok(token) => vec![token],
            Err(e) => {
                warn!(
                    "discarding unparseable OCSP response for certificate {}: {e}",
                    cert.id()
                );
                vec![]
            }
        }
    }
}

/// A revocation source downloading CRLs from the certificate's distribution
/// points.
#[derive(Clone, Debug, Default)]
pub struct OnlineCrlSource;

impl OnlineCrlSource {
    /// Create the source.
    pub fn new() -> Self {
        OnlineCrlSource
    }
}

impl RevocationSource<CrlToken> for OnlineCrlSource {
    fn get_revocation_tokens(
        &self,
        cert: &CertificateToken,
        _issuer: &CertificateToken,
    ) -> Vec<CrlToken> {
        let mut result = vec![];

        for url in cert.crl_distribution_urls() {
            let Some(der) = fetch_crl(url) else {
                continue;
            };

            match CrlToken::from_der(&der) {
                Ok(token) => result.push(token),
                Err(e) => {
                    warn!("discarding unparseable CRL from {url}: {e}");
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use ades_crypto::{
        revocation::RevocationStatus,
        testing::{build_crl, build_ocsp, issue, issue_ocsp_responder, make_root},
    };
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn common_source_dedups_by_id() {
        let root = make_root("Rev Source Root");
        let this_update = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let crl = build_crl(&root, &[], this_update, None);

        let mut source = CommonRevocationSource::new();
        source.add(crl.clone());
        source.add(crl.clone());

        assert_eq!(source.tokens().len(), 1);
    }

    #[test]
    fn list_source_returns_union() {
        let root = make_root("Rev List Root");
        let leaf = issue(&root, "Rev List Leaf", 3, false);
        let responder = issue_ocsp_responder(&root, "Rev List Responder", 4);

        let produced_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let ocsp1 = build_ocsp(
            &leaf.cert,
            &root.cert,
            &responder,
            RevocationStatus::Good,
            produced_at,
            None,
            false,
        );
        let ocsp2 = build_ocsp(
            &leaf.cert,
            &root.cert,
            &responder,
            RevocationStatus::Good,
            later,
            None,
            false,
        );

        let mut source1 = CommonRevocationSource::new();
        source1.add(ocsp1.clone());

        let mut source2 = CommonRevocationSource::new();
        source2.add(ocsp1);
        source2.add(ocsp2);

        let mut list = ListRevocationSource::new();
        list.add(source1);
        list.add(source2);

        assert_eq!(list.all_tokens().len(), 2);
        assert_eq!(
            list.get_revocation_tokens(&leaf.cert, &root.cert).len(),
            2
        );
    }
}
