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

use std::collections::{BTreeSet, HashMap};

use ades_crypto::{certificate::CertificateToken, hash::DigestAlgorithm};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Classifies where a certificate source gets its content from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CertificateSourceType {
    /// A configured trust anchor store (fed from trusted-list parsing
    /// results or PEM bundles).
    Trusted,

    /// A caller-provided store of additional, untrusted certificates.
    Adjunct,

    /// Certificates embedded in a signature.
    Signature,

    /// Certificates embedded in a time-stamp token.
    Timestamp,

    /// Certificates downloaded through an AIA URL.
    Aia,

    /// Certificates embedded in an OCSP response.
    Ocsp,
}

/// The structure a certificate was found in, within its source.
///
/// A certificate may carry several origins at once (e.g. listed both in
/// KeyInfo and in the CertificateValues attribute of the same signature).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CertificateOrigin {
    /// XMLDSig KeyInfo element or CMS SignedData certificates.
    KeyInfo,

    /// The CertificateValues unsigned attribute.
    CertificateValues,

    /// The AttrAuthoritiesCertValues unsigned attribute.
    AttrAuthoritiesCertValues,

    /// The TimeStampValidationData attribute.
    TimestampValidationData,

    /// The DSS dictionary of a PDF document.
    DssDictionary,

    /// A BasicOCSPResponse certs field.
    BasicOcspResp,

    /// Not embedded in a signature structure (configured or downloaded).
    External,
}

/// An id-deduplicated store of certificate tokens with origin bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct CommonCertificateSource {
    source_type: Option<CertificateSourceType>,
    certificates: Vec<CertificateToken>,
    index_by_id: HashMap<String, usize>,
    origins: HashMap<String, BTreeSet<CertificateOrigin>>,
}

impl CommonCertificateSource {
    /// Create an empty source without a declared type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty source of the given type.
    pub fn of_type(source_type: CertificateSourceType) -> Self {
        CommonCertificateSource {
            source_type: Some(source_type),
            ..Self::default()
        }
    }

    /// The declared type of this source, if any.
    pub fn source_type(&self) -> Option<CertificateSourceType> {
        self.source_type
    }

    /// Add a certificate with [`CertificateOrigin::External`] provenance.
    ///
    /// Idempotent by token id; returns the id.
    pub fn add_certificate(&mut self, token: CertificateToken) -> String {
        self.add_certificate_with_origin(token, CertificateOrigin::External)
    }

    /// Add a certificate found under a specific origin.
    ///
    /// Adding the same certificate under several origins accumulates all of
    /// them.
    pub fn add_certificate_with_origin(
        &mut self,
        token: CertificateToken,
        origin: CertificateOrigin,
    ) -> String {
        let id = token.id().to_string();

        if !self.index_by_id.contains_key(&id) {
            self.index_by_id.insert(id.clone(), self.certificates.len());
            self.certificates.push(token);
        }

        self.origins.entry(id.clone()).or_default().insert(origin);
        id
    }

    /// Load a PEM bundle of certificates (trust anchors or adjunct
    /// certificates).
    pub fn add_pem_bundle(&mut self, pems: &[u8]) -> Result<()> {
        for token in CertificateToken::from_pem_bundle(pems)? {
            self.add_certificate(token);
        }
        Ok(())
    }

    /// All certificates in insertion order.
    pub fn certificates(&self) -> &[CertificateToken] {
        &self.certificates
    }

    /// Number of distinct certificates.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Return `true` if the source holds no certificates.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Look up a certificate by token id.
    pub fn get_by_id(&self, id: &str) -> Option<&CertificateToken> {
        self.index_by_id.get(id).map(|i| &self.certificates[*i])
    }

    /// Return all certificates with the given subject name (raw DER).
    pub fn get_by_subject(&self, subject_raw: &[u8]) -> Vec<&CertificateToken> {
        self.certificates
            .iter()
            .filter(|c| c.subject_raw() == subject_raw)
            .collect()
    }

    /// Return all certificates with the given subject key identifier.
    pub fn get_by_ski(&self, ski: &[u8]) -> Vec<&CertificateToken> {
        self.certificates
            .iter()
            .filter(|c| c.ski() == Some(ski))
            .collect()
    }

    /// Return all certificates whose digest under `alg` equals `digest`.
    pub fn get_by_digest(&self, alg: DigestAlgorithm, digest: &[u8]) -> Vec<&CertificateToken> {
        self.certificates
            .iter()
            .filter(|c| c.digest(alg) == digest)
            .collect()
    }

    /// The origins a certificate was found under within this source.
    pub fn origins_of(&self, id: &str) -> Vec<CertificateOrigin> {
        self.origins
            .get(id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// An ordered aggregation of certificate sources.
///
/// Lookups walk every source; results are deduplicated by token id while
/// every (source type, origin) pair a certificate was found under is
/// preserved.
#[derive(Clone, Debug, Default)]
pub struct ListCertificateSource {
    sources: Vec<CommonCertificateSource>,
}

impl ListCertificateSource {
    /// Create an empty aggregation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one source.
    pub fn add(&mut self, source: CommonCertificateSource) {
        self.sources.push(source);
    }

    /// Append every source of another aggregation.
    pub fn add_all(&mut self, other: &ListCertificateSource) {
        for source in &other.sources {
            self.sources.push(source.clone());
        }
    }

    /// The aggregated sources.
    pub fn sources(&self) -> &[CommonCertificateSource] {
        &self.sources
    }

    /// Number of underlying sources.
    pub fn number_of_sources(&self) -> usize {
        self.sources.len()
    }

    /// All distinct certificates across every source, in first-seen order.
    pub fn all_certificates(&self) -> Vec<&CertificateToken> {
        let mut seen = BTreeSet::new();
        let mut result = vec![];

        for source in &self.sources {
            for cert in source.certificates() {
                if seen.insert(cert.id().to_string()) {
                    result.push(cert);
                }
            }
        }

        result
    }

    /// Look up a certificate by token id.
    pub fn get_by_id(&self, id: &str) -> Option<&CertificateToken> {
        self.sources.iter().find_map(|s| s.get_by_id(id))
    }

    /// Return all certificates with the given subject name (raw DER).
    pub fn get_by_subject(&self, subject_raw: &[u8]) -> Vec<&CertificateToken> {
        let mut seen = BTreeSet::new();
        let mut result = vec![];

        for source in &self.sources {
            for cert in source.get_by_subject(subject_raw) {
                if seen.insert(cert.id().to_string()) {
                    result.push(cert);
                }
            }
        }

        result
    }

    /// Return all certificates with the given subject key identifier.
    pub fn get_by_ski(&self, ski: &[u8]) -> Vec<&CertificateToken> {
        let mut seen = BTreeSet::new();
        let mut result = vec![];

        for source in &self.sources {
            for cert in source.get_by_ski(ski) {
                if seen.insert(cert.id().to_string()) {
                    result.push(cert);
                }
            }
        }

        result
    }

    /// Every (source type, origin) pair a certificate was found under,
    /// across all aggregated sources.
    pub fn origins_of(&self, id: &str) -> Vec<(Option<CertificateSourceType>, CertificateOrigin)> {
        let mut result = BTreeSet::new();

        for source in &self.sources {
            for origin in source.origins_of(id) {
                result.insert((source.source_type(), origin));
            }
        }

        result.into_iter().collect()
    }
}
