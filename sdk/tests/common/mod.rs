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

//! Shared scaffolding for the validation integration tests.

#![allow(dead_code)] // not every test binary uses every helper

use ades::{
    document::Document,
    format::{FormatHandlerRegistry, SignatureFormatHandler, SignatureForm},
    signature::{AdvancedSignature, SigningCertificateRef},
    source::{CertificateOrigin, CommonCertificateSource},
    verifier::CertificateVerifier,
    TimestampToken,
};
use ades_crypto::testing::{
    sign_data, TestIdentity, ECDSA_WITH_SHA256_OID_STR, SHA256_OID_STR,
};

/// Route `log` output through the test harness.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A format handler returning pre-built signatures.
pub struct StaticFormatHandler {
    signatures: Vec<AdvancedSignature>,
    detached_timestamps: Vec<TimestampToken>,
}

impl StaticFormatHandler {
    pub fn new(signatures: Vec<AdvancedSignature>) -> Self {
        StaticFormatHandler {
            signatures,
            detached_timestamps: vec![],
        }
    }

    pub fn with_detached_timestamps(mut self, timestamps: Vec<TimestampToken>) -> Self {
        self.detached_timestamps = timestamps;
        self
    }

    pub fn into_registry(self) -> FormatHandlerRegistry {
        let mut registry = FormatHandlerRegistry::new();
        registry.register(Box::new(self));
        registry
    }
}

impl SignatureFormatHandler for StaticFormatHandler {
    fn form(&self) -> SignatureForm {
        SignatureForm::CAdES
    }

    fn is_supported(&self, _document: &Document) -> bool {
        true
    }

    fn extract_signatures(&self, _document: &Document) -> ades::Result<Vec<AdvancedSignature>> {
        Ok(self.signatures.clone())
    }

    fn extract_detached_timestamps(
        &self,
        _document: &Document,
    ) -> ades::Result<Vec<TimestampToken>> {
        Ok(self.detached_timestamps.clone())
    }
}

/// Build a signature over `data` with the signer certificate embedded.
pub fn sign_document(data: &[u8], signer: &TestIdentity) -> AdvancedSignature {
    let signature_value = sign_data(signer, data);

    let mut signature = AdvancedSignature::new(
        SignatureForm::CAdES,
        signature_value,
        data.to_vec(),
        ECDSA_WITH_SHA256_OID_STR,
        SHA256_OID_STR,
    );

    signature.add_certificate(signer.cert.clone(), CertificateOrigin::KeyInfo);

    signature.set_signing_certificate_ref(SigningCertificateRef {
        issuer_serial: Some((
            signer.cert.issuer_raw().to_vec(),
            signer.cert.serial().to_vec(),
        )),
        ..SigningCertificateRef::default()
    });

    signature
}

/// A verifier trusting `root`.
pub fn verifier_trusting(root: &TestIdentity) -> CertificateVerifier {
    let mut trusted = CommonCertificateSource::of_type(ades::source::CertificateSourceType::Trusted);
    trusted.add_certificate(root.cert.clone());

    let mut verifier = CertificateVerifier::new();
    verifier.add_trusted_cert_source(trusted);
    verifier
}
