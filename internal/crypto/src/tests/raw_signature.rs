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

use p256::ecdsa::{signature::Signer, DerSignature, Signature};
use x509_cert::spki::EncodePublicKey;
use x509_parser::der_parser::oid;

use crate::{
    raw_signature::{
        validator_for_sig_and_hash_algs, validator_for_signing_alg, RawSignatureValidationError,
        SigningAlg,
    },
    testing::key_from_seed,
};

#[test]
fn es256_validates_p1363_signature() {
    let key = key_from_seed("raw-es256");
    let data = b"some body of data";

    let sig: Signature = key.sign(data);
    let public_key = key.verifying_key().to_public_key_der().unwrap();

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();
    validator
        .validate(sig.to_bytes().as_slice(), data, public_key.as_bytes())
        .unwrap();
}

#[test]
fn es256_validates_der_signature() {
    let key = key_from_seed("raw-es256-der");
    let data = b"some body of data";

    let sig: DerSignature = key.sign(data);
    let public_key = key.verifying_key().to_public_key_der().unwrap();

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();
    validator
        .validate(sig.as_ref(), data, public_key.as_bytes())
        .unwrap();
}

#[test]
fn es256_rejects_wrong_data() {
    let key = key_from_seed("raw-es256-neg");
    let data = b"some body of data";

    let sig: Signature = key.sign(data);
    let public_key = key.verifying_key().to_public_key_der().unwrap();

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();
    assert_eq!(
        validator.validate(sig.to_bytes().as_slice(), b"some other data", public_key.as_bytes()),
        Err(RawSignatureValidationError::SignatureMismatch)
    );
}

#[test]
fn ed25519_round_trip() {
    use ed25519_dalek::Signer as _;

    let key = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
    let data = b"some body of data";

    let sig = key.sign(data);
    let public_key = key.verifying_key().to_public_key_der().unwrap();

    let validator = validator_for_signing_alg(SigningAlg::Ed25519).unwrap();
    validator
        .validate(sig.to_bytes().as_slice(), data, public_key.as_bytes())
        .unwrap();
}

#[test]
fn invalid_public_key_rejected() {
    let validator = validator_for_signing_alg(SigningAlg::Ps256).unwrap();
    assert_eq!(
        validator.validate(b"sig", b"data", b"not a key"),
        Err(RawSignatureValidationError::InvalidPublicKey)
    );
}

#[test]
fn oid_dispatch() {
    let ecdsa_sha256 = oid!(1.2.840 .10045 .4 .3 .2);
    let sha256 = oid!(2.16.840 .1 .101 .3 .4 .2 .1);
    assert!(validator_for_sig_and_hash_algs(&ecdsa_sha256, &sha256).is_some());

    let unknown = oid!(1.2.3 .4);
    assert!(validator_for_sig_and_hash_algs(&unknown, &sha256).is_none());
}
