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

//! Synthetic PKI for tests.
//!
//! Mints deterministic ECDSA P-256 key pairs, certificates, CRLs, OCSP
//! responses and time-stamp tokens so that validation scenarios can be
//! exercised without fixture files. Keys are derived from seed labels, so a
//! given test builds the same PKI on every run.
//!
//! Not intended for any use outside of tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use der::{asn1::UtcTime, Encode};
use p256::ecdsa::{signature::Signer, DerSignature, SigningKey};
use rasn::types::{Any, Integer, ObjectIdentifier, OctetString, SetOf};
use rasn::Decoder;
use rasn_ocsp::{BasicOcspResponse, CertStatus, OcspResponseStatus};
use x509_cert::{
    builder::{Builder, CertificateBuilder, Profile},
    crl::{CertificateList, RevokedCert, TbsCertList},
    ext::pkix::ExtendedKeyUsage,
    name::Name,
    serial_number::SerialNumber,
    spki::{
        AlgorithmIdentifierOwned, EncodePublicKey, ObjectIdentifier as DerOid,
        SubjectPublicKeyInfoOwned,
    },
    time::{Time, Validity},
};

use crate::{
    certificate::CertificateToken,
    crl::CrlToken,
    hash::sha256,
    ocsp::OcspToken,
    revocation::RevocationStatus,
    time_stamp::{Accuracy, MessageImprint, TimestampToken, TimestampType, TstInfo},
};

const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
const SHA256: &str = "2.16.840.1.101.3.4.2.1";
const SIGNED_DATA: &str = "1.2.840.113549.1.7.2";
const TST_INFO: &str = "1.2.840.113549.1.9.16.1.4";
const CONTENT_TYPE_ATTR: &str = "1.2.840.113549.1.9.3";
const MESSAGE_DIGEST_ATTR: &str = "1.2.840.113549.1.9.4";
const RI_OCSP_RESPONSE: &str = "1.3.6.1.5.5.7.16.2";
const ID_PKIX_OCSP_BASIC: &str = "1.3.6.1.5.5.7.48.1.1";
const EKU_OCSP_SIGNING: &str = "1.3.6.1.5.5.7.3.9";
const EKU_TIME_STAMPING: &str = "1.3.6.1.5.5.7.3.8";

/// A certificate together with the private key it certifies.
pub struct TestIdentity {
    /// The certificate token.
    pub cert: CertificateToken,

    /// The matching P-256 signing key.
    pub key: SigningKey,
}

/// Dotted form of ecdsa-with-SHA256, for building signature descriptions.
pub const ECDSA_WITH_SHA256_OID_STR: &str = ECDSA_WITH_SHA256;

/// Dotted form of the SHA-256 OID, for building signature descriptions.
pub const SHA256_OID_STR: &str = SHA256;

/// Derive a deterministic P-256 signing key from a seed label.
pub fn key_from_seed(label: &str) -> SigningKey {
    SigningKey::from_slice(&sha256(label.as_bytes())).unwrap()
}

/// Sign `data` with the identity's key; returns a DER-encoded ECDSA
/// signature.
pub fn sign_data(identity: &TestIdentity, data: &[u8]) -> Vec<u8> {
    let sig: DerSignature = identity.key.sign(data);
    sig.as_ref().to_vec()
}

/// Build a self-signed root CA.
pub fn make_root(cn: &str) -> TestIdentity {
    let key = key_from_seed(cn);

    let der = build_cert(
        cn,
        1,
        Profile::Root,
        key.verifying_key(),
        &key,
        &[],
    );

    TestIdentity {
        cert: CertificateToken::from_der(&der).unwrap(),
        key,
    }
}

/// Issue an end-entity or CA certificate from `issuer`.
pub fn issue(issuer: &TestIdentity, cn: &str, serial: u32, ca: bool) -> TestIdentity {
    issue_with_ekus(issuer, cn, serial, ca, &[])
}

/// Issue an OCSP responder certificate from `issuer`.
pub fn issue_ocsp_responder(issuer: &TestIdentity, cn: &str, serial: u32) -> TestIdentity {
    issue_with_ekus(issuer, cn, serial, false, &[EKU_OCSP_SIGNING])
}

/// Issue a time-stamping certificate from `issuer`.
pub fn issue_tsa(issuer: &TestIdentity, cn: &str, serial: u32) -> TestIdentity {
    issue_with_ekus(issuer, cn, serial, false, &[EKU_TIME_STAMPING])
}

fn issue_with_ekus(
    issuer: &TestIdentity,
    cn: &str,
    serial: u32,
    ca: bool,
    ekus: &[&str],
) -> TestIdentity {
    let key = key_from_seed(cn);

    let issuer_name = Name::from_str(&format!("CN={}", issuer_cn(issuer))).unwrap();

    let profile = if ca {
        Profile::SubCA {
            issuer: issuer_name,
            path_len_constraint: None,
        }
    } else {
        Profile::Leaf {
            issuer: issuer_name,
            enable_key_agreement: false,
            enable_key_encipherment: false,
        }
    };

    let der = build_cert(cn, serial, profile, key.verifying_key(), &issuer.key, ekus);

    TestIdentity {
        cert: CertificateToken::from_der(&der).unwrap(),
        key,
    }
}

fn issuer_cn(identity: &TestIdentity) -> String {
    // Subject DNs in this module are always a bare CN.
    identity
        .cert
        .subject()
        .trim_start_matches("CN=")
        .to_string()
}

fn build_cert(
    cn: &str,
    serial: u32,
    profile: Profile,
    public_key: &p256::ecdsa::VerifyingKey,
    signer: &SigningKey,
    ekus: &[&str],
) -> Vec<u8> {
    let subject = Name::from_str(&format!("CN={cn}")).unwrap();

    let spki_der = public_key.to_public_key_der().unwrap();
    let spki = SubjectPublicKeyInfoOwned::try_from(spki_der.as_bytes()).unwrap();

    let mut builder = CertificateBuilder::new(
        profile,
        SerialNumber::from(serial),
        validity(),
        subject,
        spki,
        signer,
    )
    .unwrap();

    if !ekus.is_empty() {
        let eku = ExtendedKeyUsage(
            ekus.iter()
                .map(|oid| DerOid::new_unwrap(oid))
                .collect::<Vec<_>>(),
        );
        builder.add_extension(&eku).unwrap();
    }

    let cert = builder.build::<DerSignature>().unwrap();
    cert.to_der().unwrap()
}

fn validity() -> Validity {
    Validity {
        not_before: der_time(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
        not_after: der_time(Utc.with_ymd_and_hms(2033, 1, 1, 0, 0, 0).unwrap()),
    }
}

fn der_time(t: DateTime<Utc>) -> Time {
    let duration = std::time::Duration::from_secs(t.timestamp() as u64);
    Time::UtcTime(UtcTime::from_unix_duration(duration).unwrap())
}

/// Build a CRL signed by `issuer`, revoking the given serial numbers.
pub fn build_crl(
    issuer: &TestIdentity,
    revoked_serials: &[u32],
    this_update: DateTime<Utc>,
    next_update: Option<DateTime<Utc>>,
) -> CrlToken {
    let revoked = if revoked_serials.is_empty() {
        None
    } else {
        Some(
            revoked_serials
                .iter()
                .map(|serial| RevokedCert {
                    serial_number: SerialNumber::from(*serial),
                    revocation_date: der_time(this_update),
                    crl_entry_extensions: None,
                })
                .collect::<Vec<_>>(),
        )
    };

    let signature_algorithm = AlgorithmIdentifierOwned {
        oid: DerOid::new_unwrap(ECDSA_WITH_SHA256),
        parameters: None,
    };

    let tbs = TbsCertList {
        version: x509_cert::Version::V2,
        signature: signature_algorithm.clone(),
        issuer: Name::from_str(&format!("CN={}", issuer_cn(issuer))).unwrap(),
        this_update: der_time(this_update),
        next_update: next_update.map(der_time),
        revoked_certificates: revoked,
        crl_extensions: None,
    };

    let tbs_der = tbs.to_der().unwrap();
    let sig: DerSignature = issuer.key.sign(&tbs_der);

    let crl = CertificateList {
        tbs_cert_list: tbs,
        signature_algorithm,
        signature: der::asn1::BitString::from_bytes(sig.as_ref()).unwrap(),
    };

    CrlToken::from_der(&crl.to_der().unwrap()).unwrap()
}

/// Build an OCSP response about `cert`, signed by `responder`.
///
/// `with_cert_hash` adds the ETSI certHash single-response extension.
pub fn build_ocsp(
    cert: &CertificateToken,
    issuer: &CertificateToken,
    responder: &TestIdentity,
    status: RevocationStatus,
    produced_at: DateTime<Utc>,
    next_update: Option<DateTime<Utc>>,
    with_cert_hash: bool,
) -> OcspToken {
    let subject: rasn_pkix::Certificate = rasn::der::decode(cert.der()).unwrap();
    let responder_cert: rasn_pkix::Certificate = rasn::der::decode(responder.cert.der()).unwrap();

    let sha1_ai = rasn_pkix::AlgorithmIdentifier {
        algorithm: rasn_oid(&[1, 3, 14, 3, 2, 26]),
        parameters: Some(Any::new(rasn::der::encode(&()).unwrap())),
    };

    let cert_id = rasn_ocsp::CertId {
        hash_algorithm: sha1_ai,
        issuer_name_hash: OctetString::from(crate::hash::sha1(cert.issuer_raw())),
        issuer_key_hash: OctetString::from(crate::hash::sha1(issuer.public_key_bits())),
        serial_number: subject.tbs_certificate.serial_number.clone(),
    };

    let cert_status = match status {
        RevocationStatus::Good => CertStatus::Good,
        RevocationStatus::Revoked { time, .. } => CertStatus::Revoked(rasn_ocsp::RevokedInfo {
            revocation_time: fixed_offset(time),
            revocation_reason: None,
        }),
        RevocationStatus::Unknown => CertStatus::Unknown(()),
    };

    let single_extensions = if with_cert_hash {
        let cert_hash = CertHashAsn {
            hash_algorithm: rasn_pkix::AlgorithmIdentifier {
                algorithm: rasn_oid_str(SHA256),
                parameters: None,
            },
            certificate_hash: OctetString::from(sha256(cert.der())),
        };

        Some(rasn_pkix::Extensions::from(vec![rasn_pkix::Extension {
            extn_id: rasn_oid(&[1, 3, 36, 8, 3, 13]),
            critical: false,
            extn_value: OctetString::from(rasn::der::encode(&cert_hash).unwrap()),
        }]))
    } else {
        None
    };

    let single = rasn_ocsp::SingleResponse {
        cert_id,
        cert_status,
        this_update: fixed_offset(produced_at),
        next_update: next_update.map(fixed_offset),
        single_extensions,
    };

    let response_data = rasn_ocsp::ResponseData {
        version: rasn_ocsp::Version::from(0u8),
        responder_id: rasn_ocsp::ResponderId::ByName(
            responder_cert.tbs_certificate.subject.clone(),
        ),
        produced_at: fixed_offset(produced_at),
        responses: vec![single],
        response_extensions: None,
    };

    let tbs_der = rasn::der::encode(&response_data).unwrap();
    let sig: DerSignature = responder.key.sign(&tbs_der);

    let basic = BasicOcspResponse {
        tbs_response_data: response_data,
        signature_algorithm: rasn_pkix::AlgorithmIdentifier {
            algorithm: rasn_oid_str(ECDSA_WITH_SHA256),
            parameters: None,
        },
        signature: rasn::types::BitString::from_vec(sig.as_ref().to_vec()),
        certs: Some(vec![responder_cert]),
    };

    let response = rasn_ocsp::OcspResponse {
        status: OcspResponseStatus::Successful,
        bytes: Some(rasn_ocsp::ResponseBytes {
            r#type: rasn_oid_str(ID_PKIX_OCSP_BASIC),
            response: OctetString::from(rasn::der::encode(&basic).unwrap()),
        }),
    };

    OcspToken::from_der(&rasn::der::encode(&response).unwrap()).unwrap()
}

/// Build a time-stamp token over `data`, signed by `tsa`.
///
/// `crls` and `ocsps` are embedded in the SignedData revocation set, as an
/// archival timestamp would carry them.
pub fn build_timestamp(
    tsa: &TestIdentity,
    data: &[u8],
    gen_time: DateTime<Utc>,
    timestamp_type: TimestampType,
    crls: &[Vec<u8>],
    ocsps: &[Vec<u8>],
) -> TimestampToken {
    let tsa_cert: rasn_pkix::Certificate = rasn::der::decode(tsa.cert.der()).unwrap();

    let sha256_ai = rasn_pkix::AlgorithmIdentifier {
        algorithm: rasn_oid_str(SHA256),
        parameters: None,
    };

    let tst = TstInfo {
        version: Integer::from(1u8),
        policy: rasn_oid(&[1, 2, 3, 4, 1]),
        message_imprint: MessageImprint {
            hash_algorithm: sha256_ai.clone(),
            hashed_message: OctetString::from(sha256(data)),
        },
        serial_number: Integer::from(1u8),
        gen_time: fixed_offset(gen_time),
        accuracy: None::<Accuracy>,
        ordering: false,
        nonce: None,
        tsa: None,
        extensions: None,
    };

    let tst_der = rasn::der::encode(&tst).unwrap();

    let content_type_attr = rasn_cms::Attribute {
        r#type: rasn_oid_str(CONTENT_TYPE_ATTR),
        values: set_of(vec![Any::new(
            rasn::der::encode(&rasn_oid_str(TST_INFO)).unwrap(),
        )]),
    };

    let message_digest_attr = rasn_cms::Attribute {
        r#type: rasn_oid_str(MESSAGE_DIGEST_ATTR),
        values: set_of(vec![Any::new(
            rasn::der::encode(&OctetString::from(sha256(&tst_der))).unwrap(),
        )]),
    };

    let signed_attrs = set_of(vec![content_type_attr, message_digest_attr]);

    let signed_attrs_der = rasn::der::encode(&signed_attrs).unwrap();
    let sig: DerSignature = tsa.key.sign(&signed_attrs_der);

    let signer_info = rasn_cms::SignerInfo {
        version: rasn_cms::CmsVersion::from(1u8),
        sid: rasn_cms::SignerIdentifier::IssuerAndSerialNumber(rasn_cms::IssuerAndSerialNumber {
            issuer: tsa_cert.tbs_certificate.issuer.clone(),
            serial_number: tsa_cert.tbs_certificate.serial_number.clone(),
        }),
        digest_algorithm: sha256_ai.clone(),
        signed_attrs: Some(signed_attrs),
        signature_algorithm: rasn_pkix::AlgorithmIdentifier {
            algorithm: rasn_oid_str(ECDSA_WITH_SHA256),
            parameters: None,
        },
        signature: OctetString::from(sig.as_ref().to_vec()),
        unsigned_attrs: None,
    };

    let mut revocation_choices = vec![];
    for crl_der in crls {
        let list: rasn_pkix::CertificateList = rasn::der::decode(crl_der).unwrap();
        revocation_choices.push(rasn_cms::RevocationInfoChoice::Crl(list));
    }
    for ocsp_der in ocsps {
        revocation_choices.push(rasn_cms::RevocationInfoChoice::Other(
            rasn_cms::OtherRevocationInfoFormat {
                other_rev_info_format: rasn_oid_str(RI_OCSP_RESPONSE),
                other_rev_info: Any::new(ocsp_der.clone()),
            },
        ));
    }

    let sd = rasn_cms::pkcs7_compat::SignedData {
        version: rasn_cms::CmsVersion::from(3u8),
        digest_algorithms: set_of(vec![sha256_ai]),
        encap_content_info: rasn_cms::pkcs7_compat::EncapsulatedContentInfo {
            content_type: rasn_oid_str(TST_INFO),
            content: Some(Any::new(
                rasn::der::encode(&OctetString::from(tst_der)).unwrap(),
            )),
        },
        certificates: Some(set_of(vec![rasn_cms::CertificateChoices::Certificate(
            Box::new(tsa_cert),
        )])),
        crls: if revocation_choices.is_empty() {
            None
        } else {
            Some(set_of(revocation_choices))
        },
        signer_infos: set_of(vec![signer_info]),
    };

    let content_info = rasn_cms::ContentInfo {
        content_type: rasn_oid_str(SIGNED_DATA),
        content: Any::new(rasn::der::encode(&sd).unwrap()),
    };

    TimestampToken::from_der(&rasn::der::encode(&content_info).unwrap(), timestamp_type).unwrap()
}

// ETSI CertHash ::= SEQUENCE { hashAlgorithm AlgorithmIdentifier,
//                              certificateHash OCTET STRING }
#[derive(rasn::AsnType, rasn::Decode, rasn::Encode)]
struct CertHashAsn {
    hash_algorithm: rasn_pkix::AlgorithmIdentifier,
    certificate_hash: OctetString,
}

fn fixed_offset(t: DateTime<Utc>) -> DateTime<FixedOffset> {
    t.with_timezone(&FixedOffset::east_opt(0).unwrap())
}

fn rasn_oid(arcs: &'static [u32]) -> ObjectIdentifier {
    ObjectIdentifier::from(rasn::types::Oid::new(arcs).unwrap())
}

fn rasn_oid_str(dotted: &str) -> ObjectIdentifier {
    let arcs = dotted
        .split('.')
        .map(|part| part.parse::<u32>().unwrap())
        .collect::<Vec<_>>();
    ObjectIdentifier::new(arcs).unwrap()
}

fn set_of<T>(items: Vec<T>) -> SetOf<T>
where
    T: Eq + std::hash::Hash,
{
    SetOf::from_vec(items)
}
