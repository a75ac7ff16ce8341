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

//! RFC 3161 `TSTInfo` declarations, expressed with the same rasn family of
//! crates used for the OCSP and PKIX structures.

use rasn::prelude::*;
use rasn_pkix::{AlgorithmIdentifier, Extensions, GeneralName};

/// `MessageImprint ::= SEQUENCE { hashAlgorithm AlgorithmIdentifier,
/// hashedMessage OCTET STRING }`
#[derive(AsnType, Clone, Debug, Decode, Encode, Eq, PartialEq)]
pub struct MessageImprint {
    /// The digest algorithm of the imprint.
    pub hash_algorithm: AlgorithmIdentifier,

    /// The digest of the timestamped data.
    pub hashed_message: OctetString,
}

/// `Accuracy ::= SEQUENCE { seconds INTEGER OPTIONAL, millis [0] INTEGER
/// OPTIONAL, micros [1] INTEGER OPTIONAL }`
#[derive(AsnType, Clone, Debug, Decode, Encode, Eq, PartialEq)]
pub struct Accuracy {
    /// Accuracy in whole seconds.
    pub seconds: Option<Integer>,

    /// Accuracy in milliseconds.
    #[rasn(tag(0))]
    pub millis: Option<Integer>,

    /// Accuracy in microseconds.
    #[rasn(tag(1))]
    pub micros: Option<Integer>,
}

/// `TSTInfo` as defined in RFC 3161 §2.4.2.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq)]
pub struct TstInfo {
    /// Version of the time-stamp token (always 1).
    pub version: Integer,

    /// The TSA policy under which the token was produced.
    pub policy: ObjectIdentifier,

    /// The imprint of the timestamped data.
    pub message_imprint: MessageImprint,

    /// TSA-unique serial number of the token.
    pub serial_number: Integer,

    /// The time at which the token was produced.
    pub gen_time: GeneralizedTime,

    /// Declared accuracy of `gen_time`.
    pub accuracy: Option<Accuracy>,

    /// Whether tokens from this TSA are strictly ordered by `gen_time`.
    #[rasn(default)]
    pub ordering: bool,

    /// Nonce echoed from the request, if one was supplied.
    pub nonce: Option<Integer>,

    /// Name of the TSA.
    #[rasn(tag(explicit(0)))]
    pub tsa: Option<GeneralName>,

    /// Additional extensions.
    #[rasn(tag(1))]
    pub extensions: Option<Extensions>,
}
