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

//! Base 64 encoding and decoding with a standardized configuration.

use base64::{prelude::BASE64_STANDARD, DecodeError, Engine as _};

/// Encode arbitrary octets as base 64 using the standard alphabet with
/// padding.
pub fn encode(data: &[u8]) -> String {
    BASE64_STANDARD.encode(data)
}

/// Decode from base 64 using the standard alphabet with padding.
pub fn decode(data: &str) -> Result<Vec<u8>, DecodeError> {
    BASE64_STANDARD.decode(data)
}
