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

//! The validation policy and the chain-of-checks engine evaluating it.

mod bbb;
pub use bbb::{execute_signature_bbb, execute_timestamp_bbb, BbbResult, BbbTokenType};

mod chain;
pub use chain::{Chain, ChainResult, CheckItem, CheckStatus, Conclusion};

mod cryptographic;
pub use cryptographic::{check_cryptographic_constraints, CryptographicInput};

mod executor;
pub use executor::ValidationProcessExecutor;

mod indication;
pub use indication::{Indication, SubIndication};

mod policy;
pub use policy::{
    Context, CryptographicConstraint, Level, SubContext, ValidationPolicy,
};

mod rac;
pub use rac::{RacResult, RevocationAcceptanceChecker};
