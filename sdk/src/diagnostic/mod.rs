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

//! The frozen snapshot of everything discovered during a validation run.
//!
//! `DiagnosticData` is pure data: serializable, id-cross-referenced, and
//! the sole input of the policy engine. It is built once per run and never
//! mutated afterwards.

mod builder;
pub use builder::DiagnosticDataBuilder;

mod data;
pub use data::{
    CertificateDiagnostic, CertificateProvenance, CertificateRevocationDiagnostic,
    DiagnosticData, OrphanTokenDiagnostic, OrphanTokenType, RevocationDiagnostic,
    SignatureDiagnostic, TimestampDiagnostic,
};
