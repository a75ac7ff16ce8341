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

//! Pluggable signature format handling.
//!
//! Format parsers live outside this crate; they plug in through
//! [`SignatureFormatHandler`] and an explicit [`FormatHandlerRegistry`]
//! built at startup and passed by reference to the validator.

use ades_crypto::time_stamp::TimestampToken;
use serde::{Deserialize, Serialize};

use crate::{document::Document, signature::AdvancedSignature, Result};

/// The signature families handled by the validation process.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SignatureForm {
    /// XML advanced electronic signature.
    XAdES,

    /// CMS advanced electronic signature.
    CAdES,

    /// PDF advanced electronic signature.
    PAdES,

    /// JSON advanced electronic signature.
    JAdES,
}

/// A format-specific extractor turning a document into signatures and
/// detached timestamps.
pub trait SignatureFormatHandler {
    /// The signature family this handler produces.
    fn form(&self) -> SignatureForm;

    /// Return `true` if the handler recognizes the document.
    fn is_supported(&self, document: &Document) -> bool;

    /// Extract every signature of the document, including nested
    /// counter-signatures (owned by their parent signature).
    fn extract_signatures(&self, document: &Document) -> Result<Vec<AdvancedSignature>>;

    /// Extract timestamps detached from any signature (ASiC archival
    /// timestamps).
    fn extract_detached_timestamps(&self, _document: &Document) -> Result<Vec<TimestampToken>> {
        Ok(vec![])
    }
}

/// An explicit registry of format handlers.
///
/// Built once at startup; the validator consults it to find the handler for
/// a document.
#[derive(Default)]
pub struct FormatHandlerRegistry {
    handlers: Vec<Box<dyn SignatureFormatHandler>>,
}

impl FormatHandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers are consulted in registration order.
    pub fn register(&mut self, handler: Box<dyn SignatureFormatHandler>) {
        self.handlers.push(handler);
    }

    /// Return the first handler recognizing the document.
    pub fn handler_for(&self, document: &Document) -> Option<&dyn SignatureFormatHandler> {
        self.handlers
            .iter()
            .map(|h| h.as_ref())
            .find(|h| h.is_supported(document))
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Return `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
