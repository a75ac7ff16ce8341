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

//! Byte-addressable documents handed to the validator.

use std::{io::Cursor, sync::Arc};

/// A byte-addressable document with an optional name and mime type.
///
/// Cloning is cheap; the content is shared.
#[derive(Clone, Debug)]
pub struct Document {
    content: Arc<Vec<u8>>,
    name: Option<String>,
    mime_type: Option<String>,
}

impl Document {
    /// Create a document from owned bytes.
    pub fn new(content: Vec<u8>) -> Self {
        Document {
            content: Arc::new(content),
            name: None,
            mime_type: None,
        }
    }

    /// Attach a name to the document.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a mime type to the document.
    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The document content.
    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    /// A reader over the document content.
    pub fn open_stream(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.content)
    }

    /// The document name, if known.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The document mime type, if known.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn accessors() {
        let doc = Document::new(b"hello".to_vec())
            .with_name("doc.txt")
            .with_mime_type("text/plain");

        assert_eq!(doc.bytes(), b"hello");
        assert_eq!(doc.name(), Some("doc.txt"));
        assert_eq!(doc.mime_type(), Some("text/plain"));

        let mut out = String::new();
        doc.open_stream().read_to_string(&mut out).ok();
        assert_eq!(out, "hello");
    }
}
