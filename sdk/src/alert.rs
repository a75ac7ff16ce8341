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

//! Escalation policy for evidence-gap conditions.

use log::{error, warn};

use crate::{Error, Result};

/// A condition reported through a [`StatusAlert`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenStatus {
    /// Human-readable description of the condition.
    pub message: String,

    /// Ids of the tokens the condition relates to.
    pub related_token_ids: Vec<String>,
}

impl TokenStatus {
    /// Create a status for a set of related tokens.
    pub fn new<S: Into<String>>(message: S, related_token_ids: Vec<String>) -> Self {
        TokenStatus {
            message: message.into(),
            related_token_ids,
        }
    }

    fn render(&self) -> String {
        if self.related_token_ids.is_empty() {
            self.message.clone()
        } else {
            format!(
                "{} [tokens: {}]",
                self.message,
                self.related_token_ids.join(", ")
            )
        }
    }
}

/// How an evidence-gap condition escalates.
///
/// Passed explicitly into the validation/extension configuration and
/// dispatched through [`handle`](Self::handle); conditions found during
/// pure validation are recorded in the diagnostic data instead and never
/// pass through an alert.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusAlert {
    /// Escalate the condition to a hard failure.
    Throw,

    /// Log the condition at warning level and continue.
    LogWarn,

    /// Log the condition at error level and continue.
    LogError,

    /// Ignore the condition.
    Ignore,
}

impl StatusAlert {
    /// Apply this alert policy to a condition.
    pub fn handle(&self, status: TokenStatus) -> Result<()> {
        match self {
            StatusAlert::Throw => Err(Error::AlertFailure(status.render())),
            StatusAlert::LogWarn => {
                warn!("{}", status.render());
                Ok(())
            }
            StatusAlert::LogError => {
                error!("{}", status.render());
                Ok(())
            }
            StatusAlert::Ignore => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn throw_escalates() {
        let status = TokenStatus::new("missing revocation data", vec!["abc".to_string()]);
        let err = StatusAlert::Throw.handle(status).unwrap_err();
        assert!(err.to_string().contains("missing revocation data"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn log_variants_do_not_escalate() {
        let status = TokenStatus::new("uncovered POE", vec![]);
        assert!(StatusAlert::LogWarn.handle(status.clone()).is_ok());
        assert!(StatusAlert::LogError.handle(status.clone()).is_ok());
        assert!(StatusAlert::Ignore.handle(status).is_ok());
    }
}
