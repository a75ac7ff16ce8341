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

//! The generic chain-of-checks engine.
//!
//! A [`Chain`] is an ordered list of named checks. Each check is an input
//! snapshot already reduced to a boolean; the chain consults the check's
//! [`Level`] to decide whether a failure concludes the chain or is recorded
//! as a warning or note. The first `Fail`-level failure short-circuits the
//! chain; later checks are not recorded.

use serde::{Deserialize, Serialize};

use crate::process::{Indication, Level, SubIndication};

/// Outcome of one check within a chain.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CheckStatus {
    /// The check succeeded.
    Pass,

    /// The check failed and concluded the chain.
    Fail,

    /// The check failed; recorded as a warning.
    Warn,

    /// The check failed; recorded as a note.
    Inform,

    /// The check was not evaluated (policy level Ignore).
    Ignored,
}

/// Record of one evaluated check.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CheckItem {
    /// Name of the check.
    pub name: String,

    /// Outcome.
    pub status: CheckStatus,

    /// Failure message, when the check did not pass.
    pub message: Option<String>,

    /// Indication this check concluded with, when it failed the chain.
    pub indication: Option<Indication>,

    /// Sub-indication this check concluded with, when it failed the chain.
    pub sub_indication: Option<SubIndication>,
}

/// Final verdict of a chain.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Conclusion {
    /// Top-level verdict.
    pub indication: Indication,

    /// Refinement of a non-passed verdict.
    pub sub_indication: Option<SubIndication>,

    /// Messages of concluding failures.
    pub errors: Vec<String>,

    /// Messages of warn-level failures.
    pub warnings: Vec<String>,

    /// Messages of inform-level failures.
    pub infos: Vec<String>,
}

impl Conclusion {
    /// A passed conclusion without messages.
    pub fn passed() -> Self {
        Conclusion {
            indication: Indication::Passed,
            sub_indication: None,
            errors: vec![],
            warnings: vec![],
            infos: vec![],
        }
    }

    /// Return `true` for a passed conclusion.
    pub fn is_passed(&self) -> bool {
        self.indication.is_passed()
    }
}

/// Executed chain: the ordered check records plus the conclusion.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChainResult {
    /// Title of the chain (sub-process name).
    pub title: String,

    /// Final verdict.
    pub conclusion: Conclusion,

    /// The evaluated checks, in order.
    pub items: Vec<CheckItem>,
}

impl ChainResult {
    /// Return `true` for a passed conclusion.
    pub fn is_passed(&self) -> bool {
        self.conclusion.is_passed()
    }
}

/// Builder executing checks in order.
pub struct Chain {
    title: String,
    items: Vec<CheckItem>,
    failure: Option<(Indication, Option<SubIndication>)>,
    errors: Vec<String>,
    warnings: Vec<String>,
    infos: Vec<String>,
}

impl Chain {
    /// Start a chain.
    pub fn new<S: Into<String>>(title: S) -> Self {
        Chain {
            title: title.into(),
            items: vec![],
            failure: None,
            errors: vec![],
            warnings: vec![],
            infos: vec![],
        }
    }

    /// Evaluate one check.
    ///
    /// `passed` is the outcome of the check over its input snapshot;
    /// `level` governs what a failure does to the chain; `indication` and
    /// `sub_indication` are the fixed conclusion this check type maps to
    /// when it concludes the chain. After a concluding failure, further
    /// checks are not recorded.
    #[allow(clippy::too_many_arguments)]
    pub fn check(
        &mut self,
        name: &str,
        passed: bool,
        level: Level,
        indication: Indication,
        sub_indication: Option<SubIndication>,
        message: &str,
    ) {
        if self.failure.is_some() {
            return;
        }

        if level == Level::Ignore {
            self.items.push(CheckItem {
                name: name.to_string(),
                status: CheckStatus::Ignored,
                message: None,
                indication: None,
                sub_indication: None,
            });
            return;
        }

        if passed {
            self.items.push(CheckItem {
                name: name.to_string(),
                status: CheckStatus::Pass,
                message: None,
                indication: None,
                sub_indication: None,
            });
            return;
        }

        match level {
            Level::Fail => {
                self.items.push(CheckItem {
                    name: name.to_string(),
                    status: CheckStatus::Fail,
                    message: Some(message.to_string()),
                    indication: Some(indication),
                    sub_indication,
                });
                self.errors.push(message.to_string());
                self.failure = Some((indication, sub_indication));
            }
            Level::Warn => {
                self.items.push(CheckItem {
                    name: name.to_string(),
                    status: CheckStatus::Warn,
                    message: Some(message.to_string()),
                    indication: None,
                    sub_indication: None,
                });
                self.warnings.push(message.to_string());
            }
            Level::Inform => {
                self.items.push(CheckItem {
                    name: name.to_string(),
                    status: CheckStatus::Inform,
                    message: Some(message.to_string()),
                    indication: None,
                    sub_indication: None,
                });
                self.infos.push(message.to_string());
            }
            Level::Ignore => {}
        }
    }

    /// Return `true` if a check already concluded the chain.
    pub fn is_concluded(&self) -> bool {
        self.failure.is_some()
    }

    /// Finish the chain and produce its result.
    pub fn conclude(self) -> ChainResult {
        let conclusion = match self.failure {
            Some((indication, sub_indication)) => Conclusion {
                indication,
                sub_indication,
                errors: self.errors,
                warnings: self.warnings,
                infos: self.infos,
            },
            None => Conclusion {
                indication: Indication::Passed,
                sub_indication: None,
                errors: self.errors,
                warnings: self.warnings,
                infos: self.infos,
            },
        };

        ChainResult {
            title: self.title,
            conclusion,
            items: self.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_pass() {
        let mut chain = Chain::new("test");
        chain.check("a", true, Level::Fail, Indication::Failed, None, "a failed");
        chain.check("b", true, Level::Fail, Indication::Failed, None, "b failed");

        let result = chain.conclude();
        assert!(result.is_passed());
        assert_eq!(result.items.len(), 2);
    }

    #[test]
    fn fail_short_circuits() {
        let mut chain = Chain::new("test");
        chain.check("a", true, Level::Fail, Indication::Failed, None, "a failed");
        chain.check(
            "b",
            false,
            Level::Fail,
            Indication::Indeterminate,
            Some(SubIndication::TryLater),
            "b failed",
        );
        chain.check("c", true, Level::Fail, Indication::Failed, None, "c failed");

        let result = chain.conclude();
        assert_eq!(result.conclusion.indication, Indication::Indeterminate);
        assert_eq!(
            result.conclusion.sub_indication,
            Some(SubIndication::TryLater)
        );

        // "c" is not recorded after the concluding failure.
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.conclusion.errors, vec!["b failed".to_string()]);
    }

    #[test]
    fn warn_and_inform_continue() {
        let mut chain = Chain::new("test");
        chain.check(
            "a",
            false,
            Level::Warn,
            Indication::Failed,
            None,
            "a warning",
        );
        chain.check(
            "b",
            false,
            Level::Inform,
            Indication::Failed,
            None,
            "b info",
        );
        chain.check("c", true, Level::Fail, Indication::Failed, None, "c failed");

        let result = chain.conclude();
        assert!(result.is_passed());
        assert_eq!(result.conclusion.warnings, vec!["a warning".to_string()]);
        assert_eq!(result.conclusion.infos, vec!["b info".to_string()]);
        assert_eq!(result.items.len(), 3);
    }

    #[test]
    fn ignore_skips_evaluation() {
        let mut chain = Chain::new("test");
        chain.check(
            "a",
            false,
            Level::Ignore,
            Indication::Failed,
            None,
            "never seen",
        );

        let result = chain.conclude();
        assert!(result.is_passed());
        assert_eq!(result.items[0].status, CheckStatus::Ignored);
    }
}
