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

use std::fmt::Debug;

use log::debug;

use crate::LogItem;

/// A `StatusTracker` is used in the validation logic of the ades crates to
/// control error-handling behavior and aggregate log messages as they are
/// generated.
#[derive(Debug, Default)]
pub struct StatusTracker {
    error_behavior: ErrorBehavior,
    logged_items: Vec<LogItem>,
}

impl StatusTracker {
    /// Returns a [`StatusTracker`] with the specified [`ErrorBehavior`].
    pub fn with_error_behavior(error_behavior: ErrorBehavior) -> Self {
        Self {
            error_behavior,
            logged_items: vec![],
        }
    }

    /// Returns the current list of validation log items.
    pub fn logged_items(&self) -> &[LogItem] {
        &self.logged_items
    }

    /// Appends the contents of another [`StatusTracker`] to this list of
    /// validation log items.
    pub fn append(&mut self, other: &StatusTracker) {
        for log_item in other.logged_items() {
            self.add_non_error(log_item.clone());
        }
    }

    /// Adds a non-error [`LogItem`] to this status tracker.
    ///
    /// Primarily intended for use by [`LogItem::success()`]
    /// or [`LogItem::informational()`].
    pub fn add_non_error(&mut self, log_item: LogItem) {
        debug!("Validation info: {log_item:#?}");
        self.logged_items.push(log_item);
    }

    /// Adds an error-case [`LogItem`] to this status tracker.
    ///
    /// Will return `Err(err)` if configured to stop immediately on errors or
    /// `Ok(err)` if configured to continue on errors. _(See [`ErrorBehavior`].)_
    ///
    /// Primarily intended for use by [`LogItem::failure()`].
    pub fn add_error<E>(&mut self, log_item: LogItem, err: E) -> Result<E, E> {
        self.logged_items.push(log_item);

        match self.error_behavior {
            ErrorBehavior::StopOnFirstError => Err(err),
            ErrorBehavior::ContinueWhenPossible => Ok(err),
        }
    }

    /// Returns the [`LogItem`]s that have error conditions (`err_val` is
    /// populated).
    pub fn filter_errors(&self) -> impl Iterator<Item = &LogItem> {
        self.logged_items()
            .iter()
            .filter(|item| item.err_val.is_some())
    }

    /// Returns `true` if the validation log contains a specific status code.
    pub fn has_status(&self, val: &str) -> bool {
        self.logged_items().iter().any(|vi| {
            if let Some(vs) = &vi.validation_status {
                vs == val
            } else {
                false
            }
        })
    }

    /// Returns `true` if the validation log contains a specific error.
    pub fn has_error<E: Debug>(&self, err: E) -> bool {
        let err_type = format!("{:?}", &err);
        self.logged_items().iter().any(|vi| {
            if let Some(e) = &vi.err_val {
                e == &err_type
            } else {
                false
            }
        })
    }

    /// Returns `true` if the validation log contains any error.
    pub fn has_any_error(&self) -> bool {
        self.filter_errors().next().is_some()
    }
}

/// `ErrorBehavior` configures the behavior of [`StatusTracker`] when its
/// [`add_error`] function is called.
///
/// [`add_error`]: StatusTracker::add_error
#[derive(Debug, Eq, PartialEq)]
pub enum ErrorBehavior {
    /// If an error is encountered, stop validation immediately.
    StopOnFirstError,

    /// If an error is encountered, log it and continue validation as much as
    /// possible.
    ContinueWhenPossible,
}

impl Default for ErrorBehavior {
    fn default() -> Self {
        Self::ContinueWhenPossible
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::fmt::{self, Display, Formatter};

    use crate::{log_item, ErrorBehavior, StatusTracker};

    #[derive(Debug, Eq, PartialEq)]
    struct SampleError {}

    impl Display for SampleError {
        fn fmt(&self, f: &mut Formatter) -> fmt::Result {
            write!(f, "SampleError")
        }
    }

    #[test]
    fn aggregates_errors() {
        let mut tracker = StatusTracker::default();

        // Add an item without an error.
        log_item!("test1", "test item 1", "test func").success(&mut tracker);

        // Add another item with an error. Should not stop.
        log_item!("test2", "test item 2", "test func")
            .validation_status("foo.bar")
            .failure(&mut tracker, SampleError {})
            .unwrap();

        assert_eq!(tracker.logged_items().len(), 2);

        assert!(tracker.has_status("foo.bar"));
        assert!(!tracker.has_status("blah"));

        assert!(tracker.has_error(SampleError {}));
        assert!(!tracker.has_error("Something Else"));

        let errors: Vec<&crate::LogItem> = tracker.filter_errors().collect();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn stops_on_first_error() {
        let mut tracker = StatusTracker::with_error_behavior(ErrorBehavior::StopOnFirstError);

        log_item!("test1", "test item 1", "test func").success(&mut tracker);

        let err = log_item!("test2", "test item 2", "test func")
            .failure(&mut tracker, SampleError {})
            .unwrap_err();

        assert_eq!(err, SampleError {});
        assert_eq!(tracker.logged_items().len(), 2);
    }

    #[test]
    fn append() {
        let mut tracker1 = StatusTracker::default();
        let mut tracker2 = StatusTracker::default();

        log_item!("test1", "test item 1", "test func").success(&mut tracker1);

        log_item!("test2", "test item 2", "test func")
            .failure(&mut tracker2, SampleError {})
            .unwrap();

        tracker1.append(&tracker2);

        assert_eq!(tracker1.logged_items().len(), 2);
        assert_eq!(tracker2.logged_items().len(), 1);
    }
}
