/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::PROGRAM_LABEL;

/// Receives every formatted error message a session reports
pub type ErrorHandler = Box<dyn FnMut(&str) + Send>;

/// Notification sink for session failures.
///
/// Messages go to the registered handler, or to stderr when there is none.
#[derive(Default)]
pub(crate) struct ErrorReporter {
    handler: Option<ErrorHandler>,
}

impl ErrorReporter {
    pub fn set_handler(&mut self, handler: Option<ErrorHandler>) {
        self.handler = handler;
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn report(&mut self, message: &str) {
        match self.handler.as_mut() {
            Some(handler) => handler(message),
            None => {
                log::warn!("{}", message);
                eprintln!("{} error - {}", PROGRAM_LABEL, message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn handler_receives_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut reporter = ErrorReporter::default();
        reporter.set_handler(Some(Box::new(move |msg: &str| {
            sink.lock().unwrap().push(msg.to_string())
        })));
        assert!(reporter.has_handler());
        reporter.report("No shared secret");
        reporter.report("No API key");
        assert_eq!(*seen.lock().unwrap(), vec!["No shared secret", "No API key"]);
    }

    #[test]
    fn default_report_does_not_panic() {
        let mut reporter = ErrorReporter::default();
        reporter.report("something failed");
    }
}
