use crate::types::{ListenerStatus, OperationOutcome, SimpleResult};

////////////////////////////////////////////////////////////
// Operation result aggregation
////////////////////////////////////////////////////////////

/// Collapsed view of a lifecycle command's outcome, ready for a single
/// user-facing notification. A service-level result is carried verbatim
/// and never counted as listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<(String, String)>,
    pub simple: Option<SimpleResult>,
}

impl OutcomeSummary {
    pub fn is_error(&self) -> bool {
        match &self.simple {
            Some(simple) => !simple.success,
            None => self.failed > 0,
        }
    }

    /// Render the notification line for the given action label.
    pub fn render(&self, action: &str) -> String {
        if let Some(simple) = &self.simple {
            let mut line = if !simple.success {
                format!("{} failed", action)
            } else if simple.changed {
                format!("{} completed", action)
            } else {
                format!("{}: no change", action)
            };
            if let Some(message) = &simple.message {
                line = format!("{} ({})", line, message);
            }
            return line;
        }

        if self.failed == 0 {
            format!("{}, {} listeners OK", action, self.succeeded)
        } else {
            format!(
                "{}. {} listeners OK, {} listeners failed",
                action, self.succeeded, self.failed
            )
        }
    }
}

/// Classify a decoded outcome into succeeded/failed counts. Failure
/// reasons are collected per listener; they arrive inside a 200-style
/// response and are never treated as transport errors.
pub fn aggregate(outcome: &OperationOutcome) -> OutcomeSummary {
    match outcome {
        OperationOutcome::Simple(simple) => {
            log::info!(
                "service-level outcome: success={} changed={}",
                simple.success,
                simple.changed
            );
            OutcomeSummary {
                succeeded: 0,
                failed: 0,
                failures: vec![],
                simple: Some(simple.clone()),
            }
        }
        OperationOutcome::PerListener(map) => {
            let mut succeeded = 0;
            let mut failed = 0;
            let mut failures = vec![];

            for (name, status) in map {
                match status {
                    ListenerStatus::Ok(_) => succeeded += 1,
                    ListenerStatus::Err { message } => {
                        failed += 1;
                        failures.push((name.clone(), message.clone()));
                    }
                }
            }
            failures.sort();

            OutcomeSummary {
                succeeded,
                failed,
                failures,
                simple: None,
            }
        }
    }
}
