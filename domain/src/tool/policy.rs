//! Process-wide tool policy.
//!
//! [`ToolPolicy`] is handed to the invoker when it is built, so two invokers
//! in the same process (or two tests) can run under different policies.

use super::entities::SafetyLevel;
use super::value_objects::ToolError;
use serde::{Deserialize, Serialize};

/// Global gating applied to every call after confirmation is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPolicy {
    /// Only `ReadOnly` tools may run
    pub read_only: bool,
    /// `Destructive` tools never run, even when confirmed
    pub disable_destructive: bool,
}

impl ToolPolicy {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            disable_destructive: true,
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_disable_destructive(mut self, disable: bool) -> Self {
        self.disable_destructive = disable;
        self
    }

    /// Check whether a tool of the given safety level may run.
    ///
    /// Confirmation is not part of this check; the invoker verifies it first.
    pub fn check(&self, tool: &str, safety: SafetyLevel) -> Result<(), ToolError> {
        if self.read_only && !safety.is_read_only() {
            return Err(ToolError::forbidden(
                format!("tool '{}'", tool),
                format!("server is read-only and this tool is {}", safety),
            ));
        }
        if self.disable_destructive && safety.is_destructive() {
            return Err(ToolError::forbidden(
                format!("tool '{}'", tool),
                "destructive actions are disabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_allows_everything() {
        let policy = ToolPolicy::default();
        for safety in [
            SafetyLevel::ReadOnly,
            SafetyLevel::Write,
            SafetyLevel::RiskyWrite,
            SafetyLevel::Destructive,
        ] {
            assert!(policy.check("t.x", safety).is_ok());
        }
    }

    #[test]
    fn test_read_only_policy() {
        let policy = ToolPolicy::default().with_read_only(true);
        assert!(policy.check("t.get", SafetyLevel::ReadOnly).is_ok());
        let err = policy.check("t.label", SafetyLevel::Write).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert!(err.to_string().contains("t.label"));
    }

    #[test]
    fn test_destructive_disabled_policy() {
        let policy = ToolPolicy::default().with_disable_destructive(true);
        assert!(policy.check("t.scale", SafetyLevel::RiskyWrite).is_ok());
        assert!(policy.check("t.delete", SafetyLevel::Destructive).is_err());
    }
}
