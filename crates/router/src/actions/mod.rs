// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in actions. Each wraps one external collaborator (a scheduler, a
//! subprocess, an HTTP client) behind the [`crate::action::Action`] trait.

pub mod git_commit;
pub mod git_push;
pub mod notify;
pub mod scheduler;
pub mod spawn_agent;

pub use git_commit::GitCommitAction;
pub use git_push::GitPushAction;
pub use notify::{NotifyTarget, SendNotificationAction};
pub use run_test::RunTestAction;
pub use scheduler::{Scheduler, SchedulerStats};
pub use spawn_agent::SpawnAgentAction;

/// Render `{{field}}` placeholders in `template` from the event payload.
/// Unknown placeholders are left verbatim, matching the teacher's tolerant
/// notification templating rather than erroring on a typo.
pub(crate) fn substitute_template(template: &str, payload: &std::collections::HashMap<String, serde_json::Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let key = after[..end].trim();
        let replacement = payload
            .get(key)
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| format!("{{{{{key}}}}}"));
        out.push_str(&replacement);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}
