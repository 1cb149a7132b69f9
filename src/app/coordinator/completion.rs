//! Job classification and completion checks

use std::fmt;

use serde_json::Value;

use crate::output::{EnvelopeShape, JobEnvelope};

/// Where a submitted job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Runner or wheel job executed by the master
    Master,
    /// Job fanned out to minions
    Minion,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Master => f.write_str("master"),
            JobKind::Minion => f.write_str("minion"),
        }
    }
}

/// A submitted job being polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub jid: String,
    pub kind: JobKind,
}

/// Classify a submission response from `return[0]`
///
/// `tag` and `jid` together mark a master job, `jid` alone a minion job.
/// Anything else is an error response and yields `None`.
pub fn classify(response: &Value) -> Option<JobHandle> {
    let first = response.get("return")?.get(0)?.as_object()?;
    let jid = match first.get("jid")? {
        Value::String(jid) => jid.clone(),
        Value::Number(jid) => jid.to_string(),
        _ => return None,
    };

    let kind = if first.contains_key("tag") {
        JobKind::Master
    } else {
        JobKind::Minion
    };
    Some(JobHandle { jid, kind })
}

/// Whether the job described by a lookup response has finished
///
/// A minion job counts returns only once the lookup carries its target
/// list. A lookup reporting `Error` is never complete.
pub fn is_complete(kind: JobKind, lookup: &JobEnvelope<'_>) -> bool {
    if lookup.info().is_none() || lookup.has_error() {
        return false;
    }
    match kind {
        JobKind::Master => true,
        JobKind::Minion => {
            lookup.shape() == EnvelopeShape::MinionDirect
                && lookup.returned_count() >= lookup.targeted_minions().len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_master() {
        let response = json!({"return": [{"tag": "salt/run/2024", "jid": "2024"}]});
        assert_eq!(
            classify(&response),
            Some(JobHandle {
                jid: "2024".to_string(),
                kind: JobKind::Master
            })
        );
    }

    #[test]
    fn test_classify_minion() {
        let response = json!({"return": [{"jid": "2024", "minions": ["web01"]}]});
        assert_eq!(classify(&response).map(|job| job.kind), Some(JobKind::Minion));
    }

    #[test]
    fn test_classify_error() {
        assert_eq!(classify(&json!({"return": ["Authentication failure"]})), None);
        assert_eq!(classify(&json!({"return": [{}]})), None);
        assert_eq!(classify(&json!({"return": []})), None);
        assert_eq!(classify(&json!({})), None);
        assert_eq!(classify(&json!({"return": [{"tag": "only-tag"}]})), None);
    }

    #[test]
    fn test_master_completion() {
        let pending = json!({"info": [{"jid": "1", "Error": "no job"}], "return": [{}]});
        assert!(!is_complete(JobKind::Master, &JobEnvelope::new(&pending)));

        let done = json!({"info": [{"jid": "1", "Function": "runner.jobs.list_jobs"}], "return": [{}]});
        assert!(is_complete(JobKind::Master, &JobEnvelope::new(&done)));
    }

    #[test]
    fn test_minion_completion_counts() {
        let partial = json!({"info": [{"Minions": ["a", "b"]}], "return": [{"a": true}]});
        assert!(!is_complete(JobKind::Minion, &JobEnvelope::new(&partial)));

        let all = json!({"info": [{"Minions": ["a", "b"]}], "return": [{"a": true, "b": true}]});
        assert!(is_complete(JobKind::Minion, &JobEnvelope::new(&all)));

        let none_targeted = json!({"info": [{"Minions": []}], "return": [{}]});
        assert!(is_complete(JobKind::Minion, &JobEnvelope::new(&none_targeted)));
    }

    #[test]
    fn test_minion_lookup_without_targets_is_pending() {
        let not_found = json!({
            "info": [{"jid": "2024", "Error": "Cannot contact returner or no job with this jid"}],
            "return": [{}]
        });
        assert!(!is_complete(JobKind::Minion, &JobEnvelope::new(&not_found)));

        let errored = json!({"info": [{"Minions": ["a"], "Error": "no job"}], "return": [{"a": true}]});
        assert!(!is_complete(JobKind::Minion, &JobEnvelope::new(&errored)));

        let no_info = json!({"return": [{}]});
        assert!(!is_complete(JobKind::Minion, &JobEnvelope::new(&no_info)));
    }
}
