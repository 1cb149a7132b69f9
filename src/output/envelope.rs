//! Normalized view of salt-api job responses
//!
//! Job status responses come in two shapes. Jobs fanned out to minions carry
//! `info[0].Minions` and keep each minion's state results directly under
//! `Result[minion].return`. Runner and orchestrate jobs run on the master and
//! nest one level deeper, under `Result[minion].return.return.data[minion]`.
//! The shape is detected once here so renderers never check for it.

use serde_json::{Map, Value};

use crate::errors::{RenderError, RenderResult};

/// Which nesting a job status response uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `info[0].Minions` present; results under `Result[minion].return`
    MinionDirect,
    /// Master-side job; results under `Result[minion].return.return.data[minion]`
    MasterNested,
}

/// Borrowed, shape-aware view over a response payload
#[derive(Debug, Clone, Copy)]
pub struct JobEnvelope<'a> {
    info: Option<&'a Map<String, Value>>,
    primary: Option<&'a Value>,
    shape: EnvelopeShape,
}

impl<'a> JobEnvelope<'a> {
    pub fn new(raw: &'a Value) -> Self {
        let info = raw
            .get("info")
            .and_then(|info| info.get(0))
            .and_then(Value::as_object);
        let primary = raw.get("return").and_then(|ret| ret.get(0));
        let shape = if info.map_or(false, |info| info.contains_key("Minions")) {
            EnvelopeShape::MinionDirect
        } else {
            EnvelopeShape::MasterNested
        };

        Self {
            info,
            primary,
            shape,
        }
    }

    pub fn shape(&self) -> EnvelopeShape {
        self.shape
    }

    /// The `info[0]` side block of a job lookup
    pub fn info(&self) -> Option<&'a Map<String, Value>> {
        self.info
    }

    /// `return[0]`, the job's primary return collection
    pub fn primary_return(&self) -> Option<&'a Value> {
        self.primary
    }

    /// True when nothing came back and there is no info block to explain why
    pub fn is_empty_result(&self) -> bool {
        let empty_return = match self.primary {
            None | Some(Value::Null) => true,
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        };
        empty_return && self.info.is_none()
    }

    /// Salt function the job ran, from `info[0].Function`
    pub fn function(&self) -> Option<&'a str> {
        self.info?.get("Function")?.as_str()
    }

    pub fn jid(&self) -> Option<&'a str> {
        self.info?.get("jid")?.as_str()
    }

    /// Master jobs report `Error` until the job shows up in the job cache
    pub fn has_error(&self) -> bool {
        self.info.map_or(false, |info| info.contains_key("Error"))
    }

    /// Minions the job was sent to
    pub fn targeted_minions(&self) -> Vec<&'a str> {
        self.info
            .and_then(|info| info.get("Minions"))
            .and_then(Value::as_array)
            .map(|minions| minions.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of minions present in `return[0]`
    pub fn returned_count(&self) -> usize {
        match self.primary {
            Some(Value::Object(map)) => map.len(),
            _ => 0,
        }
    }

    /// Per-minion results, `info[0].Result`
    pub fn results(&self) -> RenderResult<&'a Map<String, Value>> {
        let info = self.info.ok_or_else(|| missing("info[0]"))?;
        let result = info.get("Result").ok_or_else(|| missing("info[0].Result"))?;
        result.as_object().ok_or_else(|| RenderError::UnexpectedShape {
            field: "info[0].Result".to_string(),
            expected: "object",
        })
    }

    /// The state results of one minion, with the shape's nesting removed
    pub fn minion_states(&self, minion: &str, entry: &'a Value) -> RenderResult<&'a Value> {
        let states = match self.shape {
            EnvelopeShape::MinionDirect => entry.get("return"),
            EnvelopeShape::MasterNested => entry
                .get("return")
                .and_then(|ret| ret.get("return"))
                .and_then(|ret| ret.get("data"))
                .and_then(|data| data.get(minion)),
        };
        states.ok_or_else(|| match self.shape {
            EnvelopeShape::MinionDirect => missing(&format!("Result.{}.return", minion)),
            EnvelopeShape::MasterNested => {
                missing(&format!("Result.{}.return.return.data.{}", minion, minion))
            }
        })
    }

    /// Targeted minions with no entry in the results
    pub fn missing_minions(&self) -> Vec<&'a str> {
        let results = self
            .info
            .and_then(|info| info.get("Result"))
            .and_then(Value::as_object);
        self.targeted_minions()
            .into_iter()
            .filter(|minion| results.map_or(true, |results| !results.contains_key(*minion)))
            .collect()
    }
}

fn missing(field: &str) -> RenderError {
    RenderError::MissingField {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minion_lookup() -> Value {
        json!({
            "info": [{
                "jid": "20240101120000123456",
                "Function": "test.ping",
                "Minions": ["web01", "web02", "db01"],
                "Result": {
                    "web01": {"return": true, "success": true},
                    "web02": {"return": true, "success": true}
                }
            }],
            "return": [{"web01": true, "web02": true}]
        })
    }

    #[test]
    fn test_minion_shape_detection() {
        let payload = minion_lookup();
        let envelope = JobEnvelope::new(&payload);
        assert_eq!(envelope.shape(), EnvelopeShape::MinionDirect);
        assert_eq!(envelope.function(), Some("test.ping"));
        assert_eq!(envelope.jid(), Some("20240101120000123456"));
        assert_eq!(envelope.targeted_minions(), vec!["web01", "web02", "db01"]);
        assert_eq!(envelope.returned_count(), 2);
        assert_eq!(envelope.missing_minions(), vec!["db01"]);
        assert!(!envelope.has_error());
        assert!(!envelope.is_empty_result());
    }

    #[test]
    fn test_master_shape_detection() {
        let payload = json!({
            "info": [{"jid": "2024", "Error": "Cannot contact returner or no job with this jid"}],
            "return": [{}]
        });
        let envelope = JobEnvelope::new(&payload);
        assert_eq!(envelope.shape(), EnvelopeShape::MasterNested);
        assert!(envelope.has_error());
        assert!(envelope.targeted_minions().is_empty());
        assert!(!envelope.is_empty_result());
    }

    #[test]
    fn test_empty_result_guard() {
        let payload = json!({"return": [{}]});
        assert!(JobEnvelope::new(&payload).is_empty_result());
        let payload = json!({"return": []});
        assert!(JobEnvelope::new(&payload).is_empty_result());
        let payload = json!({"return": [{"token": "abc"}]});
        assert!(!JobEnvelope::new(&payload).is_empty_result());
        let payload = json!({"return": ["Failed to authenticate"]});
        assert!(!JobEnvelope::new(&payload).is_empty_result());
    }

    #[test]
    fn test_minion_states_by_shape() {
        let entry = json!({"return": {"file_|-motd_|-/etc/motd_|-managed": {"result": true}}});
        let payload = minion_lookup();
        let envelope = JobEnvelope::new(&payload);
        let states = envelope.minion_states("web01", &entry).unwrap();
        assert!(states.get("file_|-motd_|-/etc/motd_|-managed").is_some());

        let nested = json!({"return": {"return": {"data": {"master": {"salt_|-a_|-a_|-state": {"result": false}}}}}});
        let payload = json!({"info": [{"jid": "2024", "Result": {"master": nested.clone()}}]});
        let envelope = JobEnvelope::new(&payload);
        let states = envelope.minion_states("master", &nested).unwrap();
        assert!(states.get("salt_|-a_|-a_|-state").is_some());
        assert!(matches!(
            envelope.minion_states("other", &nested),
            Err(RenderError::MissingField { .. })
        ));
    }

    #[test]
    fn test_results_missing() {
        let payload = json!({"return": [{"web01": true}]});
        assert!(matches!(
            JobEnvelope::new(&payload).results(),
            Err(RenderError::MissingField { .. })
        ));
    }
}
