//! Structured dumps: the whole payload as JSON, the return data as YAML

use std::io::Write;

use serde_json::Value;

use crate::errors::RenderResult;
use crate::output::envelope::JobEnvelope;

/// Pretty-print the full payload
pub fn render_json<W: Write>(out: &mut W, payload: &Value) -> RenderResult<()> {
    let text = serde_json::to_string_pretty(payload)?;
    writeln!(out, "{}", text)?;
    Ok(())
}

/// Print `return[0]` as YAML
pub fn render_yaml<W: Write>(out: &mut W, envelope: &JobEnvelope<'_>) -> RenderResult<()> {
    let data = envelope.primary_return().unwrap_or(&Value::Null);
    let text = serde_yaml::to_string(data)?;
    write!(out, "{}", text)?;
    if !text.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_pretty_and_complete() {
        let payload = json!({"return": [{"token": "abc"}]});
        let mut buf = Vec::new();
        render_json(&mut buf, &payload).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\n"));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_yaml_renders_first_return() {
        let payload = json!({
            "info": [{"jid": "1"}],
            "return": [{"web01": {"os": "Debian"}}, {"ignored": true}]
        });
        let mut buf = Vec::new();
        render_yaml(&mut buf, &JobEnvelope::new(&payload)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("web01:"));
        assert!(text.contains("os: Debian"));
        assert!(!text.contains("ignored"));
    }
}
