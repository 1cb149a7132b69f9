//! Per-minion success markers, used for `test.ping`

use std::io::Write;

use serde_json::Value;

use super::{marker, render_non_returns, Palette, Table, Tone};
use crate::errors::RenderResult;
use crate::output::envelope::JobEnvelope;

/// True when `success` is set on the result or under its `return`
fn succeeded(entry: &Value) -> bool {
    let flag = |value: Option<&Value>| value.and_then(Value::as_bool).unwrap_or(false);
    flag(entry.get("success")) || flag(entry.get("return").and_then(|ret| ret.get("success")))
}

pub fn render_boolean<W: Write>(
    out: &mut W,
    envelope: &JobEnvelope<'_>,
    palette: Palette,
) -> RenderResult<()> {
    let results = envelope.results()?;

    let mut table = Table::new("Results", &["Minion", "Result"]);
    for (minion, entry) in results {
        let (mark, tone) = marker(succeeded(entry));
        table.add_row(vec![(minion.clone(), Tone::Plain), (mark.to_string(), tone)]);
    }
    table.write_to(out, palette)?;

    render_non_returns(out, envelope, palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RenderError;
    use serde_json::json;

    #[test]
    fn test_success_flag_locations() {
        assert!(succeeded(&json!({"success": true, "return": true})));
        assert!(succeeded(&json!({"return": {"success": true}})));
        assert!(!succeeded(&json!({"success": false, "return": false})));
        assert!(!succeeded(&json!({"return": true})));
    }

    #[test]
    fn test_ping_table() {
        let payload = json!({
            "info": [{
                "jid": "1",
                "Function": "test.ping",
                "Minions": ["web01", "web02", "db01"],
                "Result": {
                    "web01": {"return": true, "success": true},
                    "web02": {"return": false, "success": false}
                }
            }],
            "return": [{"web01": true, "web02": false}]
        });
        let mut buf = Vec::new();
        render_boolean(&mut buf, &JobEnvelope::new(&payload), Palette::plain()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Results\n"));
        assert!(text.contains("web01  | ✔"));
        assert!(text.contains("web02  | ✘"));
        assert!(text.contains("Minions that did not return:"));
        assert!(text.contains("✘ db01"));
    }

    #[test]
    fn test_missing_result_block() {
        let payload = json!({"info": [{"jid": "1"}], "return": [{}]});
        let mut buf = Vec::new();
        let err =
            render_boolean(&mut buf, &JobEnvelope::new(&payload), Palette::plain()).unwrap_err();
        assert!(matches!(err, RenderError::MissingField { .. }));
    }
}
