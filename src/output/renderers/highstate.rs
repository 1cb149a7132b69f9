//! State run reports: the highstate listing and the profile timing table

use std::io::Write;

use serde_json::{Map, Value};

use super::{marker, render_non_returns, Palette, Table, Tone};
use crate::constants::api;
use crate::errors::{RenderError, RenderResult};
use crate::output::envelope::JobEnvelope;

/// The four parts of a state id, `module_|-id_|-name_|-function`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateId<'a> {
    pub module: &'a str,
    pub id: &'a str,
    pub name: &'a str,
    pub function: &'a str,
}

impl<'a> StateId<'a> {
    pub fn parse(raw: &'a str) -> RenderResult<Self> {
        let parts: Vec<&str> = raw.split(api::STATE_ID_SEPARATOR).collect();
        match parts[..] {
            [module, id, name, function] => Ok(Self {
                module,
                id,
                name,
                function,
            }),
            _ => Err(RenderError::MalformedStateId {
                id: raw.to_string(),
            }),
        }
    }

    /// `module.function`
    pub fn qualified_function(&self) -> String {
        format!("{}.{}", self.module, self.function)
    }
}

/// One state result with its parsed id
struct StateEntry<'a> {
    id: StateId<'a>,
    result: &'a Value,
}

impl StateEntry<'_> {
    fn succeeded(&self) -> bool {
        self.result
            .get("result")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn duration_ms(&self) -> Option<f64> {
        self.result.get("duration").and_then(Value::as_f64)
    }

    fn comment(&self) -> Option<String> {
        match self.result.get("comment")? {
            Value::String(text) => Some(text.clone()),
            Value::Array(lines) => Some(
                lines
                    .iter()
                    .map(|line| line.as_str().map_or_else(|| line.to_string(), str::to_string))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn changes(&self) -> Option<&Value> {
        match self.result.get("changes")? {
            Value::Object(map) if map.is_empty() => None,
            Value::Array(items) if items.is_empty() => None,
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            changes => Some(changes),
        }
    }
}

/// What a minion sent back for a state run
enum MinionStates<'a> {
    /// State results keyed by state id, in execution order
    Ran(Vec<StateEntry<'a>>),
    /// Compilation or rendering errors reported instead of results
    Errors(Vec<String>),
}

fn collect_states<'a>(minion: &str, states: &'a Value) -> RenderResult<MinionStates<'a>> {
    match states {
        Value::Object(map) => ordered_states(map).map(MinionStates::Ran),
        Value::Array(lines) => Ok(MinionStates::Errors(
            lines
                .iter()
                .map(|line| line.as_str().map_or_else(|| line.to_string(), str::to_string))
                .collect(),
        )),
        Value::String(line) => Ok(MinionStates::Errors(vec![line.clone()])),
        _ => Err(RenderError::UnexpectedShape {
            field: format!("Result.{}.return", minion),
            expected: "object of state results",
        }),
    }
}

/// Parse state ids and order by `__run_num__` when it is present
fn ordered_states(map: &Map<String, Value>) -> RenderResult<Vec<StateEntry<'_>>> {
    let mut entries = map
        .iter()
        .map(|(raw, result)| {
            Ok(StateEntry {
                id: StateId::parse(raw)?,
                result,
            })
        })
        .collect::<RenderResult<Vec<_>>>()?;

    entries.sort_by_key(|entry| {
        entry
            .result
            .get("__run_num__")
            .and_then(Value::as_u64)
            .unwrap_or(u64::MAX)
    });
    Ok(entries)
}

fn indented(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-minion, per-state report
pub fn render_highstate<W: Write>(
    out: &mut W,
    envelope: &JobEnvelope<'_>,
    palette: Palette,
) -> RenderResult<()> {
    let results = envelope.results()?;

    for (minion, entry) in results {
        writeln!(out, "{}:", palette.paint(minion, Tone::Accent))?;
        let states = envelope.minion_states(minion, entry)?;

        match collect_states(minion, states)? {
            MinionStates::Errors(lines) => {
                for line in lines {
                    let (mark, tone) = marker(false);
                    let (mark, line) = (palette.paint(mark, tone), palette.paint(&line, tone));
                    writeln!(out, "  {} {}", mark, line)?;
                }
            }
            MinionStates::Ran(entries) => {
                for state in entries {
                    let (mark, tone) = marker(state.succeeded());
                    writeln!(
                        out,
                        "  {} {}",
                        palette.paint(mark, tone),
                        palette.paint(state.id.id, tone)
                    )?;
                    writeln!(out, "        name: {}", state.id.name)?;
                    writeln!(out, "    function: {}", state.id.qualified_function())?;
                    if let Some(changes) = state.changes() {
                        let yaml = serde_yaml::to_string(changes)?;
                        writeln!(out, "     changes:")?;
                        writeln!(out, "{}", indented(yaml.trim_end(), "        "))?;
                    }
                    if let Some(comment) = state.comment() {
                        if comment != api::SILENT_COMMENT {
                            writeln!(out, "     comment: {}", comment)?;
                        }
                    }
                    if let Some(duration) = state.duration_ms() {
                        writeln!(out, "    duration: {} ms", duration)?;
                    }
                }
            }
        }
        writeln!(out)?;
    }

    render_non_returns(out, envelope, palette)
}

/// Per-minion timing table with totals
pub fn render_profile<W: Write>(
    out: &mut W,
    envelope: &JobEnvelope<'_>,
    palette: Palette,
) -> RenderResult<()> {
    let results = envelope.results()?;

    for (minion, entry) in results {
        let states = envelope.minion_states(minion, entry)?;
        let mut table = Table::new(minion.as_str(), &["State", "Name", "Function", "Result", "Duration"]);
        let mut good = 0usize;
        let mut bad = 0usize;
        let mut total_ms = 0.0f64;

        match collect_states(minion, states)? {
            MinionStates::Errors(lines) => {
                for line in lines {
                    bad += 1;
                    let (mark, tone) = marker(false);
                    table.add_row(vec![
                        (line, Tone::Bad),
                        (String::new(), Tone::Plain),
                        (String::new(), Tone::Plain),
                        (mark.to_string(), tone),
                        (String::new(), Tone::Plain),
                    ]);
                }
            }
            MinionStates::Ran(entries) => {
                for state in entries {
                    let success = state.succeeded();
                    if success {
                        good += 1;
                    } else {
                        bad += 1;
                    }
                    let duration = match state.duration_ms() {
                        Some(ms) => {
                            total_ms += ms;
                            format!("{} ms", ms)
                        }
                        None => String::new(),
                    };
                    let (mark, tone) = marker(success);
                    table.add_row(vec![
                        (state.id.id.to_string(), Tone::Plain),
                        (state.id.name.to_string(), Tone::Plain),
                        (state.id.qualified_function(), Tone::Plain),
                        (mark.to_string(), tone),
                        (duration, Tone::Accent),
                    ]);
                }
            }
        }

        table.add_section();
        table.add_row(vec![
            ("Final Total".to_string(), Tone::Plain),
            (String::new(), Tone::Plain),
            (String::new(), Tone::Plain),
            (format!("{}/{} ({})", bad, good, bad + good), Tone::Plain),
            (format!("{:.4} s", total_ms / 1000.0), Tone::Accent),
        ]);
        table.write_to(out, palette)?;
        writeln!(out)?;
    }

    render_non_returns(out, envelope, palette)
}
