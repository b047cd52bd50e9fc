//! Output formatters for analysis results.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::core::Result;

/// Output format enum.
#[derive(Clone, Copy, Debug, Default)]
pub enum Format {
    #[default]
    Json,
    Text,
}

impl Format {
    pub fn format<T: Serialize, W: Write>(&self, data: &T, writer: &mut W) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.format_value(&value, writer)
    }

    pub fn format_value<W: Write>(&self, value: &Value, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => format_json(value, writer),
            Format::Text => format_text(value, writer, 0),
        }
    }
}

fn format_json<W: Write>(value: &Value, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn format_text<W: Write>(value: &Value, writer: &mut W, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) if !is_empty_container(val) => {
                        writeln!(writer, "{indent}{}:", key.bold())?;
                        format_text(val, writer, depth + 1)?;
                    }
                    _ => writeln!(writer, "{indent}{}: {}", key.bold(), format_scalar(val))?,
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(writer, "{indent}-")?;
                        format_text(item, writer, depth + 1)?;
                    }
                    _ => writeln!(writer, "{indent}- {}", format_scalar(item))?,
                }
            }
        }
        _ => writeln!(writer, "{indent}{}", format_scalar(value))?,
    }
    Ok(())
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(format: Format, value: &Value) -> String {
        let mut buffer = Vec::new();
        format.format_value(value, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_json_output_is_pretty_and_terminated() {
        let out = render(Format::Json, &json!({"nodes": [], "links": []}));
        assert!(out.contains("\"nodes\""));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_text_output_nests_objects() {
        let out = render(
            Format::Text,
            &json!({"module": "app", "metrics": {"functions": 2}}),
        );
        assert!(out.contains("module"));
        assert!(out.contains("app"));
        assert!(out.contains("functions"));
        assert!(out.contains('2'));
    }

    #[test]
    fn test_text_output_lists_array_items() {
        let out = render(Format::Text, &json!({"entry_points": ["a", "b"]}));
        assert!(out.contains("- a"));
        assert!(out.contains("- b"));
    }
}
