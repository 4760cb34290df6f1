use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a list of records, one summary line each in text mode
pub fn output_records(output_format: &OutputFormat, records: &Value, empty_message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Text => {
            let items = records.as_array().map(Vec::as_slice).unwrap_or_default();
            if items.is_empty() {
                println!("{}", empty_message);
            }
            for item in items {
                println!("{}", summary_line(item));
            }
        }
    }
    Ok(())
}

/// Print one object as `key: value` lines in text mode
pub fn output_object(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match (output_format, value) {
        (OutputFormat::Text, Value::Object(map)) => {
            for (key, field) in map {
                match field {
                    Value::String(s) => println!("{}: {}", key, s),
                    other => println!("{}: {}", key, other),
                }
            }
        }
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// `id  label` using the first present of the usual label fields
pub fn summary_line(item: &Value) -> String {
    let text = |key: &str| item.get(key).and_then(Value::as_str);
    let id = text("id").or_else(|| text("pathname")).unwrap_or("-");
    let label = ["title", "name", "url"]
        .iter()
        .find_map(|key| text(key))
        .unwrap_or_default();

    match item.get("year").and_then(Value::as_i64) {
        Some(year) => format!("{}  {}  {}", id, year, label),
        None => format!("{}  {}", id, label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prefers_title_then_name() {
        assert_eq!(summary_line(&json!({"id": "1", "title": "Site", "name": "x"})), "1  Site");
        assert_eq!(summary_line(&json!({"id": "2", "name": "Rust"})), "2  Rust");
        assert_eq!(summary_line(&json!({"id": "3", "year": 2020, "title": "Joined"})), "3  2020  Joined");
        assert_eq!(summary_line(&json!({"pathname": "cv.pdf", "url": "http://x/cv.pdf"})), "cv.pdf  http://x/cv.pdf");
    }
}
