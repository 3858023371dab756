use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(obj)) = (data, response.as_object_mut()) {
                obj.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a report: the serialized value for JSON, the prepared lines for text
pub fn output_report<T: Serialize>(
    output_format: &OutputFormat,
    title: &str,
    lines: &[String],
    report: &T,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            println!("{}", "=".repeat(60));
            println!("{}", title);
            println!("{}", "=".repeat(60));
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Only an explicit "yes" proceeds
pub fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Print `prompt`, read one line. EOF counts as "no".
pub fn read_confirmation<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> std::io::Result<bool> {
    write!(output, "{} (yes/no): ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(is_confirmation(&answer))
}
