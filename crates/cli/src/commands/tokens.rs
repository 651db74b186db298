use std::path::Path;
use std::process;

use treedoc_core::{Number, Payload, Token};

use crate::{input, report_parse_error, OutputFormat, Settings};

pub(crate) fn cmd_tokens(file: &Path, settings: Settings) {
    let tokens = match input::open(file).and_then(treedoc_core::tokenize) {
        Ok(tokens) => tokens,
        Err(e) => {
            report_parse_error(&e, settings.output, settings.quiet);
            process::exit(1);
        }
    };

    match settings.output {
        OutputFormat::Json => {
            let list: Vec<_> = tokens.iter().map(token_json).collect();
            let pretty = serde_json::to_string_pretty(&list)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for token in &tokens {
                println!("{}", token_line(token));
            }
        }
    }
}

fn token_line(token: &Token) -> String {
    let head = format!("{} {}", token.position, token.kind);
    match &token.value {
        Some(Payload::Text(s)) => format!("{} {:?}", head, s),
        Some(other) => format!("{} {}", head, other),
        None => head,
    }
}

fn token_json(token: &Token) -> serde_json::Value {
    let value = match &token.value {
        None => serde_json::Value::Null,
        Some(Payload::Text(s)) => serde_json::Value::String(s.clone()),
        Some(Payload::Bool(b)) => serde_json::Value::Bool(*b),
        Some(Payload::Number(literal)) => match Number::parse(literal) {
            Some(Number::Integer(i)) => serde_json::json!(i),
            Some(Number::Float(f)) => serde_json::json!(f),
            None => serde_json::Value::String(literal.clone()),
        },
    };
    serde_json::json!({
        "kind": token.kind.as_str(),
        "value": value,
        "line": token.position.line,
        "column": token.position.column,
    })
}
