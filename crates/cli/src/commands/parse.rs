use std::path::Path;
use std::process;

use crate::{input, report_error, report_parse_error, Settings};

pub(crate) fn cmd_parse(file: &Path, settings: Settings) {
    let result = input::open(file)
        .and_then(|stream| treedoc_core::parse_document_with(stream, settings.options));
    match result {
        Ok(root) => match serde_json::to_string_pretty(&root.flatten()) {
            Ok(pretty) => println!("{}", pretty),
            Err(e) => {
                report_error(
                    &format!("serialization error: {}", e),
                    settings.output,
                    settings.quiet,
                );
                process::exit(1);
            }
        },
        Err(e) => {
            report_parse_error(&e, settings.output, settings.quiet);
            process::exit(1);
        }
    }
}
