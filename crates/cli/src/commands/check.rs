use std::path::Path;
use std::process;

use treedoc_core::Element;

use crate::{input, report_parse_error, OutputFormat, Settings};

pub(crate) fn cmd_check(file: &Path, settings: Settings) {
    let root = match input::open(file)
        .and_then(|stream| treedoc_core::parse_document_with(stream, settings.options))
    {
        Ok(root) => root,
        Err(e) => {
            report_parse_error(&e, settings.output, settings.quiet);
            process::exit(1);
        }
    };

    let elements = count_elements(&root);
    match settings.output {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "ok": true,
                "root": root.identifier,
                "elements": elements,
            });
            println!("{}", result);
        }
        OutputFormat::Text => {
            if !settings.quiet {
                println!(
                    "{}: ok (root '{}', {} elements)",
                    file.display(),
                    root.identifier,
                    elements
                );
            }
        }
    }
}

fn count_elements(element: &Element) -> usize {
    1 + element.children.iter().map(count_elements).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_descendant() {
        let root = treedoc_core::parse_str("a { b { c, d, } e {} }").unwrap();
        assert_eq!(count_elements(&root), 5);
    }
}
