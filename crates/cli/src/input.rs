use std::io;
use std::path::Path;

use treedoc_core::{FileInputStream, InputStream, ParseError, ReaderInputStream};

/// Open `file` as a document stream; `-` reads standard input.
pub(crate) fn open(file: &Path) -> Result<Box<dyn InputStream>, ParseError> {
    if file.as_os_str() == "-" {
        tracing::debug!("reading document from stdin");
        return Ok(Box::new(ReaderInputStream::new(io::stdin().lock())));
    }
    tracing::debug!(path = %file.display(), "reading document");
    Ok(Box::new(FileInputStream::open(file)?))
}
