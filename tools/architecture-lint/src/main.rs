//! `architecture-lint [client dir]`: check the client's layering.
//!
//! Without an argument the `client/` directory next to this tool's workspace
//! is checked. Exits non-zero and lists every crossing on failure.

use std::io::{self, Write};
use std::process::ExitCode;

use architecture_lint::lint_client_dir;
use camino::Utf8PathBuf;

fn default_client_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../client"))
}

fn main() -> ExitCode {
    let client_dir = std::env::args()
        .nth(1)
        .map_or_else(default_client_dir, Utf8PathBuf::from);

    match lint_client_dir(&client_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            drop(writeln!(io::stderr().lock(), "{err}"));
            ExitCode::FAILURE
        }
    }
}
