use anyhow::{Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::pairing::PairingSet;

/// File name of the exchange artifact handed to the analyzer.
pub const EXCHANGE_FILE_NAME: &str = "input.csv";

/// Render one exchange record: `<test>,<production>` or `<test>,`.
/// Paths are written verbatim; commas inside paths are not escaped.
pub fn format_record(test: &Path, production: Option<&Path>) -> String {
    match production {
        Some(prod) => format!("{},{}", test.display(), prod.display()),
        None => format!("{},", test.display()),
    }
}

/// Write the pairing set as the analyzer's input artifact inside `dir`.
///
/// One line per pairing, in the set's iteration order, no header.
/// Returns the path of the written file.
pub fn write_exchange(dir: &Path, pairings: &PairingSet) -> Result<PathBuf> {
    let path = dir.join(EXCHANGE_FILE_NAME);
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create exchange file: {}", path.display()))?;
    let mut out = BufWriter::new(file);

    for (test, production) in pairings.iter() {
        writeln!(out, "{}", format_record(test, production))
            .with_context(|| format!("Failed to write exchange file: {}", path.display()))?;
    }
    out.flush()
        .with_context(|| format!("Failed to write exchange file: {}", path.display()))?;

    Ok(path)
}
