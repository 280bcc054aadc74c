//! JSON file helpers with atomic writes

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ExpenseError;

/// Read JSON from a file, returning a default value if the file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, ExpenseError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| ExpenseError::Store(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ExpenseError::Store(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically
///
/// The data goes to a sibling temp file which is synced and then renamed over
/// the target, so readers see either the old or the new contents.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), ExpenseError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| store_err(format!("Failed to create {}", parent.display()), e))?;
    }

    let temp_path = path.with_extension("json.tmp");

    let write_temp = || -> Result<(), ExpenseError> {
        let file =
            File::create(&temp_path).map_err(|e| store_err("Failed to create temp file", e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| store_err("Failed to serialize data", e))?;
        writer
            .flush()
            .map_err(|e| store_err("Failed to flush data", e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| store_err("Failed to sync data", e))
    };

    write_temp()
        .and_then(|()| {
            fs::rename(&temp_path, path).map_err(|e| store_err("Failed to rename temp file", e))
        })
        .inspect_err(|_| {
            let _ = fs::remove_file(&temp_path);
        })
}

fn store_err(what: impl Display, err: impl Display) -> ExpenseError {
    ExpenseError::Store(format!("{}: {}", what, err))
}
