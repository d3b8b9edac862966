//! Loading of event dumps
//!
//! Events are stored as JSON lines: one serialized `Event` per line. Blank
//! lines are ignored.

use crate::{event::Event, Result};

use eyre::WrapErr;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Read every event of a JSON-lines stream, in order
pub fn read_events(reader: impl BufRead) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line_num = line_idx + 1;
        let line = line.wrap_err_with(|| format!("Failed to read line {}", line_num))?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line)
            .wrap_err_with(|| format!("Invalid event on line {}", line_num))?;
        events.push(event);
    }
    Ok(events)
}

/// Load the events of a JSON-lines file
pub fn load_events(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    read_events(BufReader::new(file))
        .wrap_err_with(|| format!("Failed to load events from {}", path.display()))
}
