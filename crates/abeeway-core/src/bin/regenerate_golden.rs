use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use abeeway_core::{FixedClock, HexFileSource, UplinkSource, decode_uplink_with_clock};

/// Timestamp pinned into every golden record (2024-01-01T00:00:00Z).
const GOLDEN_UNIX_TIME: i64 = 1_704_067_200;
const DEFAULT_PORT: u32 = 1;

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.hex");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected.json");
        regenerate_one(&input, &output)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let mut source = HexFileSource::open(input, DEFAULT_PORT)
        .map_err(|err| format!("failed to open {}: {}", input.display(), err))?;
    let event = source
        .next_uplink()
        .map_err(|err| format!("failed to read {}: {}", input.display(), err))?
        .ok_or_else(|| format!("no uplink in {}", input.display()))?;

    let clock = FixedClock::from_unix_timestamp(GOLDEN_UNIX_TIME)
        .map_err(|err| format!("invalid golden timestamp: {}", err))?;
    let record = decode_uplink_with_clock(&event.payload, event.port, &clock)
        .map_err(|err| format!("decode failed for {}: {}", input.display(), err))?;
    let mut json = serde_json::to_string_pretty(&record)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    json.push('\n');
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
