use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::clock::{Clock, format_server_time};
use crate::protocols::abeeway::decode_uplink_with_clock;
use crate::protocols::common::hex;
use crate::source::{HexFileSource, SourceError, UplinkEvent, UplinkSource};
use crate::{BatchEntry, BatchOutcome, BatchReport, make_stub_report};

mod summary;

use summary::SummaryTally;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("failed to format report time: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Decode every uplink listed in a hex text file.
pub fn decode_file<C: Clock + ?Sized>(
    path: &Path,
    default_port: u32,
    clock: &C,
) -> Result<BatchReport, BatchError> {
    let source = HexFileSource::open(path, default_port)?;
    decode_source(path, source, clock)
}

/// Decode every uplink yielded by `source`.
///
/// Payloads that fail to decode become failure entries; the batch continues.
/// Source errors (I/O, malformed lines) abort the batch.
pub fn decode_source<S: UplinkSource, C: Clock + ?Sized>(
    path: &Path,
    mut source: S,
    clock: &C,
) -> Result<BatchReport, BatchError> {
    let mut tally = SummaryTally::default();
    let mut entries = Vec::new();

    while let Some(UplinkEvent {
        line,
        port,
        payload,
    }) = source.next_uplink()?
    {
        let outcome = match decode_uplink_with_clock(&payload, port, clock) {
            Ok(record) => BatchOutcome::Decoded { record },
            Err(err) => {
                warn!("line {line}: {err}");
                BatchOutcome::Failed {
                    payload: hex(&payload, ""),
                    failure: err.to_string(),
                }
            }
        };
        tally.add(&outcome);
        entries.push(BatchEntry {
            line,
            port,
            outcome,
        });
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.generated_at = format_server_time(clock.now_utc())?;
    report.summary = tally.finish();
    report.entries = entries;
    info!(
        "decoded {} of {} uplinks from {}",
        report.summary.decoded,
        report.summary.uplinks_total,
        path.display()
    );
    Ok(report)
}
