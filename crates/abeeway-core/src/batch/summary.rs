use std::collections::BTreeMap;

use crate::{BatchOutcome, BatchSummary, TypeCount};

#[derive(Debug, Default)]
pub(crate) struct SummaryTally {
    uplinks_total: u64,
    decoded: u64,
    failed: u64,
    with_errors: u64,
    by_type: BTreeMap<&'static str, u64>,
}

impl SummaryTally {
    pub(crate) fn add(&mut self, outcome: &BatchOutcome) {
        self.uplinks_total += 1;
        match outcome {
            BatchOutcome::Decoded { record } => {
                self.decoded += 1;
                if record.uplink.error().is_some() {
                    self.with_errors += 1;
                }
                *self.by_type.entry(record.uplink.kind()).or_default() += 1;
            }
            BatchOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub(crate) fn finish(self) -> BatchSummary {
        BatchSummary {
            uplinks_total: self.uplinks_total,
            decoded: self.decoded,
            failed: self.failed,
            with_errors: self.with_errors,
            by_type: self
                .by_type
                .into_iter()
                .map(|(kind, count)| TypeCount {
                    kind: kind.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SummaryTally;
    use crate::BatchOutcome;
    use crate::clock::FixedClock;
    use crate::protocols::abeeway::decode_uplink_with_clock;

    fn decoded(payload: &[u8]) -> BatchOutcome {
        let clock = FixedClock::from_unix_timestamp(0).unwrap();
        BatchOutcome::Decoded {
            record: decode_uplink_with_clock(payload, 1, &clock).unwrap(),
        }
    }

    #[test]
    fn counts_by_type_in_label_order() {
        let heartbeat = [0x05, 0x20, 0x64, 0x80, 0x15, 0, 3, 2, 7, 1, 2, 10];
        let unknown = [0x0a, 0x20, 0x64, 0x80, 0x10, 0, 1, 2, 3, 4, 5, 6];

        let mut tally = SummaryTally::default();
        tally.add(&decoded(&heartbeat));
        tally.add(&decoded(&[0x00, 0x01]));
        tally.add(&decoded(&heartbeat));
        tally.add(&decoded(&unknown));
        tally.add(&BatchOutcome::Failed {
            payload: "05".to_string(),
            failure: "payload too short".to_string(),
        });

        let summary = tally.finish();
        assert_eq!(summary.uplinks_total, 5);
        assert_eq!(summary.decoded, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.with_errors, 1);
        let labels: Vec<_> = summary
            .by_type
            .iter()
            .map(|entry| (entry.kind.as_str(), entry.count))
            .collect();
        assert_eq!(
            labels,
            vec![("FRAME PENDING", 1), ("HEARTBEAT", 2), ("UNSUPPORTED", 1)]
        );
    }
}
