//! Force-history parsing.
//!
//! The solver appends to its force log while it runs, and the header layout
//! shifts between solver versions, so nothing here assumes a fixed skip
//! count or a complete final line. Header lines are recognized structurally
//! (non-numeric first token), malformed data lines are skipped and counted,
//! and a duplicated time index (a restarted run appending to the same log)
//! resolves to the later occurrence.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use af_core::AfResult;

/// One parsed force sample: time plus pressure and viscous force vectors.
///
/// The drag axis is x, the lift axis is z, matching the wrapped toolchain's
/// body-axis convention. Trailing columns (porous and moment components)
/// vary across solver versions and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceRecord {
    pub time: f64,
    pub pressure: [f64; 3],
    pub viscous: [f64; 3],
}

impl ForceRecord {
    /// Total drag-axis force (pressure + viscous).
    pub fn drag(&self) -> f64 {
        self.pressure[0] + self.viscous[0]
    }

    /// Total lift-axis force (pressure + viscous).
    pub fn lift(&self) -> f64 {
        self.pressure[2] + self.viscous[2]
    }
}

/// Clean numeric series recovered from one force log.
#[derive(Debug, Clone, Default)]
pub struct ForceSeries {
    /// Records in strictly increasing time order, duplicates resolved.
    pub records: Vec<ForceRecord>,
    /// Malformed data lines encountered and dropped.
    pub skipped_lines: usize,
}

impl ForceSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Minimum numeric tokens per data line: time + two 3-vectors.
const MIN_TOKENS: usize = 7;

/// Parse a force log from disk.
///
/// The series is recomputed on every call; the underlying file grows while
/// a solve is live, so nothing is cached.
pub fn parse(path: &Path) -> AfResult<ForceSeries> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_str(&content))
}

/// Parse force-log text.
pub fn parse_str(content: &str) -> ForceSeries {
    let mut records: Vec<ForceRecord> = Vec::new();
    let mut by_time: HashMap<u64, usize> = HashMap::new();
    let mut skipped = 0usize;

    for line in content.lines() {
        // Sub-vectors arrive wrapped in parentheses; commas show up in some
        // writer variants. Erase both before tokenizing.
        let cleaned: String = line
            .chars()
            .map(|c| if c == '(' || c == ')' || c == ',' { ' ' } else { c })
            .collect();
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();

        let Some(first) = tokens.first() else {
            continue;
        };
        let Ok(time) = first.parse::<f64>() else {
            // Header or comment line; not an error.
            continue;
        };

        if tokens.len() < MIN_TOKENS {
            skipped += 1;
            continue;
        }
        let mut values = [0.0f64; MIN_TOKENS - 1];
        let mut ok = true;
        for (slot, token) in values.iter_mut().zip(&tokens[1..MIN_TOKENS]) {
            match token.parse::<f64>() {
                Ok(v) => *slot = v,
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }
        // Truncated tails on a live log land here too.
        if !ok || tokens[MIN_TOKENS..].iter().any(|t| t.parse::<f64>().is_err()) {
            skipped += 1;
            continue;
        }

        let record = ForceRecord {
            time,
            pressure: [values[0], values[1], values[2]],
            viscous: [values[3], values[4], values[5]],
        };

        // Later occurrence wins for a repeated time index.
        match by_time.entry(time.to_bits()) {
            Entry::Occupied(slot) => records[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(records.len());
                records.push(record);
            }
        }
    }

    records.sort_by(|a, b| a.time.total_cmp(&b.time));

    if skipped > 0 {
        tracing::debug!(skipped, "malformed force-log lines dropped");
    }

    ForceSeries {
        records,
        skipped_lines: skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "# Forces\n# CofR : (0 0 0)\n# Time forces(pressure viscous porous) moments(pressure viscous porous)\n";

    fn data_line(t: f64, px: f64, pz: f64) -> String {
        format!("{t} (({px} 0.1 {pz}) (0.01 0.001 0.02) (0 0 0)) ((0 0 0) (0 0 0) (0 0 0))\n")
    }

    #[test]
    fn headers_are_skipped_structurally_not_counted() {
        let mut log = String::from(HEADER);
        log.push_str(&data_line(1.0, 2.0, 10.0));
        let series = parse_str(&log);
        assert_eq!(series.len(), 1);
        assert_eq!(series.skipped_lines, 0);
    }

    #[test]
    fn record_components_and_totals() {
        let series = parse_str(&data_line(1.0, 2.0, 10.0));
        let rec = series.records[0];
        assert_eq!(rec.time, 1.0);
        assert_eq!(rec.pressure, [2.0, 0.1, 10.0]);
        assert_eq!(rec.viscous, [0.01, 0.001, 0.02]);
        assert!((rec.drag() - 2.01).abs() < 1e-12);
        assert!((rec.lift() - 10.02).abs() < 1e-12);
    }

    #[test]
    fn malformed_lines_are_counted_and_dropped() {
        let mut log = String::from(HEADER);
        for i in 0..97 {
            log.push_str(&data_line(i as f64, 1.0, 5.0));
        }
        // Three malformed lines interspersed: short, non-numeric, truncated.
        log.push_str("97 (1 2)\n");
        log.push_str("98 ((a b c) (0 0 0) (0 0 0))\n");
        log.push_str("99 ((1 2 3) (4 nan? 6\n");

        let series = parse_str(&log);
        assert_eq!(series.len(), 97);
        assert_eq!(series.skipped_lines, 3);
        assert!(series
            .records
            .windows(2)
            .all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn restart_appended_duplicates_keep_later_record() {
        let mut log = String::new();
        log.push_str(&data_line(1.0, 1.0, 1.0));
        log.push_str(&data_line(2.0, 2.0, 2.0));
        log.push_str(&data_line(3.0, 3.0, 3.0));
        // Restart re-emits times 2 and 3 with different values.
        log.push_str(&data_line(2.0, 20.0, 20.0));
        log.push_str(&data_line(3.0, 30.0, 30.0));
        log.push_str(&data_line(4.0, 4.0, 4.0));

        let series = parse_str(&log);
        assert_eq!(series.len(), 4);
        assert_eq!(series.records[1].pressure[0], 20.0);
        assert_eq!(series.records[2].pressure[0], 30.0);
        assert_eq!(series.records[3].time, 4.0);
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let series = parse_str("");
        assert!(series.is_empty());
        assert_eq!(series.skipped_lines, 0);
    }
}
