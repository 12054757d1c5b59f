//! Calendar handling for model output time series.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Timestamp layout embedded in MPAS output file names,
/// e.g. `diagnostics.2009-01-15_06.00.00.nc`.
const MPAS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H.%M.%S";
const MPAS_TIMESTAMP_LEN: usize = 19;

/// Find and parse the first MPAS timestamp in a file name.
pub fn parse_mpas_timestamp(name: &str) -> Option<NaiveDateTime> {
    let bytes = name.as_bytes();
    if bytes.len() < MPAS_TIMESTAMP_LEN {
        return None;
    }
    (0..=bytes.len() - MPAS_TIMESTAMP_LEN).find_map(|start| {
        let candidate = name.get(start..start + MPAS_TIMESTAMP_LEN)?;
        NaiveDateTime::parse_from_str(candidate, MPAS_TIMESTAMP_FORMAT).ok()
    })
}

/// A labelled axis tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Position in axis data units (time-step index for time axes)
    pub position: f64,
    /// Label text, empty for unlabelled ticks
    pub label: String,
}

impl Tick {
    pub fn new(position: f64, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }

    /// Pair explicit labels with positions `0, every, 2*every, ...`.
    pub fn from_labels(every: usize, labels: &[String]) -> Vec<Tick> {
        let every = every.max(1);
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| Tick::new((i * every) as f64, label.clone()))
            .collect()
    }
}

/// Maps time-step indices to calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarAxis {
    /// Valid time of step 0
    pub start: NaiveDateTime,
    /// Output steps per day (4 for 6-hourly output)
    pub steps_per_day: u32,
}

impl CalendarAxis {
    pub fn new(start: NaiveDateTime, steps_per_day: u32) -> Self {
        Self {
            start,
            steps_per_day: steps_per_day.max(1),
        }
    }

    /// Derive the axis from the sorted file list of a series holding
    /// `records_per_file` steps in each file.
    ///
    /// The start comes from the first file name; the step length is the gap
    /// to the second file divided by `records_per_file`. A single file is
    /// assumed to be 6-hourly.
    pub fn from_file_names<P: AsRef<Path>>(paths: &[P], records_per_file: usize) -> Option<Self> {
        let stamp = |p: &P| {
            p.as_ref()
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_mpas_timestamp)
        };

        let records = i64::try_from(records_per_file).ok().filter(|r| *r > 0)?;
        let start = stamp(paths.first()?)?;
        let steps_per_day = match paths.get(1).and_then(stamp) {
            Some(next) => {
                let file_secs = (next - start).num_seconds();
                if file_secs <= 0 || file_secs % records != 0 {
                    return None;
                }
                let step_secs = file_secs / records;
                if 86_400 % step_secs != 0 {
                    return None;
                }
                (86_400 / step_secs) as u32
            }
            None => 4,
        };

        Some(Self::new(start, steps_per_day))
    }

    /// Valid time of a step.
    pub fn datetime_at(&self, step: usize) -> NaiveDateTime {
        let step_secs = 86_400 / i64::from(self.steps_per_day);
        self.start + Duration::seconds(step_secs * step as i64)
    }

    /// Ticks every `tick_every` steps over `n_steps`, labelling every
    /// `label_every`-th tick with a "Jan 15" style date.
    pub fn day_ticks(&self, n_steps: usize, tick_every: usize, label_every: usize) -> Vec<Tick> {
        let tick_every = tick_every.max(1);
        let label_every = label_every.max(1);

        (0..n_steps)
            .step_by(tick_every)
            .enumerate()
            .map(|(i, step)| {
                let label = if i % label_every == 0 {
                    self.datetime_at(step).format("%b %d").to_string()
                } else {
                    String::new()
                };
                Tick::new(step as f64, label)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn jan15() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2009, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_mpas_timestamp() {
        let dt = parse_mpas_timestamp("x1.2621442.output.2009-02-01_00.00.00.nc").unwrap();
        assert_eq!(dt, NaiveDate::from_ymd_opt(2009, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());

        let dt = parse_mpas_timestamp("diagnostics.2009-01-15_18.00.00.nc").unwrap();
        assert_eq!(dt.hour(), 18);

        assert!(parse_mpas_timestamp("output.nc").is_none());
    }

    #[test]
    fn test_from_file_names_six_hourly() {
        let names = [
            "diagnostics.2009-01-15_00.00.00.nc",
            "diagnostics.2009-01-15_06.00.00.nc",
        ];
        let axis = CalendarAxis::from_file_names(&names, 1).unwrap();
        assert_eq!(axis.start, jan15());
        assert_eq!(axis.steps_per_day, 4);
    }

    #[test]
    fn test_from_file_names_daily_files_with_four_records() {
        let names = [
            "x1.2621442.output.2009-01-15_00.00.00.nc",
            "x1.2621442.output.2009-01-16_00.00.00.nc",
        ];
        let axis = CalendarAxis::from_file_names(&names, 4).unwrap();
        assert_eq!(axis.steps_per_day, 4);
        assert_eq!(axis.datetime_at(4).format("%b %d").to_string(), "Jan 16");
        assert_eq!(axis.datetime_at(5).hour(), 6);

        let ticks = axis.day_ticks(8, 4, 1);
        assert_eq!(ticks, vec![Tick::new(0.0, "Jan 15"), Tick::new(4.0, "Jan 16")]);
    }

    #[test]
    fn test_from_file_names_rejects_uneven_records() {
        let names = [
            "diagnostics.2009-01-15_00.00.00.nc",
            "diagnostics.2009-01-16_00.00.00.nc",
        ];
        // 86400 s across 7 records is not a whole number of seconds per step
        assert!(CalendarAxis::from_file_names(&names, 7).is_none());
        assert!(CalendarAxis::from_file_names(&names, 0).is_none());
    }

    #[test]
    fn test_day_ticks_alternate_labels() {
        let axis = CalendarAxis::new(jan15(), 4);
        let ticks = axis.day_ticks(84, 4, 2);

        assert_eq!(ticks.len(), 21);
        assert_eq!(ticks[0], Tick::new(0.0, "Jan 15"));
        assert_eq!(ticks[1], Tick::new(4.0, ""));
        assert_eq!(ticks[2], Tick::new(8.0, "Jan 17"));
        assert_eq!(ticks[18].label, "Feb 02");
        assert_eq!(ticks[20].label, "Feb 04");
    }
}
