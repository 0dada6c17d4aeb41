use crate::core::frame;

/// One captured snapshot in a timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRow {
    pub time_ms: u64,
    pub frame: u64,
    /// Frames since the previous row; `None` for the first row.
    pub interval: Option<i64>,
    pub note: String,
}

impl TimingRow {
    pub fn new(time_ms: u64, frame: u64, note: impl Into<String>) -> Self {
        Self {
            time_ms,
            frame,
            interval: None,
            note: note.into(),
        }
    }

    /// The time as `mm:ss:zzz`.
    pub fn time(&self) -> String {
        frame::format_time(self.time_ms as i64).unwrap_or_else(|_| "--:--:---".to_string())
    }
}

/// Rewrites every interval from the frames.
pub(crate) fn recompute_intervals(rows: &mut [TimingRow]) {
    let mut previous: Option<u64> = None;
    for row in rows.iter_mut() {
        row.interval = previous.map(|p| row.frame as i64 - p as i64);
        previous = Some(row.frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_follow_frames() {
        let mut rows = vec![
            TimingRow::new(500, 12, ""),
            TimingRow::new(1_000, 24, ""),
            TimingRow::new(1_750, 42, "hit"),
        ];
        recompute_intervals(&mut rows);
        let intervals: Vec<_> = rows.iter().map(|r| r.interval).collect();
        assert_eq!(intervals, vec![None, Some(12), Some(18)]);
        assert_eq!(rows[2].time(), "00:01:750");
    }
}
