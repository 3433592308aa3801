//! Per-action-name aggregation

use crate::types::{ActionRecord, Summary, SummaryStat};

/// Fold a full action list into per-name aggregates.
///
/// Total on empty input (empty map) and stateless: the result depends
/// only on `actions`, so repeated calls on an unchanged list are
/// identical and repeated saves can never double-count.
pub fn summarize(actions: &[ActionRecord]) -> Summary {
    let mut summary = Summary::new();

    for action in actions {
        let stat = summary
            .entry(action.action.clone())
            .or_insert_with(|| SummaryStat {
                count: 0,
                total_duration: 0.0,
                min_duration: f64::INFINITY,
                max_duration: 0.0,
                avg_duration: 0.0,
            });
        stat.count += 1;
        stat.total_duration += action.duration;
        stat.min_duration = stat.min_duration.min(action.duration);
        stat.max_duration = stat.max_duration.max(action.duration);
        stat.avg_duration = stat.total_duration / stat.count as f64;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn action(name: &str, duration: f64, step: u32) -> ActionRecord {
        ActionRecord {
            action: name.to_string(),
            start_time: "2025-02-27T10:00:00".to_string(),
            duration,
            parameters: HashMap::new(),
            step_order: step,
            cpu_usage: "20.0%".to_string(),
            memory_usage: "100.00 MB".to_string(),
            result: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn stats_per_name() {
        let actions = vec![
            action("Login", 1.0, 1),
            action("Login", 3.0, 2),
            action("Navigate", 0.5, 3),
        ];
        let summary = summarize(&actions);

        let login = &summary["Login"];
        assert_eq!(login.count, 2);
        assert_eq!(login.total_duration, 4.0);
        assert_eq!(login.min_duration, 1.0);
        assert_eq!(login.max_duration, 3.0);
        assert_eq!(login.avg_duration, 2.0);

        let nav = &summary["Navigate"];
        assert_eq!(nav.count, 1);
        assert_eq!(nav.avg_duration, 0.5);
    }

    #[test]
    fn recompute_is_idempotent() {
        let actions = vec![
            action("Login", 1.5, 1),
            action("Navigate", 0.8, 2),
            action("Login", 2.5, 3),
        ];
        let first = summarize(&actions);
        let second = summarize(&actions);
        assert_eq!(first, second);
    }

    #[test]
    fn count_matches_occurrences() {
        let durations = [0.1, 0.2, 0.3, 0.4];
        let actions: Vec<_> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| action("Click", *d, i as u32 + 1))
            .collect();
        let summary = summarize(&actions);
        let click = &summary["Click"];
        assert_eq!(click.count, durations.len() as u64);
        assert_eq!(click.min_duration, 0.1);
        assert_eq!(click.max_duration, 0.4);
        assert!((click.avg_duration - 0.25).abs() < 1e-12);
    }
}
