//! Prometheus metrics

use metrics::{counter, gauge};

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Pages fetched successfully
    PagesFetched,
    /// Fetches that failed (network or HTTP status)
    FetchFailures,
    /// Pages whose expected structure was missing
    ParseFailures,
    /// Races written to the store
    RacesPersisted,
    /// Races the store rejected
    PersistFailures,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Races considered by the sum heuristic in the last backtest
    SumRacesConsidered,
    /// Sum heuristic win percentage
    SumWinPct,
    /// Sum heuristic place percentage
    SumPlacePct,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::PagesFetched => "formbt_pages_fetched_total",
        CounterMetric::FetchFailures => "formbt_fetch_failures_total",
        CounterMetric::ParseFailures => "formbt_parse_failures_total",
        CounterMetric::RacesPersisted => "formbt_races_persisted_total",
        CounterMetric::PersistFailures => "formbt_persist_failures_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::SumRacesConsidered => "formbt_sum_races_considered",
        GaugeMetric::SumWinPct => "formbt_sum_win_pct",
        GaugeMetric::SumPlacePct => "formbt_sum_place_pct",
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    counter!(counter_name(metric)).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = gauge_name(metric);
    gauge!(metric_name).set(value);
    tracing::debug!(metric = metric_name, value = value, "Setting gauge");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        for metric in [
            CounterMetric::PagesFetched,
            CounterMetric::FetchFailures,
            CounterMetric::ParseFailures,
            CounterMetric::RacesPersisted,
            CounterMetric::PersistFailures,
        ] {
            assert!(counter_name(metric).starts_with("formbt_"));
            assert!(counter_name(metric).ends_with("_total"));
        }
        assert_eq!(gauge_name(GaugeMetric::SumWinPct), "formbt_sum_win_pct");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        increment(CounterMetric::PagesFetched);
        set_gauge(GaugeMetric::SumPlacePct, 42.5);
    }
}
