//! Optional metrics instrumentation.
//!
//! When the `observe` feature is enabled, fill, link and event outcomes emit
//! counters and histograms via the [`metrics`] crate. A downstream
//! application must install a metrics recorder to collect them.
//!
//! Without the feature every function in this module is a no-op.

/// Record the selection outcome of one component's fill phase.
///
/// - `skimmer.fill.selected_total` – records that produced an output entry
/// - `skimmer.fill.dropped_total` – records rejected by selection
#[inline]
pub fn record_fill(component: &str, selected: usize, dropped: usize) {
    #[cfg(feature = "observe")]
    {
        let component = component.to_string();
        metrics::counter!("skimmer.fill.selected_total", "component" => component.clone())
            .increment(selected as u64);
        metrics::counter!("skimmer.fill.dropped_total", "component" => component)
            .increment(dropped as u64);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (component, selected, dropped);
    }
}

/// Record resolved and unresolved references for one identity map.
///
/// - `skimmer.link.resolved_total`
/// - `skimmer.link.unresolved_total`
#[inline]
pub fn record_links(map: &str, resolved: usize, unresolved: usize) {
    #[cfg(feature = "observe")]
    {
        let map = map.to_string();
        metrics::counter!("skimmer.link.resolved_total", "map" => map.clone())
            .increment(resolved as u64);
        metrics::counter!("skimmer.link.unresolved_total", "map" => map)
            .increment(unresolved as u64);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (map, resolved, unresolved);
    }
}

/// Record one processed event.
///
/// - `skimmer.event.duration_seconds` – histogram
/// - `skimmer.event.failed_total` – counter, incremented when the event aborted
#[inline]
pub fn record_event(duration: std::time::Duration, success: bool) {
    #[cfg(feature = "observe")]
    {
        metrics::histogram!("skimmer.event.duration_seconds").record(duration.as_secs_f64());
        if !success {
            metrics::counter!("skimmer.event.failed_total").increment(1);
        }
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, success);
    }
}
