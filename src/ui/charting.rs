use keystride::time_series::MetricSample;

/// Compute X (seconds) and Y (cpm) bounds for the results chart
pub fn compute_chart_params(history: &[MetricSample], duration: u32) -> (f64, f64) {
    let highest_cpm = history.iter().map(|p| p.cpm).max().unwrap_or(0);

    let mut overall_duration = match history.last() {
        Some(p) => p.time as f64,
        None => duration as f64,
    };
    if overall_duration < 1.0 {
        overall_duration = 1.0;
    }

    // Leave headroom so the peak isn't drawn on the border
    let ceiling = (highest_cpm + highest_cpm / 10).max(1);

    (overall_duration, ceiling as f64)
}

/// Axis label: integers without decimals, everything else to two places
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
