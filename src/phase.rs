//! Phase aggregation for display
//!
//! Derives, on read, the three per-phase values and the optional total of a
//! quantity from a device's reading state. Nothing here is stored.
//!
//! Total precedence (highest first):
//! - bare `V` present -> `V`
//! - any of `VL1..VL3` present -> `VL1 + VL2 + VL3`
//! - otherwise -> `VS1 + VS2 + VS3`
//!
//! Missing phases contribute 0 to a sum and display as `0.00`.

use crate::quantity::{PHASES, PhaseFamily, QUANTITY_ROWS, QuantityRow, phase_code};
use crate::reading::DeviceReadingState;
use serde::Serialize;

/// One phase of an aggregated quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseValue {
    /// Phase number, 1..=3
    pub phase: u8,
    /// Whether either spelling of this phase has been received
    pub present: bool,
    /// Numeric value, 0 when unknown
    pub value: f64,
    /// Value formatted with two fractional digits
    pub display: String,
}

/// Derived view of one quantity for one device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedQuantity {
    /// Base code the values were derived from
    pub base: String,
    /// Whether the row should be rendered at all
    pub display: bool,
    /// Phase 1, 2 and 3
    pub phases: [PhaseValue; 3],
    /// Total, only when requested
    pub total: Option<f64>,
    /// Total formatted with two fractional digits
    pub total_display: Option<String>,
}

/// Format a display number with exactly two fractional digits
pub fn format_fixed(value: f64) -> String {
    // avoid "-0.00"
    let v = if value == 0.0 || !value.is_finite() { 0.0 } else { value };
    format!("{:.2}", v)
}

fn phase_value(state: &DeviceReadingState, base: &str, phase: u8) -> PhaseValue {
    let line = phase_code(base, PhaseFamily::Line, phase);
    let string = phase_code(base, PhaseFamily::String, phase);
    let line_present = state.presence(&line);
    let value = if line_present {
        state.numeric(&line)
    } else {
        state.numeric(&string)
    };
    PhaseValue {
        phase,
        present: line_present || state.presence(&string),
        value,
        display: format_fixed(value),
    }
}

fn family_sum(state: &DeviceReadingState, base: &str, family: PhaseFamily) -> f64 {
    PHASES
        .iter()
        .map(|&k| state.numeric(&phase_code(base, family, k)))
        .sum()
}

/// Compute the total of `base` following the bare > L > S precedence
pub fn total(state: &DeviceReadingState, base: &str) -> f64 {
    if state.presence(base) {
        return state.numeric(base);
    }
    let any_line = PHASES
        .iter()
        .any(|&k| state.presence(&phase_code(base, PhaseFamily::Line, k)));
    if any_line {
        family_sum(state, base, PhaseFamily::Line)
    } else {
        family_sum(state, base, PhaseFamily::String)
    }
}

/// Aggregate `base` for display, with a total when `with_total` is set
pub fn aggregate(state: &DeviceReadingState, base: &str, with_total: bool) -> AggregatedQuantity {
    let phases = [
        phase_value(state, base, 1),
        phase_value(state, base, 2),
        phase_value(state, base, 3),
    ];
    let display = state.presence(base) || phases.iter().any(|p| p.present);
    let sum = with_total.then(|| total(state, base));

    AggregatedQuantity {
        base: base.to_string(),
        display,
        phases,
        total: sum,
        total_display: sum.map(format_fixed),
    }
}

/// Catalogue rows that have data for this device, aggregated
pub fn device_rows(state: &DeviceReadingState) -> Vec<(&'static QuantityRow, AggregatedQuantity)> {
    QUANTITY_ROWS
        .iter()
        .map(|row| (row, aggregate(state, row.base, row.sum)))
        .filter(|(_, agg)| agg.display)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(pairs: &[(&str, serde_json::Value)]) -> DeviceReadingState {
        let mut s = DeviceReadingState::new();
        for (code, v) in pairs {
            s.merge(code, v);
        }
        s
    }

    fn displays(agg: &AggregatedQuantity) -> Vec<&str> {
        agg.phases.iter().map(|p| p.display.as_str()).collect()
    }

    #[test]
    fn bare_total_wins_over_line_family() {
        let s = state(&[
            ("Voltage", json!(10)),
            ("VoltageL1", json!(1)),
            ("VoltageL2", json!(2)),
            ("VoltageL3", json!(3)),
        ]);
        let agg = aggregate(&s, "Voltage", true);
        assert_eq!(agg.total_display.as_deref(), Some("10.00"));
        assert_eq!(displays(&agg), vec!["1.00", "2.00", "3.00"]);
    }

    #[test]
    fn missing_phase_contributes_zero() {
        let s = state(&[("PowerL1", json!(1)), ("PowerL2", json!(2))]);
        let agg = aggregate(&s, "Power", true);
        assert_eq!(agg.total_display.as_deref(), Some("3.00"));
        assert!(agg.phases[0].present);
        assert!(!agg.phases[2].present);
        assert_eq!(agg.phases[2].display, "0.00");
    }

    #[test]
    fn line_family_wins_over_string_family() {
        let s = state(&[
            ("CurrentL2", json!(5)),
            ("CurrentS1", json!(100)),
            ("CurrentS2", json!(100)),
            ("CurrentS3", json!(100)),
        ]);
        let agg = aggregate(&s, "Current", true);
        assert_eq!(agg.total, Some(5.0));
        // phase 1 has no L value, so the S spelling is shown
        assert_eq!(displays(&agg), vec!["100.00", "5.00", "100.00"]);
    }

    #[test]
    fn string_family_sums_when_alone() {
        let s = state(&[("DCPowerS1", json!("1000.5")), ("DCPowerS3", json!(499.5))]);
        let agg = aggregate(&s, "DCPower", true);
        assert!(agg.display);
        assert_eq!(agg.total_display.as_deref(), Some("1500.00"));
    }

    #[test]
    fn nothing_received_means_no_display() {
        let s = state(&[("Frequency", json!(50))]);
        let agg = aggregate(&s, "Voltage", true);
        assert!(!agg.display);
        assert_eq!(agg.total_display.as_deref(), Some("0.00"));
    }

    #[test]
    fn total_only_when_requested() {
        let s = state(&[("VoltageL1", json!(230))]);
        let agg = aggregate(&s, "Voltage", false);
        assert_eq!(agg.total, None);
        assert_eq!(agg.total_display, None);
    }

    #[test]
    fn bare_only_quantity_displays() {
        let s = state(&[("Frequency", json!(49.98))]);
        let agg = aggregate(&s, "Frequency", false);
        assert!(agg.display);
        assert_eq!(displays(&agg), vec!["0.00", "0.00", "0.00"]);
    }

    #[test]
    fn format_fixed_rounds_and_never_prints_negative_zero() {
        assert_eq!(format_fixed(230.1), "230.10");
        assert_eq!(format_fixed(-0.0), "0.00");
        assert_eq!(format_fixed(f64::NAN), "0.00");
        assert_eq!(format_fixed(-1.5), "-1.50");
    }

    #[test]
    fn device_rows_follow_catalogue_order() {
        let s = state(&[
            ("PowerL1", json!(10)),
            ("VoltageL1", json!(230)),
            ("Unknown", json!(1)),
        ]);
        let rows = device_rows(&s);
        let bases: Vec<&str> = rows.iter().map(|(r, _)| r.base).collect();
        assert_eq!(bases, vec!["Voltage", "Power"]);
        assert_eq!(rows[1].1.total_display.as_deref(), Some("10.00"));
    }
}
