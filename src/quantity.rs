//! Quantity codes and the dashboard row catalogue
//!
//! IEC 61850 style codes name one scalar slot each. A per-phase slot is a
//! base name plus a phase suffix; two suffix families are in use and mean the
//! same thing.

/// Per-phase suffix family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseFamily {
    /// `L1`/`L2`/`L3`, used by AC meters
    Line,
    /// `S1`/`S2`/`S3`, used by inverter strings
    String,
}

impl PhaseFamily {
    /// Suffix letter of this family
    pub fn letter(self) -> char {
        match self {
            PhaseFamily::Line => 'L',
            PhaseFamily::String => 'S',
        }
    }
}

/// Phase numbers, in display order
pub const PHASES: [u8; 3] = [1, 2, 3];

/// Code of phase `phase` of `base` in `family`, e.g. `VoltageL1`
pub fn phase_code(base: &str, family: PhaseFamily, phase: u8) -> String {
    format!("{}{}{}", base, family.letter(), phase)
}

/// One row of the realtime table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityRow {
    /// Human readable title
    pub title: &'static str,
    /// Base quantity code
    pub base: &'static str,
    /// Display unit
    pub unit: &'static str,
    /// Whether the row shows a three-phase total
    pub sum: bool,
}

const fn row(title: &'static str, base: &'static str, unit: &'static str, sum: bool) -> QuantityRow {
    QuantityRow {
        title,
        base,
        unit,
        sum,
    }
}

/// Rows rendered for every device, in order
pub const QUANTITY_ROWS: &[QuantityRow] = &[
    row("Frequency", "Frequency", "Hz", false),
    row("Voltage", "Voltage", "V", false),
    row("Current", "Current", "A", true),
    row("Power", "Power", "W", true),
    row("Import Power", "ImportPower", "W", true),
    row("Export Power", "ExportPower", "W", true),
    row("Reactive Power", "ReactivePower", "var", true),
    row("Apparent Power", "ApparentPower", "VA", true),
    row("Power Factor", "Cosphi", "", false),
    row("THD", "THD", "%", false),
    row("Total Energy", "Sum", "kWh", true),
    row("Import Energy", "Import", "kWh", true),
    row("Export Energy", "Export", "kWh", true),
    row("Reactive Energy", "ReactiveSum", "kvarh", true),
    row("DC Current", "DCCurrent", "A", true),
    row("DC Voltage", "DCVoltage", "V", false),
    row("DC Power", "DCPower", "W", true),
    row("DC Energy", "DCEnergy", "kWh", true),
    row("Heat Sink Temperature", "HeatSinkTemp", "°C", false),
    row("Charge State", "ChargeState", "%", false),
    row("Battery Voltage", "BatteryVoltage", "V", false),
];

/// Look up the catalogue row for a base code
pub fn find_row(base: &str) -> Option<&'static QuantityRow> {
    QUANTITY_ROWS.iter().find(|r| r.base == base)
}
