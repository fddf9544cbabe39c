//! Periodic metric samples and health snapshots.

use std::fmt;

/// One telemetry reading for a region.
///
/// All percentage fields are in the range 0-100. `power_draw` is in kWh.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetrySample {
    /// ISO-8601 timestamp of the reading.
    pub timestamp: String,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub region: Option<String>,

    /// Energy consumption as a percentage of peak.
    pub energy: f64,

    /// Traffic as a percentage of peak capacity.
    pub congestion: f64,

    pub anomaly_score: f64,

    pub traffic_load: f64,

    pub trx_utilization: f64,

    /// Raw consumption in kWh.
    pub power_draw: f64,
}

/// Names of the numeric telemetry metrics, used for chart selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryMetric {
    Energy,
    Congestion,
    AnomalyScore,
    TrafficLoad,
    TrxUtilization,
    PowerDraw,
}

impl TelemetryMetric {
    /// Every metric, in display order.
    pub const ALL: [TelemetryMetric; 6] = [
        TelemetryMetric::Energy,
        TelemetryMetric::Congestion,
        TelemetryMetric::AnomalyScore,
        TelemetryMetric::TrafficLoad,
        TelemetryMetric::TrxUtilization,
        TelemetryMetric::PowerDraw,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TelemetryMetric::Energy => "Energy",
            TelemetryMetric::Congestion => "Congestion",
            TelemetryMetric::AnomalyScore => "Anomaly",
            TelemetryMetric::TrafficLoad => "Traffic",
            TelemetryMetric::TrxUtilization => "TRX Util",
            TelemetryMetric::PowerDraw => "Power",
        }
    }

    /// Unit suffix for display.
    pub fn unit(&self) -> &'static str {
        match self {
            TelemetryMetric::PowerDraw => "kWh",
            _ => "%",
        }
    }
}

impl TelemetrySample {
    /// Read a single metric from the sample.
    pub fn value(&self, metric: TelemetryMetric) -> f64 {
        match metric {
            TelemetryMetric::Energy => self.energy,
            TelemetryMetric::Congestion => self.congestion,
            TelemetryMetric::AnomalyScore => self.anomaly_score,
            TelemetryMetric::TrafficLoad => self.traffic_load,
            TelemetryMetric::TrxUtilization => self.trx_utilization,
            TelemetryMetric::PowerDraw => self.power_draw,
        }
    }
}

/// Active-user count for a tower cluster.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ActiveUsersSample {
    pub timestamp: String,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub region: Option<String>,

    pub active_users: u64,

    pub tower_cluster: String,

    /// Last optimization applied to the cluster ("None" if nothing ran).
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_optimization: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub surge_detected: bool,
}

/// Coarse health status reported alongside the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HealthStatus {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "healthy", alias = "HEALTHY"))]
    Healthy,
    #[cfg_attr(feature = "serde", serde(alias = "degraded", alias = "DEGRADED"))]
    Degraded,
    #[cfg_attr(feature = "serde", serde(alias = "critical", alias = "CRITICAL"))]
    Critical,
}

impl HealthStatus {
    /// Score range the backend draws from for this status.
    pub fn score_range(&self) -> (f64, f64) {
        match self {
            HealthStatus::Healthy => (93.0, 98.0),
            HealthStatus::Degraded => (70.0, 85.0),
            HealthStatus::Critical => (45.0, 65.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Latest overall health. Each new snapshot replaces the previous one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthSnapshot {
    /// Score between 0 and 100.
    pub score: f64,

    pub status: HealthStatus,

    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "generated_at", skip_serializing_if = "Option::is_none")
    )]
    pub timestamp: Option<String>,
}

impl HealthSnapshot {
    pub fn new(score: f64, status: HealthStatus) -> Self {
        Self {
            score,
            status,
            timestamp: None,
        }
    }
}
