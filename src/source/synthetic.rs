//! Local synthetic event generator.
//!
//! Produces the same events the live backend would, with values drawn from
//! the same ranges, so the dashboard stays usable without a backend. One
//! call to [`SyntheticGenerator::next_tick`] is one second of backend time.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use trace_types::{
    ActiveUsersSample, AgentLogEntry, HealthSnapshot, HealthStatus, Issue, Resolution, Severity,
    StreamEvent, TelemetrySample, AGENT_TRACE,
};

/// Active users are emitted every this many ticks.
pub const USERS_EVERY: u64 = 2;
/// Health snapshots are emitted every this many ticks.
pub const HEALTH_EVERY: u64 = 5;
/// An issue may be raised every this many ticks.
pub const ISSUE_EVERY: u64 = 30;
/// Probability that an issue is raised when one may be.
pub const ISSUE_CHANCE: f64 = 0.6;
/// A historical resolution may be emitted every this many ticks.
pub const RESOLUTION_EVERY: u64 = 45;
pub const RESOLUTION_CHANCE: f64 = 0.5;

const PEAK_ENERGY_KWH: f64 = 150.0;
const PEAK_TRAFFIC_GBPS: f64 = 100.0;

const ROOT_CAUSES: [&str; 4] = ["High Traffic Load", "Network Congestion", "Energy Spike", "TRX Overload"];
const OPTIMIZATIONS: [&str; 4] = ["Load Balancing", "TRX Optimization", "Energy Saver", "None"];
const SEVERITIES: [Severity; 3] = [Severity::Critical, Severity::High, Severity::Medium];

/// Deterministic given a seed; see [`SyntheticGenerator::seeded`].
#[derive(Debug)]
pub struct SyntheticGenerator {
    rng: StdRng,
    region: String,
    tick: u64,
}

impl SyntheticGenerator {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            region: region.into(),
            tick: 0,
        }
    }

    pub fn seeded(region: impl Into<String>, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            region: region.into(),
            tick: 0,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Events for the next tick.
    ///
    /// Telemetry is always present. The first tick carries every periodic
    /// channel, so a fresh dashboard fills in immediately.
    pub fn next_tick(&mut self) -> Vec<StreamEvent> {
        let tick = self.tick;
        self.tick += 1;

        let mut events = vec![StreamEvent::Telemetry(self.telemetry())];

        if tick % USERS_EVERY == 0 {
            events.push(StreamEvent::ActiveUsers(self.active_users()));
        }
        if tick % HEALTH_EVERY == 0 {
            events.push(StreamEvent::Health(self.health()));
        }
        if tick % ISSUE_EVERY == 0 && self.rng.gen_bool(ISSUE_CHANCE) {
            events.push(StreamEvent::Issue(self.issue()));
        }
        if tick > 0 && tick % RESOLUTION_EVERY == 0 && self.rng.gen_bool(RESOLUTION_CHANCE) {
            events.push(StreamEvent::Resolution(self.resolution()));
        }

        events
    }

    pub fn telemetry(&mut self) -> TelemetrySample {
        let consumption = self.rng.gen_range(80.0..120.0);
        let traffic = self.rng.gen_range(30.0..90.0);
        let incidents = self.rng.gen_range(0..=3) as f64;

        let energy = clamp_pct(consumption / PEAK_ENERGY_KWH * 100.0);
        let congestion = clamp_pct(traffic / PEAK_TRAFFIC_GBPS * 100.0);
        let anomaly = clamp_pct(incidents * 18.0 + self.rng.gen_range(5.0..30.0));
        let traffic_load = clamp_pct(congestion + self.rng.gen_range(-5.0..8.0));
        let trx = (78.0 + 6.0 * self.standard_normal()).clamp(30.0, 100.0);

        TelemetrySample {
            timestamp: now(),
            region: Some(self.region.clone()),
            energy: round2(energy),
            congestion: round2(congestion),
            anomaly_score: round2(anomaly),
            traffic_load: round2(traffic_load),
            trx_utilization: round2(trx),
            power_draw: round2(consumption),
        }
    }

    pub fn active_users(&mut self) -> ActiveUsersSample {
        let connections = self.rng.gen_range(10_000u64..=40_000) as f64;
        let share = self.rng.gen_range(0.6..0.95);

        ActiveUsersSample {
            timestamp: now(),
            region: Some(self.region.clone()),
            active_users: (connections * share) as u64,
            tower_cluster: format!("Tower-{}", self.rng.gen_range(1..=8)),
            last_optimization: self.pick(&OPTIMIZATIONS).to_string(),
            surge_detected: self.rng.gen_bool(0.1),
        }
    }

    /// Mostly healthy, sometimes degraded, rarely critical.
    pub fn health(&mut self) -> HealthSnapshot {
        let roll: f64 = self.rng.gen();
        let status = if roll < 0.75 {
            HealthStatus::Healthy
        } else if roll < 0.93 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Critical
        };

        let (lo, hi) = status.score_range();
        HealthSnapshot {
            score: round2(self.rng.gen_range(lo..=hi)),
            status,
            timestamp: Some(now()),
        }
    }

    pub fn issue(&mut self) -> Issue {
        let id = format!("issue-{}", self.hex(8));
        let title = *self.pick(&ROOT_CAUSES);
        let severity = *self.pick(&SEVERITIES);
        let tower = format!("Tower-{}", self.rng.gen_range(1..=10));
        let active_agent = self.pick(&AGENT_TRACE).to_string();
        let impact = format!("{}%", self.rng.gen_range(60..=99));

        let mut issue = Issue::new(&id, title, severity)
            .description(title.replace(' ', "_"))
            .affected_towers([tower.clone()])
            .impact_score(impact)
            .active_agent(active_agent)
            .remediation_steps(["Scale resources", "Reroute traffic"])
            .region(self.region.clone());

        let stamp = Utc::now();
        for (idx, agent) in AGENT_TRACE.iter().enumerate() {
            let at = stamp - chrono::Duration::seconds(idx as i64 * 15);
            issue = issue.agent_log(AgentLogEntry {
                timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
                agent: agent.to_string(),
                message: format!("{} reviewed telemetry for incident {}", agent, id.to_uppercase()),
            });
        }

        issue.detailed_analysis = Some(format!(
            "Principal Agent detected elevated risk across {}. Automated evaluation \
             recommends proactive remediation to prevent user impact.",
            tower
        ));
        issue
    }

    /// A past remediation, as the backend reports when it has no fresh ones.
    pub fn resolution(&mut self) -> Resolution {
        let id = format!("resolution-{}", self.hex(6));
        let cause = self.pick(&ROOT_CAUSES).replace(' ', "_");
        let agent = self.pick(&AGENT_TRACE).to_string();
        let confidence = format!("{}%", self.rng.gen_range(80..=97));

        let mut resolution = Resolution::new(id, now(), "Historical Remediation")
            .summary(format!("{} mitigated", cause))
            .initiating_agent(agent)
            .action("Applied policy fix")
            .action("Verified KPIs")
            .rollback_status("Available")
            .confidence_score(confidence);
        resolution.region = Some(self.region.clone());
        resolution
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        // Every list passed in is a non-empty constant
        items.choose(&mut self.rng).unwrap_or(&items[0])
    }

    fn hex(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from_digit(self.rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect()
    }

    /// Approximately N(0, 1): sum of three uniforms, rescaled.
    fn standard_normal(&mut self) -> f64 {
        let sum: f64 = (0..3).map(|_| self.rng.gen::<f64>()).sum();
        (sum - 1.5) * 2.0
    }
}

/// Shortest interval the generator runs at.
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// A running generator task. Dropping it stops generation.
#[derive(Debug)]
pub struct SyntheticSource {
    handle: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    /// Spawn a task that emits one tick of events every `tick`.
    ///
    /// Events are offered with `try_send`: if the receiver is not keeping up
    /// they are dropped rather than queued. Ticks below [`MIN_TICK`] are
    /// raised to it.
    pub fn spawn(mut generator: SyntheticGenerator, tick: Duration, tx: mpsc::Sender<StreamEvent>) -> Self {
        let tick = tick.max(MIN_TICK);
        info!(region = generator.region(), ?tick, "synthetic generator started");

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                for event in generator.next_tick() {
                    match tx.try_send(event) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(event)) => {
                            debug!(channel = %event.channel(), "event buffer full, dropping synthetic event");
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => return,
                    }
                }
            }
        });

        Self { handle: Some(handle) }
    }

    /// Stop the generator and wait for its task to finish.
    ///
    /// Once this returns no further events from this source reach the channel.
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "synthetic generator task failed");
                }
            }
            debug!("synthetic generator stopped");
        }
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("synthetic generator stopped");
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn clamp_pct(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
