//! Synthetic user and event telemetry.
//!
//! Everything is drawn from one seeded RNG so a given seed always produces the
//! same files, event ids included.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::config::SynthConfig;
use crate::errors::{EngageError, EngageResult};

pub const SIGNUP_WINDOW_DAYS: i64 = 60;
pub const MEETING_DURATION_MEAN_SEC: f64 = 300.0;
pub const LATENCY_MEAN_MS: f64 = 120.0;
pub const LATENCY_STD_MS: f64 = 40.0;
pub const CRASH_PROBABILITY: f64 = 0.004;

pub const TIERS: [(&str, f64); 2] = [("free", 0.8), ("premium", 0.2)];
pub const ORG_SIZES: [(&str, f64); 3] = [("small", 0.6), ("medium", 0.3), ("large", 0.1)];
pub const EVENT_TYPES: [(&str, f64); 8] = [
    ("sign_in", 0.05),
    ("message_sent", 0.50),
    ("meeting_join", 0.12),
    ("screen_share", 0.08),
    ("file_upload", 0.06),
    ("reaction", 0.15),
    ("sign_out", 0.03),
    ("error", 0.01),
];
pub const DEVICES: [&str; 3] = ["desktop", "mobile", "web"];
pub const REGIONS: [&str; 4] = ["US", "IN", "EU", "APAC"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub signup_date: NaiveDate,
    pub user_tier: String,
    pub org_size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: Uuid,
    pub user_id: String,
    pub ts: NaiveDateTime,
    pub event_type: String,
    pub device_type: String,
    pub region: String,
    /// Filled later by sessionization in the warehouse; always empty here.
    pub session_id: Option<String>,
    pub duration_sec: Option<f64>,
    pub latency_ms: f64,
    pub crash: u8,
}

/// Categorical sampler over `(label, weight)` pairs.
struct Categorical {
    labels: Vec<&'static str>,
    index: WeightedIndex<f64>,
}

impl Categorical {
    fn new(choices: &[(&'static str, f64)]) -> EngageResult<Self> {
        let index = WeightedIndex::new(choices.iter().map(|(_, w)| *w))
            .map_err(|e| EngageError::config(format!("invalid category weights: {e}")))?;
        Ok(Self {
            labels: choices.iter().map(|(l, _)| *l).collect(),
            index,
        })
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> &'static str {
        self.labels[self.index.sample(rng)]
    }
}

fn pick<R: Rng>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options[rng.random_range(0..options.len())]
}

pub struct Synthesizer {
    config: SynthConfig,
    rng: StdRng,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn generate_users(&mut self) -> EngageResult<Vec<UserRecord>> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .ok_or_else(|| EngageError::internal("invalid signup start date"))?;
        let tiers = Categorical::new(&TIERS)?;
        let orgs = Categorical::new(&ORG_SIZES)?;

        let users = (0..self.config.users)
            .map(|i| {
                let offset = self.rng.random_range(0..SIGNUP_WINDOW_DAYS);
                UserRecord {
                    user_id: format!("user_{i}"),
                    signup_date: start + Duration::days(offset),
                    user_tier: tiers.sample(&mut self.rng).to_string(),
                    org_size: orgs.sample(&mut self.rng).to_string(),
                }
            })
            .collect();
        Ok(users)
    }

    pub fn generate_events(&mut self, users: &[UserRecord]) -> EngageResult<Vec<EventRecord>> {
        let start = NaiveDate::from_ymd_opt(2025, 8, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| EngageError::internal("invalid event start date"))?;
        let per_day = Poisson::new(self.config.avg_events_per_day)
            .map_err(|e| EngageError::config(format!("invalid events-per-day rate: {e}")))?;
        let duration = Exp::new(1.0 / MEETING_DURATION_MEAN_SEC)
            .map_err(|e| EngageError::config(format!("invalid duration distribution: {e}")))?;
        let latency = Normal::new(LATENCY_MEAN_MS, LATENCY_STD_MS)
            .map_err(|e| EngageError::config(format!("invalid latency distribution: {e}")))?;
        let event_types = Categorical::new(&EVENT_TYPES)?;

        let mut events = Vec::new();
        for user in users {
            for day in 0..self.config.days {
                let day_start = start + Duration::days(i64::from(day));
                let n = per_day.sample(&mut self.rng) as u64;

                for _ in 0..n {
                    let event_type = event_types.sample(&mut self.rng);
                    let ts = day_start + Duration::seconds(self.rng.random_range(0..86_400));
                    let event_id = uuid::Builder::from_random_bytes(self.rng.random()).into_uuid();
                    let device_type = pick(&mut self.rng, &DEVICES);
                    let region = pick(&mut self.rng, &REGIONS);
                    let duration_sec = if event_type == "meeting_join" {
                        Some(duration.sample(&mut self.rng))
                    } else {
                        None
                    };
                    let latency_ms = latency.sample(&mut self.rng);
                    let crash = u8::from(self.rng.random::<f64>() < CRASH_PROBABILITY);

                    events.push(EventRecord {
                        event_id,
                        user_id: user.user_id.clone(),
                        ts,
                        event_type: event_type.to_string(),
                        device_type: device_type.to_string(),
                        region: region.to_string(),
                        session_id: None,
                        duration_sec,
                        latency_ms,
                        crash,
                    });
                }
            }
        }
        Ok(events)
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> EngageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| EngageError::io(format!("creating {}", parent.display()), e))?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| EngageError::csv(format!("opening {}", path.display()), e))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .map_err(|e| EngageError::io(format!("flushing {}", path.display()), e))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateSummary {
    pub users: usize,
    pub events: usize,
}

/// Generate both tables and write them as CSV files.
pub fn generate_to(config: &SynthConfig, users_path: &Path, events_path: &Path) -> EngageResult<GenerateSummary> {
    let mut synth = Synthesizer::new(config.clone());

    info!("Generating {} users", config.users);
    let users = synth.generate_users()?;
    write_csv(users_path, &users)?;

    info!("Generating events over {} days", config.days);
    let events = synth.generate_events(&users)?;
    write_csv(events_path, &events)?;

    info!(
        "Data generation complete: {} users -> {}, {} events -> {}",
        users.len(),
        users_path.display(),
        events.len(),
        events_path.display()
    );
    Ok(GenerateSummary {
        users: users.len(),
        events: events.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SynthConfig {
        SynthConfig {
            users: 20,
            days: 3,
            avg_events_per_day: 4.0,
            seed: 7,
        }
    }

    #[test]
    fn same_seed_same_output() {
        let mut a = Synthesizer::new(small());
        let mut b = Synthesizer::new(small());
        let users_a = a.generate_users().unwrap();
        let users_b = b.generate_users().unwrap();
        assert_eq!(users_a, users_b);
        assert_eq!(
            a.generate_events(&users_a).unwrap(),
            b.generate_events(&users_b).unwrap()
        );
    }

    #[test]
    fn users_respect_categories_and_signup_window() {
        let mut synth = Synthesizer::new(small());
        let users = synth.generate_users().unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert_eq!(users.len(), 20);
        assert_eq!(users[3].user_id, "user_3");
        for user in &users {
            let offset = (user.signup_date - start).num_days();
            assert!((0..SIGNUP_WINDOW_DAYS).contains(&offset));
            assert!(TIERS.iter().any(|(t, _)| *t == user.user_tier));
            assert!(ORG_SIZES.iter().any(|(o, _)| *o == user.org_size));
        }
    }

    #[test]
    fn only_meetings_carry_a_duration() {
        let mut synth = Synthesizer::new(small());
        let users = synth.generate_users().unwrap();
        let events = synth.generate_events(&users).unwrap();

        assert!(!events.is_empty());
        for event in &events {
            assert_eq!(event.duration_sec.is_some(), event.event_type == "meeting_join");
            assert!(event.session_id.is_none());
            assert!(event.crash <= 1);
            assert!(DEVICES.contains(&event.device_type.as_str()));
            assert!(REGIONS.contains(&event.region.as_str()));
        }
    }
}
