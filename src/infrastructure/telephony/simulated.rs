//! Simulated softphone
//!
//! Stands in for a MicroSIP-style softphone when no real device is attached.
//! Outcomes and ring times are random; pass a seed for repeatable runs.

use crate::config::SimulatorConfig;
use crate::domain::campaign::value_object::CallOutcome;
use crate::domain::telephony::{TelephonyAdapter, TelephonyError};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

const SIMULATED_OUTCOMES: [CallOutcome; 4] = [
    CallOutcome::Answered,
    CallOutcome::NotAnswered,
    CallOutcome::NotActive,
    CallOutcome::VoiceMail,
];

pub struct SimulatedTelephonyAdapter {
    server: String,
    connect_delay: Duration,
    setup_delay: Duration,
    ring_secs: (u64, u64),
    connected: AtomicBool,
    calling: AtomicBool,
    rng: Mutex<StdRng>,
}

impl SimulatedTelephonyAdapter {
    pub fn new(server: impl Into<String>, config: &SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let min_ring = config.min_ring_secs.max(1);
        let max_ring = config.max_ring_secs.max(min_ring);

        Self {
            server: server.into(),
            connect_delay: Duration::from_millis(config.connect_delay_ms),
            setup_delay: Duration::from_millis(config.setup_delay_ms),
            ring_secs: (min_ring, max_ring),
            connected: AtomicBool::new(false),
            calling: AtomicBool::new(false),
            rng: Mutex::new(rng),
        }
    }

    pub fn is_calling(&self) -> bool {
        self.calling.load(Ordering::SeqCst)
    }

    fn roll(&self) -> (CallOutcome, Duration) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let outcome = *SIMULATED_OUTCOMES
            .choose(&mut *rng)
            .unwrap_or(&CallOutcome::NotAnswered);
        let ring = rng.gen_range(self.ring_secs.0..=self.ring_secs.1);
        (outcome, Duration::from_secs(ring))
    }
}

#[async_trait]
impl TelephonyAdapter for SimulatedTelephonyAdapter {
    async fn connect(&self) -> Result<(), TelephonyError> {
        info!("Connecting to SIP server: {}", self.server);
        tokio::time::sleep(self.connect_delay).await;
        self.connected.store(true, Ordering::SeqCst);
        info!("Connected to SIP server {}", self.server);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TelephonyError> {
        info!("Disconnecting from SIP server {}", self.server);
        self.connected.store(false, Ordering::SeqCst);
        self.calling.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn place_call(&self, phone_number: &str) -> Result<CallOutcome, TelephonyError> {
        if !self.is_connected() {
            warn!("Cannot call {}: not connected", phone_number);
            return Err(TelephonyError::NotConnected);
        }

        info!("Calling {}...", phone_number);
        self.calling.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.setup_delay).await;

        let (outcome, ring) = self.roll();
        tokio::time::sleep(ring).await;

        if !self.is_connected() {
            self.calling.store(false, Ordering::SeqCst);
            return Err(TelephonyError::Unreachable(format!(
                "connection to {} lost during call",
                self.server
            )));
        }

        if outcome != CallOutcome::Answered {
            self.calling.store(false, Ordering::SeqCst);
        }
        info!("Call to {} resolved: {}", phone_number, outcome);
        Ok(outcome)
    }

    async fn end_call(&self) -> Result<(), TelephonyError> {
        if self.calling.swap(false, Ordering::SeqCst) {
            info!("Call ended");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
