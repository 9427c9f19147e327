//! Synthetic gyro signal used to drive the analyzer without hardware.
//!
//! Each axis sees the motor fundamental sweeping with throttle, a few of its
//! harmonics, a fixed frame resonance and uniform noise.

use std::f32::consts::PI;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use crate::axis::Axis;
use crate::utils::SAMPLE_RATE_HZ;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Motor fundamental at idle throttle.
    pub motor_base_hz: f32,
    /// Extra frequency reached at the top of the throttle sweep.
    pub motor_sweep_hz: f32,
    /// Seconds for one full throttle up/down sweep. 0 disables sweeping.
    pub sweep_period_s: f32,
    /// Number of motor partials including the fundamental.
    pub harmonics: u32,
    pub motor_amplitude: f32,
    pub frame_resonance_hz: f32,
    pub frame_amplitude: f32,
    pub noise_amplitude: f32,
    /// Signal scale per axis, roll/pitch/yaw.
    pub axis_gain: [f32; 3],
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            motor_base_hz: 120.0,
            motor_sweep_hz: 180.0,
            sweep_period_s: 8.0,
            harmonics: 3,
            motor_amplitude: 40.0,
            frame_resonance_hz: 540.0,
            frame_amplitude: 12.0,
            noise_amplitude: 4.0,
            axis_gain: [1.0, 0.8, 0.5],
            seed: 0x5eed,
        }
    }
}

/// Generates gyro captures at the analyzer sample rate.
pub struct GyroSimulator {
    config: SimulationConfig,
    rng: StdRng,
    // Index of the first sample of the next capture
    position: u64,
}

impl GyroSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        debug!("Gyro simulator: motor {:.0}+{:.0} Hz, {} harmonics, frame {:.0} Hz",
               config.motor_base_hz, config.motor_sweep_hz, config.harmonics, config.frame_resonance_hz);
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng, position: 0 }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seconds of signal generated so far.
    pub fn elapsed_s(&self) -> f32 {
        self.position as f32 / SAMPLE_RATE_HZ as f32
    }

    /// Motor fundamental at the current position.
    pub fn motor_hz(&self) -> f32 {
        let cfg = &self.config;
        if cfg.sweep_period_s <= 0.0 {
            return cfg.motor_base_hz;
        }
        let phase = 2.0 * PI * self.elapsed_s() / cfg.sweep_period_s;
        cfg.motor_base_hz + cfg.motor_sweep_hz * 0.5 * (1.0 - phase.cos())
    }

    /// Writes one capture for `axis` starting at the current position. The
    /// motor frequency is held for the whole capture.
    pub fn fill(&mut self, axis: Axis, samples: &mut [f32]) {
        let motor_hz = self.motor_hz();
        let cfg = &self.config;
        let gain = cfg.axis_gain[axis.index()];
        // Axes see the same vibration with a small phase offset
        let axis_phase = axis.index() as f32 * PI / 3.0;
        let rate = SAMPLE_RATE_HZ as f32;

        for (i, sample) in samples.iter_mut().enumerate() {
            let t = (self.position + i as u64) as f32 / rate;
            let mut value = 0.0;

            for h in 1..=cfg.harmonics {
                let freq = motor_hz * h as f32;
                value += cfg.motor_amplitude / h as f32 * (2.0 * PI * freq * t + axis_phase).sin();
            }
            value += cfg.frame_amplitude * (2.0 * PI * cfg.frame_resonance_hz * t).sin();
            if cfg.noise_amplitude > 0.0 {
                value += self.rng.gen_range(-1.0f32..1.0) * cfg.noise_amplitude;
            }

            *sample = gain * value;
        }
    }

    /// Moves the position forward by `samples`.
    pub fn advance(&mut self, samples: usize) {
        self.position += samples as u64;
    }
}
