// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Word-granular system bus.
//!
//! Peripherals are mounted at a base address with a window size; accesses
//! decode first-match to `(peripheral, offset)`. The register space of this
//! chip family disallows 8- and 16-bit transfers, so the bus only speaks
//! 32-bit words.

use crate::peripherals::adc::Adc;
use crate::peripherals::pcc::Pcc;
use crate::peripherals::sim::Sim;
use crate::{Peripheral, SimResult, SimulationError};
use anyhow::Context;
use samplerig_config::{BenchDescriptor, PeripheralConfig};

#[derive(Debug)]
pub struct PeripheralEntry {
    pub name: String,
    pub base: u64,
    pub size: u64,
    pub irq: Option<u32>,
    pub dev: Box<dyn Peripheral>,
}

#[derive(Debug)]
pub struct SystemBus {
    pub peripherals: Vec<PeripheralEntry>,
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBus {
    pub fn new() -> Self {
        // Default initialization for tests
        Self {
            peripherals: vec![
                PeripheralEntry {
                    name: "adc0".to_string(),
                    base: 0x4003_B000,
                    size: 0x1000,
                    irq: Some(39),
                    dev: Box::new(Adc::new()),
                },
                PeripheralEntry {
                    name: "sim".to_string(),
                    base: 0x4004_8000,
                    size: 0x1000,
                    irq: None,
                    dev: Box::new(Sim::new()),
                },
                PeripheralEntry {
                    name: "pcc".to_string(),
                    base: 0x4006_5000,
                    size: 0x200,
                    irq: None,
                    dev: Box::new(Pcc::new()),
                },
            ],
        }
    }

    pub fn from_config(bench: &BenchDescriptor) -> anyhow::Result<Self> {
        let mut bus = Self {
            peripherals: Vec::new(),
        };

        for p_cfg in &bench.peripherals {
            let dev: Box<dyn Peripheral> = match p_cfg.r#type.as_str() {
                "adc" => Box::new(adc_from_config(p_cfg)?),
                "sim" => Box::new(Sim::new()),
                "pcc" => Box::new(Pcc::new()),
                other => {
                    tracing::warn!(
                        "Unsupported peripheral type '{}' for id '{}'; skipping",
                        other,
                        p_cfg.id
                    );
                    continue;
                }
            };

            bus.peripherals.push(PeripheralEntry {
                name: p_cfg.id.clone(),
                base: p_cfg.base_address,
                size: p_cfg.window_bytes(),
                irq: p_cfg.irq,
                dev,
            });
        }

        Ok(bus)
    }

    pub fn read_u32(&self, addr: u64) -> SimResult<u32> {
        if addr % 4 != 0 {
            return Err(SimulationError::UnalignedAccess(addr));
        }
        for p in &self.peripherals {
            if addr >= p.base && addr < p.base + p.size {
                return p.dev.read(addr - p.base);
            }
        }
        Err(SimulationError::BusFault(addr))
    }

    pub fn write_u32(&mut self, addr: u64, value: u32) -> SimResult<()> {
        if addr % 4 != 0 {
            return Err(SimulationError::UnalignedAccess(addr));
        }
        for p in &mut self.peripherals {
            if addr >= p.base && addr < p.base + p.size {
                return p.dev.write(addr - p.base, value);
            }
        }
        Err(SimulationError::BusFault(addr))
    }

    /// Typed access to a named converter, for harness-side sample injection.
    pub fn adc_mut(&mut self, name: &str) -> Option<&mut Adc> {
        for p in &mut self.peripherals {
            if p.name != name {
                continue;
            }
            let Some(any) = p.dev.as_any_mut() else {
                continue;
            };
            if let Some(adc) = any.downcast_mut::<Adc>() {
                return Some(adc);
            }
        }
        None
    }

    /// Shared counterpart of [`SystemBus::adc_mut`], for readiness queries.
    pub fn adc(&self, name: &str) -> Option<&Adc> {
        for p in &self.peripherals {
            if p.name != name {
                continue;
            }
            let Some(any) = p.dev.as_any() else {
                continue;
            };
            if let Some(adc) = any.downcast_ref::<Adc>() {
                return Some(adc);
            }
        }
        None
    }

    /// Snapshot of a named peripheral's state, if mounted.
    pub fn peek_peripheral(&self, name: &str) -> Option<serde_json::Value> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.dev.snapshot())
    }

    /// Advance every peripheral one cycle and collect asserted interrupt
    /// numbers.
    pub fn tick_peripherals(&mut self) -> Vec<u32> {
        let mut interrupts = Vec::new();
        for p in &mut self.peripherals {
            let res = p.dev.tick();
            if res.irq {
                if let Some(irq) = p.irq {
                    interrupts.push(irq);
                }
            }
        }
        interrupts
    }

    pub fn reset(&mut self) {
        for p in &mut self.peripherals {
            p.dev.reset();
        }
    }
}

fn adc_from_config(p_cfg: &PeripheralConfig) -> anyhow::Result<Adc> {
    let mut adc = match p_cfg.config.get("conversion_cycles") {
        Some(raw) => {
            let cycles = raw.as_u64().filter(|&c| c > 0).ok_or_else(|| {
                anyhow::anyhow!(
                    "'conversion_cycles' for '{}' must be a positive integer",
                    p_cfg.id
                )
            })?;
            Adc::with_conversion_cycles(cycles)
        }
        None => Adc::new(),
    };

    if let Some(raw) = p_cfg.config.get("channel_conversion_cycles") {
        let overrides = raw.as_mapping().ok_or_else(|| {
            anyhow::anyhow!(
                "'channel_conversion_cycles' for '{}' must map channels to cycle counts",
                p_cfg.id
            )
        })?;
        for (key, value) in overrides {
            let channel = key.as_u64().and_then(|k| u32::try_from(k).ok()).ok_or_else(|| {
                anyhow::anyhow!(
                    "Channel keys in 'channel_conversion_cycles' for '{}' must be integers",
                    p_cfg.id
                )
            })?;
            let cycles = value.as_u64().filter(|&c| c > 0).ok_or_else(|| {
                anyhow::anyhow!(
                    "Cycle override for channel {} of '{}' must be a positive integer",
                    channel,
                    p_cfg.id
                )
            })?;
            adc.set_channel_conversion_cycles(channel, cycles)
                .with_context(|| format!("Bad channel override for '{}'", p_cfg.id))?;
        }
    }

    Ok(adc)
}
