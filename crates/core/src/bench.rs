// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Discrete-event clock around a [`SystemBus`]. One tick is one virtual
//! cycle; conversion completions are delivered inside `tick`.

use crate::bus::SystemBus;
use samplerig_config::BenchDescriptor;

pub struct Bench {
    pub bus: SystemBus,
    total_cycles: u64,
}

impl Bench {
    pub fn new(bus: SystemBus) -> Self {
        Self {
            bus,
            total_cycles: 0,
        }
    }

    pub fn from_config(bench: &BenchDescriptor) -> anyhow::Result<Self> {
        Ok(Self::new(SystemBus::from_config(bench)?))
    }

    /// Cycles executed since construction or the last reset.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    pub fn run_cycles(&mut self, cycles: u64) {
        for _ in 0..cycles {
            for irq in self.bus.tick_peripherals() {
                tracing::debug!("IRQ {} asserted", irq);
            }
        }
        self.total_cycles += cycles;
    }

    pub fn reset(&mut self) {
        self.bus.reset();
        self.total_cycles = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripherals::adc::offsets;

    const ADC_BASE: u64 = 0x4003_B000;

    #[test]
    fn run_cycles_advances_mounted_peripherals() {
        let mut bench = Bench::new(SystemBus::new());
        bench.bus.adc_mut("adc0").unwrap().feed(7, 0x208, 1).unwrap();
        bench.bus.write_u32(ADC_BASE + offsets::SC2, 1 << 6).unwrap();
        bench.bus.write_u32(ADC_BASE + offsets::SC1A, 7).unwrap();

        bench.run_cycles(99);
        assert_eq!(bench.bus.read_u32(ADC_BASE + offsets::RA).unwrap(), 0);
        bench.run_cycles(1);
        assert_eq!(bench.bus.read_u32(ADC_BASE + offsets::RA).unwrap(), 0x208);
        assert_eq!(bench.total_cycles(), 100);
    }

    #[test]
    fn reset_clears_the_counter_and_the_bus() {
        let mut bench = Bench::new(SystemBus::new());
        bench.bus.write_u32(ADC_BASE + offsets::CFG2, 0x12).unwrap();
        bench.run_cycles(5);

        bench.reset();
        assert_eq!(bench.total_cycles(), 0);
        assert_eq!(bench.bus.read_u32(ADC_BASE + offsets::CFG2).unwrap(), 0);
    }
}
