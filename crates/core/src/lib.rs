// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod bench;
pub mod bus;
pub mod peripherals;
pub mod regbank;
pub mod sample;
pub mod signals;
pub mod timer;

use std::any::Any;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Bus fault: no peripheral mapped at {0:#x}")]
    BusFault(u64),
    #[error("Unaligned word access at {0:#x}")]
    UnalignedAccess(u64),
    #[error("Invalid channel {channel}: converter has {count} channels")]
    InvalidChannel { channel: u32, count: usize },
    #[error("Sample file error: {0}")]
    SampleFile(#[from] sample::SampleFileError),
}

pub type SimResult<T> = Result<T, SimulationError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeripheralTickResult {
    pub irq: bool,
    /// Virtual cycles the peripheral consumed doing real work this tick.
    pub cycles: u32,
}

/// Trait representing a memory-mapped peripheral.
///
/// Access is word-granular: the S32K reference manual disallows byte and
/// half-word transfers to these blocks, so the bus only issues aligned
/// 32-bit transactions and `offset` is always a multiple of four.
pub trait Peripheral: std::fmt::Debug + Send {
    fn read(&self, offset: u64) -> SimResult<u32>;
    fn write(&mut self, offset: u64, value: u32) -> SimResult<()>;
    /// Advance one virtual cycle. Timed events fire from here, never from
    /// inside a register access.
    fn tick(&mut self) -> PeripheralTickResult {
        PeripheralTickResult::default()
    }
    /// Restore power-on state in place. No reallocation.
    fn reset(&mut self) {}
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}
