// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! S32K148-family analog-to-digital converter.
//!
//! Models the conversion pipeline at cycle granularity: software selects a
//! channel, the hardware-trigger gate admits the request, a per-channel
//! one-shot timer stands in for conversion latency, and expiry commits the
//! next harness-fed sample into the shared data register. Completion and
//! data are exposed through two register aliases with different read side
//! effects, as on the silicon.

use std::any::Any;
use std::cell::Cell;
use std::path::Path;

use crate::regbank::{FieldAccess, FieldClient, FieldDef, RegisterBank, RegisterDef};
use crate::sample::{parse_sample_file, SampleQueue};
use crate::signals::InterruptLine;
use crate::timer::OneShotTimer;
use crate::{Peripheral, PeripheralTickResult, SimResult, SimulationError};

/// Input channels per converter instance.
pub const NUM_CHANNELS: usize = 16;

/// Default conversion latency in bench cycles.
pub const DEFAULT_CONVERSION_CYCLES: u64 = 100;

/// ADCH value meaning "no channel selected"; writing it never starts a
/// conversion.
pub const CHANNEL_DISABLED: u32 = 0x3F;

/// COCO bit in either control/status alias.
pub const SC1_COCO: u32 = 1 << 7;

/// ADTRG (hardware trigger enable) bit in SC2.
pub const SC2_ADTRG: u32 = 1 << 6;

const SAMPLE_MASK: u32 = 0xFFF;

/// Word offsets of the register map, as named in the reference manual.
pub mod offsets {
    pub const SC1A: u64 = 0x00;
    pub const CFG1: u64 = 0x40;
    pub const CFG2: u64 = 0x44;
    pub const RA: u64 = 0x48;
    pub const CV1: u64 = 0x88;
    pub const CV2: u64 = 0x8C;
    pub const SC2: u64 = 0x90;
    pub const SC3: u64 = 0x94;
    pub const BASE_OFS: u64 = 0x98;
    pub const CLP9_OFS: u64 = 0xE8;
    pub const ASC1A: u64 = 0x108;
    pub const ARA: u64 = 0x188;
}

/// Behavior tags for the fields that are not plain storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdcField {
    /// ADCH through either control/status alias.
    Select,
    /// COCO through the primary alias: side-effect-free read.
    Completion,
    /// COCO through the alternate alias: a read observing `true` marks the
    /// readiness latch.
    CompletionLatched,
    /// Result through the primary alias: stable read.
    Data,
    /// Result through the alternate alias: zeroed right after each read.
    DataConsumed,
    /// SC2.ADTRG hardware-trigger gate.
    Trigger,
}

const fn field(name: &'static str, lsb: u8, width: u8, access: FieldAccess) -> FieldDef<AdcField> {
    FieldDef {
        name,
        lsb,
        width,
        access,
        hook: None,
    }
}

const fn hooked(
    name: &'static str,
    lsb: u8,
    width: u8,
    access: FieldAccess,
    tag: AdcField,
) -> FieldDef<AdcField> {
    FieldDef {
        name,
        lsb,
        width,
        access,
        hook: Some(tag),
    }
}

const fn reg(
    name: &'static str,
    offset: u64,
    fields: &'static [FieldDef<AdcField>],
) -> RegisterDef<AdcField> {
    RegisterDef {
        name,
        offset,
        reset: 0,
        fields,
    }
}

static REGISTER_MAP: &[RegisterDef<AdcField>] = &[
    reg(
        "SC1A",
        offsets::SC1A,
        &[
            hooked("ADCH", 0, 6, FieldAccess::ReadWrite, AdcField::Select),
            field("AIEN", 6, 1, FieldAccess::Tag),
            hooked("COCO", 7, 1, FieldAccess::ReadOnly, AdcField::Completion),
        ],
    ),
    reg(
        "CFG1",
        offsets::CFG1,
        &[
            field("ADICLK", 0, 2, FieldAccess::ReadWrite),
            field("MODE", 2, 2, FieldAccess::ReadWrite),
            field("ADIV", 5, 2, FieldAccess::ReadWrite),
            field("CLRLTRG", 8, 1, FieldAccess::ReadWrite),
        ],
    ),
    reg(
        "CFG2",
        offsets::CFG2,
        &[field("SMPLTS", 0, 8, FieldAccess::ReadWrite)],
    ),
    reg(
        "RA",
        offsets::RA,
        &[hooked("D", 0, 12, FieldAccess::ReadOnly, AdcField::Data)],
    ),
    reg(
        "CV1",
        offsets::CV1,
        &[field("CV", 0, 16, FieldAccess::ReadWrite)],
    ),
    reg(
        "CV2",
        offsets::CV2,
        &[field("CV", 0, 16, FieldAccess::ReadWrite)],
    ),
    reg(
        "SC2",
        offsets::SC2,
        &[
            field("REFSEL", 0, 2, FieldAccess::ReadWrite),
            field("DMAEN", 2, 1, FieldAccess::ReadWrite),
            field("ACREN", 3, 1, FieldAccess::ReadWrite),
            field("ACFGT", 4, 1, FieldAccess::ReadWrite),
            field("ACFE", 5, 1, FieldAccess::ReadWrite),
            hooked("ADTRG", 6, 1, FieldAccess::ReadWrite, AdcField::Trigger),
            field("ADACT", 7, 1, FieldAccess::ReadWrite),
            field("TRGPRNUM", 13, 2, FieldAccess::ReadWrite),
            field("TRGSTLAT", 16, 4, FieldAccess::ReadWrite),
            field("TRGSTERR", 24, 4, FieldAccess::ReadWrite),
        ],
    ),
    reg(
        "SC3",
        offsets::SC3,
        &[
            field("AVGS", 0, 2, FieldAccess::ReadWrite),
            field("AVGE", 2, 1, FieldAccess::ReadWrite),
            field("ADCO", 3, 1, FieldAccess::ReadWrite),
            field("CAL", 7, 1, FieldAccess::ReadWrite),
        ],
    ),
    // Offset correction and gain trim block. Inert storage, kept for
    // address-decode completeness; field widths follow the manual.
    reg(
        "BASE_OFS",
        offsets::BASE_OFS,
        &[field("BA_OFS", 0, 8, FieldAccess::ReadWrite)],
    ),
    reg("OFS", 0x9C, &[field("OFS", 0, 16, FieldAccess::ReadWrite)]),
    reg(
        "USR_OFS",
        0xA0,
        &[field("USR_OFS", 0, 8, FieldAccess::ReadWrite)],
    ),
    reg("XOFS", 0xA4, &[field("XOFS", 0, 6, FieldAccess::ReadWrite)]),
    reg("YOFS", 0xA8, &[field("YOFS", 0, 8, FieldAccess::ReadWrite)]),
    reg("G", 0xAC, &[field("G", 0, 11, FieldAccess::ReadWrite)]),
    reg("UG", 0xB0, &[field("UG", 0, 10, FieldAccess::ReadWrite)]),
    reg("CLPS", 0xB4, &[field("CLPS", 0, 7, FieldAccess::ReadWrite)]),
    reg("CLP3", 0xB8, &[field("CLP3", 0, 10, FieldAccess::ReadWrite)]),
    reg("CLP2", 0xBC, &[field("CLP2", 0, 10, FieldAccess::ReadWrite)]),
    reg("CLP1", 0xC0, &[field("CLP1", 0, 9, FieldAccess::ReadWrite)]),
    reg("CLP0", 0xC4, &[field("CLP0", 0, 8, FieldAccess::ReadWrite)]),
    reg("CLPX", 0xC8, &[field("CLPX", 0, 7, FieldAccess::ReadWrite)]),
    reg("CLP9", 0xCC, &[field("CLP9", 0, 7, FieldAccess::ReadWrite)]),
    reg(
        "CLPS_OFS",
        0xD0,
        &[field("CLPS_OFS", 0, 4, FieldAccess::ReadWrite)],
    ),
    reg(
        "CLP3_OFS",
        0xD4,
        &[field("CLP3_OFS", 0, 4, FieldAccess::ReadWrite)],
    ),
    reg(
        "CLP2_OFS",
        0xD8,
        &[field("CLP2_OFS", 0, 4, FieldAccess::ReadWrite)],
    ),
    reg(
        "CLP1_OFS",
        0xDC,
        &[field("CLP1_OFS", 0, 4, FieldAccess::ReadWrite)],
    ),
    reg(
        "CLP0_OFS",
        0xE0,
        &[field("CLP0_OFS", 0, 4, FieldAccess::ReadWrite)],
    ),
    reg(
        "CLPX_OFS",
        0xE4,
        &[field("CLPX_OFS", 0, 12, FieldAccess::ReadWrite)],
    ),
    reg(
        "CLP9_OFS",
        offsets::CLP9_OFS,
        &[field("CLP9_OFS", 0, 12, FieldAccess::ReadWrite)],
    ),
    reg(
        "aSC1A",
        offsets::ASC1A,
        &[
            hooked("ADCH", 0, 6, FieldAccess::ReadWrite, AdcField::Select),
            field("AIEN", 6, 1, FieldAccess::Tag),
            hooked(
                "COCO",
                7,
                1,
                FieldAccess::ReadOnly,
                AdcField::CompletionLatched,
            ),
        ],
    ),
    reg(
        "aRA",
        offsets::ARA,
        &[hooked("D", 0, 12, FieldAccess::ReadOnly, AdcField::DataConsumed)],
    ),
];

/// Per-channel state record. The busy guard, latency timer, and sample
/// source live here and are touched only by the conversion routines.
#[derive(Debug, serde::Serialize)]
struct Channel {
    busy: bool,
    delay_cycles: u64,
    timer: OneShotTimer,
    samples: SampleQueue,
}

impl Channel {
    fn new(delay_cycles: u64) -> Self {
        Self {
            busy: false,
            delay_cycles,
            timer: OneShotTimer::new(),
            samples: SampleQueue::new(),
        }
    }

    fn reset(&mut self) {
        self.busy = false;
        self.timer.cancel();
        self.samples.clear();
    }
}

/// Converter state shared by both register aliases. One physical converter
/// serves all channels, so the committed data word and the completion flag
/// are singletons.
#[derive(Debug, serde::Serialize)]
struct Converter {
    channels: Vec<Channel>,
    selected: u32,
    trigger_enabled: bool,
    completion: bool,
    data: Cell<u32>,
    result_ready: Cell<bool>,
    irq: InterruptLine,
    dma_request: InterruptLine,
}

impl Converter {
    fn new(delay_cycles: u64) -> Self {
        Self {
            channels: (0..NUM_CHANNELS).map(|_| Channel::new(delay_cycles)).collect(),
            selected: 0,
            trigger_enabled: false,
            completion: false,
            data: Cell::new(0),
            result_ready: Cell::new(false),
            irq: InterruptLine::new(),
            dma_request: InterruptLine::new(),
        }
    }

    fn channel_mut(&mut self, channel: u32) -> SimResult<&mut Channel> {
        let count = self.channels.len();
        self.channels
            .get_mut(channel as usize)
            .ok_or(SimulationError::InvalidChannel { channel, count })
    }

    /// Arm `channel` if it is idle and the hardware trigger admits the
    /// request. Busy and trigger-off requests are logged no-ops; an
    /// out-of-range channel is the caller's error and changes nothing.
    fn request_conversion(&mut self, channel: u32) -> SimResult<()> {
        let index = channel as usize;
        if index >= self.channels.len() {
            return Err(SimulationError::InvalidChannel {
                channel,
                count: self.channels.len(),
            });
        }
        if self.channels[index].busy {
            tracing::warn!("Conversion already in progress on channel {}", channel);
            return Ok(());
        }
        if !self.trigger_enabled {
            tracing::warn!(
                "Channel {} selected while the hardware trigger is disabled; not converting",
                channel
            );
            return Ok(());
        }

        self.completion = false;
        self.result_ready.set(false);
        let ch = &mut self.channels[index];
        ch.busy = true;
        ch.timer.start(ch.delay_cycles);
        tracing::debug!(
            "Conversion armed on channel {}, {} cycles to completion",
            channel,
            ch.delay_cycles
        );
        Ok(())
    }

    /// Completion for the firing channel: commit the next sample, raise the
    /// completion flag, release the busy guard.
    fn finish_conversion(&mut self, index: usize) {
        let ch = &mut self.channels[index];
        let sample = ch.samples.take() & SAMPLE_MASK;
        ch.busy = false;
        self.data.set(sample);
        self.completion = true;
        tracing::debug!("Conversion finished on channel {}: {:#05x}", index, sample);
    }

    /// Advance every channel's timer one cycle. Expirations are dispatched
    /// here in ascending channel order; with several in the same cycle the
    /// highest channel's value is the one left in the data register.
    fn tick(&mut self) -> PeripheralTickResult {
        let mut cycles = 0;
        for index in 0..self.channels.len() {
            if self.channels[index].timer.is_running() {
                cycles = 1;
            }
            if self.channels[index].timer.tick() {
                self.finish_conversion(index);
            }
        }
        PeripheralTickResult {
            irq: self.irq.is_pending(),
            cycles,
        }
    }

    fn reset(&mut self) {
        for ch in &mut self.channels {
            ch.reset();
        }
        self.selected = 0;
        self.trigger_enabled = false;
        self.completion = false;
        self.data.set(0);
        self.result_ready.set(false);
        self.irq.clear();
        self.dma_request.clear();
    }
}

impl FieldClient<AdcField> for Converter {
    fn read_field(&self, tag: AdcField) -> u32 {
        match tag {
            AdcField::Select => self.selected,
            AdcField::Completion => self.completion as u32,
            AdcField::CompletionLatched => {
                if self.completion {
                    self.result_ready.set(true);
                    tracing::debug!("Alternate-alias status read observed completion");
                }
                self.completion as u32
            }
            AdcField::Data => self.data.get(),
            AdcField::DataConsumed => {
                let value = self.data.get();
                self.data.set(0);
                value
            }
            AdcField::Trigger => self.trigger_enabled as u32,
        }
    }

    fn write_field(&mut self, tag: AdcField, _old: u32, new: u32) -> SimResult<()> {
        match tag {
            AdcField::Select => {
                if new != CHANNEL_DISABLED {
                    self.request_conversion(new)?;
                }
                // The committed select value updates even when the request
                // was a no-op; firmware reads back what it wrote.
                self.selected = new;
                Ok(())
            }
            AdcField::Trigger => {
                self.trigger_enabled = new != 0;
                tracing::debug!(
                    "Hardware trigger {}",
                    if self.trigger_enabled { "enabled" } else { "disabled" }
                );
                Ok(())
            }
            // The remaining tags sit behind read-only policies; the bank
            // never routes writes here.
            AdcField::Completion
            | AdcField::CompletionLatched
            | AdcField::Data
            | AdcField::DataConsumed => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct Adc {
    regs: RegisterBank<AdcField>,
    conv: Converter,
}

impl Adc {
    pub fn new() -> Self {
        Self::with_conversion_cycles(DEFAULT_CONVERSION_CYCLES)
    }

    /// Build a converter whose channels all start with `delay_cycles`
    /// latency.
    pub fn with_conversion_cycles(delay_cycles: u64) -> Self {
        debug_assert!(delay_cycles > 0);
        Self {
            regs: RegisterBank::new(REGISTER_MAP),
            conv: Converter::new(delay_cycles),
        }
    }

    /// Override one channel's conversion latency.
    pub fn set_channel_conversion_cycles(&mut self, channel: u32, cycles: u64) -> SimResult<()> {
        debug_assert!(cycles > 0);
        self.conv.channel_mut(channel)?.delay_cycles = cycles;
        Ok(())
    }

    /// Enqueue `repeat` copies of `value` on `channel`.
    pub fn feed(&mut self, channel: u32, value: u32, repeat: u32) -> SimResult<()> {
        self.conv.channel_mut(channel)?.samples.feed(value, repeat);
        tracing::debug!("Fed sample {} x{} on channel {}", value, repeat, channel);
        Ok(())
    }

    /// Enqueue a parsed sample file on `channel`, the whole sequence
    /// repeated `repeat` times. Parse failures enqueue nothing.
    pub fn feed_from_file(&mut self, channel: u32, path: &Path, repeat: u32) -> SimResult<()> {
        let ch = self.conv.channel_mut(channel)?;
        let samples = parse_sample_file(path)?;
        ch.samples.feed_sequence(&samples, repeat);
        tracing::debug!(
            "Fed {} file samples x{} on channel {}",
            samples.len(),
            repeat,
            channel
        );
        Ok(())
    }

    /// Readiness latch for harness synchronization: set when an
    /// alternate-alias status read observes completion, cleared by the next
    /// select write that actually arms.
    pub fn is_result_ready(&self) -> bool {
        let ready = self.conv.result_ready.get();
        tracing::debug!("Readiness query: {}", ready);
        ready
    }

    /// Interrupt output. Wired but never asserted by this feature subset.
    pub fn irq_line(&self) -> &InterruptLine {
        &self.conv.irq
    }

    /// DMA request output. Wired but never asserted by this feature subset.
    pub fn dma_request_line(&self) -> &InterruptLine {
        &self.conv.dma_request
    }
}

impl Default for Adc {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral for Adc {
    fn read(&self, offset: u64) -> SimResult<u32> {
        Ok(self.regs.read(offset, &self.conv))
    }

    fn write(&mut self, offset: u64, value: u32) -> SimResult<()> {
        self.regs.write(offset, value, &mut self.conv)
    }

    fn tick(&mut self) -> PeripheralTickResult {
        self.conv.tick()
    }

    fn reset(&mut self) {
        self.regs.reset();
        self.conv.reset();
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "registers": self.regs.snapshot(),
            "converter": serde_json::to_value(&self.conv).unwrap_or(serde_json::Value::Null),
        })
    }
}
