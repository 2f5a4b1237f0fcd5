// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// A level-held signal line on a peripheral boundary, used for interrupt and
/// DMA-request outputs. Lines exist as wiring points even when the modeled
/// feature subset never asserts them.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct InterruptLine {
    pending: bool,
}

impl InterruptLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pending(&mut self) {
        self.pending = true;
    }

    pub fn clear(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
