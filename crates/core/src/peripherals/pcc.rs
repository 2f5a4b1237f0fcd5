// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Peripheral Clock Controller (PCC) stub.
//!
//! Only the FTM0 gating slot is modeled, which is enough for firmware that
//! opens the trigger-source clock before programming the converter.

use crate::regbank::{FieldAccess, FieldDef, NoHook, RegisterBank, RegisterDef, Unhooked};
use crate::{Peripheral, SimResult};

const fn field(name: &'static str, lsb: u8, width: u8) -> FieldDef<NoHook> {
    FieldDef {
        name,
        lsb,
        width,
        access: FieldAccess::ReadWrite,
        hook: None,
    }
}

static REGISTER_MAP: &[RegisterDef<NoHook>] = &[RegisterDef {
    name: "PCC_FTM0",
    offset: 0xE0,
    reset: 0,
    fields: &[field("PCS", 24, 3), field("CGC", 30, 1), field("PR", 31, 1)],
}];

#[derive(Debug)]
pub struct Pcc {
    regs: RegisterBank<NoHook>,
}

impl Pcc {
    pub fn new() -> Self {
        Self {
            regs: RegisterBank::new(REGISTER_MAP),
        }
    }
}

impl Default for Pcc {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral for Pcc {
    fn read(&self, offset: u64) -> SimResult<u32> {
        Ok(self.regs.read(offset, &Unhooked))
    }

    fn write(&mut self, offset: u64, value: u32) -> SimResult<()> {
        self.regs.write(offset, value, &mut Unhooked)
    }

    fn reset(&mut self) {
        self.regs.reset();
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({ "registers": self.regs.snapshot() })
    }
}
