// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! System Integration Module (SIM) configuration stub.
//!
//! Plain storage for the chip-control and clocking registers firmware pokes
//! during bring-up. Nothing here feeds back into the converter model; the
//! block exists so bring-up sequences decode instead of faulting.

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

const fn reg(
    name: &'static str,
    offset: u64,
    fields: &'static [FieldDef<NoHook>],
) -> RegisterDef<NoHook> {
    RegisterDef {
        name,
        offset,
        reset: 0,
        fields,
    }
}

static REGISTER_MAP: &[RegisterDef<NoHook>] = &[
    reg(
        "CHIPCTL",
        0x04,
        &[
            field("ADC_INTERLEAVE_EN", 0, 4),
            field("CLKOUTSEL", 4, 4),
            field("CLKOUTDIV", 8, 3),
            field("CLKOUTEN", 11, 1),
            field("TRACECLK_SEL", 12, 1),
            field("PDB_BB_SEL", 13, 1),
            field("ADC_SUPPLY", 16, 3),
            field("ADC_SUPPLYEN", 19, 1),
            field("SRAMU_RETEN", 20, 1),
            field("SRAML_RETEN", 21, 1),
        ],
    ),
    reg(
        "FTMOPT0",
        0x0C,
        &[
            field("FTM0FLTxSEL", 0, 3),
            field("FTM1FLTxSEL", 4, 3),
            field("FTM2FLTxSEL", 8, 3),
            field("FTM3FLTxSEL", 12, 3),
            field("FTM4CLKSEL", 16, 2),
            field("FTM5CLKSEL", 18, 2),
            field("FTM6CLKSEL", 20, 2),
            field("FTM7CLKSEL", 22, 2),
            field("FTM0CLKSEL", 24, 2),
            field("FTM1CLKSEL", 26, 2),
            field("FTM2CLKSEL", 28, 2),
            field("FTM3CLKSEL", 30, 2),
        ],
    ),
    reg(
        "LPOCLKS",
        0x10,
        &[
            field("LPO1KCLKEN", 0, 1),
            field("LPO32KCLKEN", 1, 1),
            field("LPOCLKSEL", 2, 2),
            field("RTCCLKSEL", 4, 2),
        ],
    ),
    reg(
        "ADCOPT",
        0x18,
        &[
            field("ADC0TRGSEL", 0, 1),
            field("ADC0SWPRETRG", 1, 3),
            field("ADC0PRETRGSEL", 4, 2),
            field("ADC1TRGSEL", 8, 1),
            field("ADC1SWPRETRG", 9, 3),
            field("ADC1PRETRGSEL", 12, 2),
        ],
    ),
    reg(
        "FTMOPT1",
        0x1C,
        &[
            field("FTM0SYNCBIT", 0, 1),
            field("FTM1SYNCBIT", 1, 1),
            field("FTM2SYNCBIT", 2, 1),
            field("FTM3SYNCBIT", 3, 1),
            field("FTM1CH0SEL", 4, 2),
            field("FTM2CH0SEL", 6, 2),
            field("FTM2CH1SEL", 8, 1),
            field("FTM4SYNCBIT", 11, 1),
            field("FTM5SYNCBIT", 12, 1),
            field("FTM6SYNCBIT", 13, 1),
            field("FTM7SYNCBIT", 14, 1),
            field("FTMGLDOK", 15, 1),
            field("FTM0_OUTSEL", 16, 8),
            field("FTM3_OUTSEL", 24, 8),
        ],
    ),
    reg(
        "MISCTRL0",
        0x20,
        &[
            field("STOP1_MONITOR", 9, 1),
            field("STOP2_MONITOR", 10, 1),
            field("FTM_GTB_SPLIT_EN", 14, 1),
            field("FTM0_OBE_CTRL", 16, 1),
            field("FTM1_OBE_CTRL", 17, 1),
            field("FTM2_OBE_CTRL", 18, 1),
            field("FTM3_OBE_CTRL", 19, 1),
            field("FTM4_OBE_CTRL", 20, 1),
            field("FTM5_OBE_CTRL", 21, 1),
            field("FTM6_OBE_CTRL", 22, 1),
            field("FTM7_OBE_CTRL", 23, 1),
            field("RMII_CLK_OBE", 24, 1),
            field("RMII_CLK_SEL", 25, 1),
            field("QSPI_CLK_SEL", 26, 1),
        ],
    ),
    reg(
        "PLATCGC",
        0x40,
        &[
            field("CGCMSCM", 0, 1),
            field("CGCMPU", 1, 1),
            field("CGCDMA", 2, 1),
            field("CGCERM", 3, 1),
            field("CGCEIM", 4, 1),
        ],
    ),
    reg(
        "FCFG1",
        0x4C,
        &[field("DEPART", 12, 4), field("EEERAMSIZE", 16, 4)],
    ),
    reg(
        "CLKDIV4",
        0x68,
        &[
            field("TRACEFRAC", 0, 1),
            field("TRACEDIV", 1, 3),
            field("TRACEDIVEN", 28, 1),
        ],
    ),
    reg("MISCTRL1", 0x6C, &[field("SW_TRG", 0, 1)]),
];

#[derive(Debug)]
pub struct Sim {
    regs: RegisterBank<NoHook>,
}

impl Sim {
    pub fn new() -> Self {
        Self {
            regs: RegisterBank::new(REGISTER_MAP),
        }
    }
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral for Sim {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chipctl_keeps_defined_bits_only() {
        let mut sim = Sim::new();
        sim.write(0x04, 0xFFFF_FFFF).unwrap();
        assert_eq!(sim.read(0x04).unwrap(), 0x003F_3FFF);
    }

    #[test]
    fn adcopt_round_trips() {
        let mut sim = Sim::new();
        sim.write(0x18, 0x0000_1211).unwrap();
        assert_eq!(sim.read(0x18).unwrap(), 0x0000_1211);
    }

    #[test]
    fn unmodeled_offsets_read_zero() {
        let sim = Sim::new();
        // SDID and the UID words are listed in the manual but not modeled.
        assert_eq!(sim.read(0x24).unwrap(), 0);
        assert_eq!(sim.read(0x54).unwrap(), 0);
    }

    #[test]
    fn reset_clears_stored_values() {
        let mut sim = Sim::new();
        sim.write(0x40, 0x1F).unwrap();
        Peripheral::reset(&mut sim);
        assert_eq!(sim.read(0x40).unwrap(), 0);
    }
}
