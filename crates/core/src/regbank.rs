// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Declarative register file.
//!
//! A peripheral describes its map as a static table of [`RegisterDef`]s and
//! lets one dispatch routine interpret it for every access. Bits not covered
//! by any field are reserved: written values are accepted and dropped, reads
//! return zero. Fields carrying a behavior tag route through the owning
//! peripheral's [`FieldClient`]; untagged fields live in the bank's committed
//! storage.

use crate::SimResult;

/// Access policy for one bit-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    ReadWrite,
    ReadOnly,
    WriteOnly,
    WriteOneToClear,
    /// Documented but unmodeled. Writes are dropped (logged at trace level),
    /// reads return zero.
    Tag,
}

/// One named bit-field inside a register.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef<T: 'static> {
    pub name: &'static str,
    pub lsb: u8,
    pub width: u8,
    pub access: FieldAccess,
    /// `Some` routes this field through the bank's [`FieldClient`] instead of
    /// committed storage.
    pub hook: Option<T>,
}

/// One register of a peripheral's map. Fields must be listed in ascending
/// bit order and must not overlap; callbacks fire in listing order.
#[derive(Debug, Clone, Copy)]
pub struct RegisterDef<T: 'static> {
    pub name: &'static str,
    pub offset: u64,
    pub reset: u32,
    pub fields: &'static [FieldDef<T>],
}

/// Receiver for tagged-field traffic.
///
/// `read_field` returns the field's current committed value and may have side
/// effects. `write_field` observes `(old, new)` before the field is
/// considered updated; an error aborts the whole register write.
pub trait FieldClient<T> {
    fn read_field(&self, tag: T) -> u32;
    fn write_field(&mut self, tag: T, old: u32, new: u32) -> SimResult<()>;
}

/// Tag type for banks whose fields are all plain storage.
#[derive(Debug, Clone, Copy)]
pub enum NoHook {}

/// Client for [`NoHook`] banks. Uninhabited tags make both methods
/// unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unhooked;

impl FieldClient<NoHook> for Unhooked {
    fn read_field(&self, tag: NoHook) -> u32 {
        match tag {}
    }

    fn write_field(&mut self, tag: NoHook, _old: u32, _new: u32) -> SimResult<()> {
        match tag {}
    }
}

const fn mask(width: u8) -> u32 {
    ((1u64 << width) - 1) as u32
}

#[derive(Debug)]
pub struct RegisterBank<T: 'static> {
    defs: &'static [RegisterDef<T>],
    committed: Vec<u32>,
}

impl<T: Copy + std::fmt::Debug> RegisterBank<T> {
    pub fn new(defs: &'static [RegisterDef<T>]) -> Self {
        #[cfg(debug_assertions)]
        validate_layout(defs);
        let committed = defs.iter().map(|r| r.reset).collect();
        Self { defs, committed }
    }

    /// Restore every register's reset value. Tagged and hooked state belongs
    /// to the client and is reset there.
    pub fn reset(&mut self) {
        for (slot, def) in self.committed.iter_mut().zip(self.defs) {
            *slot = def.reset;
        }
    }

    fn index_of(&self, offset: u64) -> Option<usize> {
        self.defs.iter().position(|r| r.offset == offset)
    }

    /// Assemble a register value field by field, in ascending bit order.
    /// Unmapped offsets read as zero.
    pub fn read(&self, offset: u64, client: &impl FieldClient<T>) -> u32 {
        let Some(idx) = self.index_of(offset) else {
            tracing::warn!("Read from unmapped register offset {:#x}", offset);
            return 0;
        };
        let def = &self.defs[idx];
        let committed = self.committed[idx];

        let mut value = 0u32;
        for f in def.fields {
            let bits = match f.access {
                FieldAccess::WriteOnly | FieldAccess::Tag => 0,
                _ => match f.hook {
                    Some(tag) => client.read_field(tag) & mask(f.width),
                    None => (committed >> f.lsb) & mask(f.width),
                },
            };
            value |= bits << f.lsb;
        }
        value
    }

    /// Scatter a written word across fields, in ascending bit order.
    /// Unmapped offsets and reserved bits are dropped without error.
    pub fn write(
        &mut self,
        offset: u64,
        value: u32,
        client: &mut impl FieldClient<T>,
    ) -> SimResult<()> {
        let Some(idx) = self.index_of(offset) else {
            tracing::warn!(
                "Dropping write of {:#010x} to unmapped register offset {:#x}",
                value,
                offset
            );
            return Ok(());
        };
        let def = &self.defs[idx];
        let mut committed = self.committed[idx];

        for f in def.fields {
            let m = mask(f.width);
            let incoming = (value >> f.lsb) & m;
            match f.access {
                // Read-only bits inside writable registers are routinely
                // written back by firmware; dropping them is not noteworthy.
                FieldAccess::ReadOnly => {}
                FieldAccess::Tag => {
                    tracing::trace!(
                        "Ignoring write of {:#x} to tagged field {}.{}",
                        incoming,
                        def.name,
                        f.name
                    );
                }
                FieldAccess::WriteOneToClear => {
                    committed &= !(incoming << f.lsb);
                }
                FieldAccess::ReadWrite | FieldAccess::WriteOnly => match f.hook {
                    Some(tag) => {
                        let old = client.read_field(tag) & m;
                        client.write_field(tag, old, incoming)?;
                    }
                    None => {
                        committed = (committed & !(m << f.lsb)) | (incoming << f.lsb);
                    }
                },
            }
        }
        self.committed[idx] = committed;
        Ok(())
    }

    /// Committed storage by register name, for peripheral snapshots. Hooked
    /// fields are not represented here; clients snapshot their own state.
    pub fn snapshot(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (def, committed) in self.defs.iter().zip(&self.committed) {
            map.insert(def.name.to_string(), serde_json::json!(committed));
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(debug_assertions)]
fn validate_layout<T: std::fmt::Debug>(defs: &[RegisterDef<T>]) {
    for reg in defs {
        debug_assert!(
            reg.offset % 4 == 0,
            "register {} offset {:#x} is not word aligned",
            reg.name,
            reg.offset
        );
        let mut next_free_bit = 0u32;
        for f in reg.fields {
            debug_assert!(
                f.width >= 1 && u32::from(f.lsb) + u32::from(f.width) <= 32,
                "register {} field {} does not fit in 32 bits",
                reg.name,
                f.name
            );
            debug_assert!(
                u32::from(f.lsb) >= next_free_bit,
                "register {} field {} overlaps or breaks ascending order",
                reg.name,
                f.name
            );
            next_free_bit = u32::from(f.lsb) + u32::from(f.width);
        }
    }
}
