//! OAM DMA unit (`$FF46`)
//!
//! Writing `XX` starts a copy of 160 bytes from `$XX00-$XX9F` into OAM. One
//! byte moves every 4 cycles, so a full transfer takes 640 cycles. The
//! address space performs the copy; this unit only tracks progress.

use crate::io::IoDevice;
use std::ops::Range;

/// Bytes copied by one transfer (size of OAM)
pub const TRANSFER_LEN: u16 = 0xA0;

const CYCLES_PER_BYTE: u32 = 4;

#[derive(Debug, Clone, Default)]
pub struct OamDma {
    /// High byte of the source address, as last written
    source: u8,
    /// Next OAM index to copy while a transfer is running
    next: Option<u16>,
    cycles: u32,
}

impl OamDma {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.next.is_some()
    }

    /// Bus address of byte `index` of the current transfer
    pub fn source_address(&self, index: u16) -> u16 {
        ((self.source as u16) << 8) | index
    }

    /// Advance by `cycles`, returning the OAM indices due to be copied.
    pub fn step(&mut self, cycles: u32) -> Range<u16> {
        let Some(start) = self.next else {
            return 0..0;
        };
        self.cycles += cycles;
        let due = (self.cycles / CYCLES_PER_BYTE) as u16;
        self.cycles %= CYCLES_PER_BYTE;

        let end = start.saturating_add(due).min(TRANSFER_LEN);
        self.next = if end == TRANSFER_LEN { None } else { Some(end) };
        start..end
    }
}

impl IoDevice for OamDma {
    fn read(&self, _addr: u16) -> u8 {
        self.source
    }

    fn write(&mut self, _addr: u16, val: u8) {
        self.source = val;
        self.next = Some(0);
        self.cycles = 0;
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
