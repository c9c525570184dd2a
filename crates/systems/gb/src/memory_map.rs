//! Game Boy memory map and I/O port table.
//!
//! ```text
//! $0000-$7FFF  Cartridge ROM (bank 0 + switchable bank, via mapper)
//! $8000-$9FFF  Video RAM (8KB)
//! $A000-$BFFF  External RAM (via mapper, often battery-backed)
//! $C000-$CFFF  Work RAM Bank 0 (4KB)
//! $D000-$DFFF  Work RAM Bank 1 (4KB)
//! $E000-$FDFF  Echo RAM (mirror of $C000-$DDFF)
//! $FE00-$FE9F  OAM - Object Attribute Memory (160 bytes)
//! $FEA0-$FEFF  Not usable (reads 0, writes ignored)
//! $FF00-$FF7F  I/O Registers
//! $FF80-$FFFE  High RAM (127 bytes)
//! $FFFF        Interrupt Enable Register
//! ```
//!
//! Decoding is table driven: [`MEMORY_MAP`] is an ordered list of half-open
//! ranges covering the whole 16-bit space, and [`IO_PORTS`] maps each offset of
//! the I/O block to the unit that owns it.

/// Joypad (P1)
pub const JOYP: u16 = 0xFF00;
/// Serial transfer data
pub const SB: u16 = 0xFF01;
/// Serial transfer control
pub const SC: u16 = 0xFF02;
/// Divider register
pub const DIV: u16 = 0xFF04;
/// Timer counter
pub const TIMA: u16 = 0xFF05;
/// Timer modulo
pub const TMA: u16 = 0xFF06;
/// Timer control
pub const TAC: u16 = 0xFF07;
/// Interrupt flag
pub const IF: u16 = 0xFF0F;
/// OAM DMA source and trigger
pub const DMA: u16 = 0xFF46;
/// CGB speed switch
pub const KEY1: u16 = 0xFF4D;
/// Interrupt enable
pub const IE: u16 = 0xFFFF;

/// Destination of a bus address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    CartridgeRom,
    VideoRam,
    ExternalRam,
    WorkRam0,
    WorkRam1,
    EchoRam,
    Oam,
    Unusable,
    Io,
    HighRam,
    InterruptEnable,
}

/// Half-open range `[start, end)` of the address space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub start: u32,
    pub end: u32,
    pub region: Region,
}

const fn entry(start: u32, end: u32, region: Region) -> MapEntry {
    MapEntry { start, end, region }
}

/// Ordered, contiguous decode table for `[0x0000, 0x10000)`
pub const MEMORY_MAP: [MapEntry; 11] = [
    entry(0x0000, 0x8000, Region::CartridgeRom),
    entry(0x8000, 0xA000, Region::VideoRam),
    entry(0xA000, 0xC000, Region::ExternalRam),
    entry(0xC000, 0xD000, Region::WorkRam0),
    entry(0xD000, 0xE000, Region::WorkRam1),
    entry(0xE000, 0xFE00, Region::EchoRam),
    entry(0xFE00, 0xFEA0, Region::Oam),
    entry(0xFEA0, 0xFF00, Region::Unusable),
    entry(0xFF00, 0xFF80, Region::Io),
    entry(0xFF80, 0xFFFF, Region::HighRam),
    entry(0xFFFF, 0x10000, Region::InterruptEnable),
];

/// Resolve an address to its region and the offset from the region's start.
pub fn decode(addr: u16) -> (Region, u16) {
    let addr = addr as u32;
    let index = MEMORY_MAP.partition_point(|e| e.start <= addr) - 1;
    let entry = &MEMORY_MAP[index];
    (entry.region, (addr - entry.start) as u16)
}

/// Owner of a port in the `$FF00-$FF7F` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPort {
    Joypad,
    Serial,
    Timer,
    InterruptFlag,
    Audio,
    Video,
    OamDma,
    SpeedMode,
    Unmapped,
}

const IO_BASE: u16 = 0xFF00;

const fn build_io_ports() -> [IoPort; 0x80] {
    let mut ports = [IoPort::Unmapped; 0x80];
    ports[(JOYP - IO_BASE) as usize] = IoPort::Joypad;
    ports[(SB - IO_BASE) as usize] = IoPort::Serial;
    ports[(SC - IO_BASE) as usize] = IoPort::Serial;
    ports[(DIV - IO_BASE) as usize] = IoPort::Timer;
    ports[(TIMA - IO_BASE) as usize] = IoPort::Timer;
    ports[(TMA - IO_BASE) as usize] = IoPort::Timer;
    ports[(TAC - IO_BASE) as usize] = IoPort::Timer;
    ports[(IF - IO_BASE) as usize] = IoPort::InterruptFlag;

    // Sound registers and wave RAM
    let mut i = 0x10;
    while i <= 0x3F {
        ports[i] = IoPort::Audio;
        i += 1;
    }

    // LCD registers
    let mut i = 0x40;
    while i <= 0x4B {
        ports[i] = IoPort::Video;
        i += 1;
    }

    ports[(DMA - IO_BASE) as usize] = IoPort::OamDma;
    ports[(KEY1 - IO_BASE) as usize] = IoPort::SpeedMode;
    ports
}

/// Port owner for each offset of the I/O block
pub const IO_PORTS: [IoPort; 0x80] = build_io_ports();

/// Owner of an I/O block address (`$FF00-$FF7F`)
pub fn io_port(addr: u16) -> IoPort {
    IO_PORTS[(addr.wrapping_sub(IO_BASE) & 0x7F) as usize]
}
