//! Host protocol contract.
//!
//! Everything in this module mirrors values the game client puts on the
//! wire or hardcodes: frame opcodes, field byte offsets, the tracked item
//! ids, and the fixed zone-transition tables. A host protocol change is a
//! one-file edit here.

use phf::{phf_map, phf_set};

/// Frame-type identifiers, as tagged by the host dispatch loop.
pub mod opcode {
    /// Key item ownership snapshot (one 512-id block per frame)
    pub const KEY_ITEM_LIST: u16 = 0x01E6;
    /// Zone change notification
    pub const ZONE_CHANGE: u16 = 0x00F4;
    /// Time credit reading (hourglass usage message)
    pub const TIME_CREDIT: u16 = 0x02C9;
    /// Storage count response for the charge-counted consumable
    pub const STORAGE_COUNT: u16 = 0x013B;
    /// Logout countdown; the identity cache is invalid once it reaches zero
    pub const LOGOUT_IMMINENT: u16 = 0x004C;
}

/// Fixed byte offsets inside frame payloads.
pub mod offset {
    /// Key item list: which 512-id block the bitfield covers
    pub const BLOCK_INDEX: usize = 0;
    /// Key item list: start of the 64-byte ownership bitfield
    pub const OWNERSHIP_BITS: usize = 1;

    /// Zone change: zone id, u16 little-endian
    pub const ZONE_ID: usize = 2;

    /// Time credit: acting entity id, u32 little-endian
    pub const ACTOR_ID: usize = 0;
    /// Time credit: chat message id, u16 little-endian
    pub const MESSAGE_ID: usize = 4;
    /// Time credit: stored seconds, 3-byte little-endian
    pub const TIME_VALUE: usize = 6;

    /// Storage count: remaining charges, u8
    pub const STORAGE_COUNT: usize = 0;

    /// Logout imminent: seconds-ish countdown ticks, u8
    pub const LOGOUT_COUNTDOWN: usize = 0;
}

/// Ids covered by one ownership snapshot block.
pub const OWNERSHIP_BLOCK_IDS: u16 = 512;
/// Length in bytes of the ownership bitfield (512 bits).
pub const OWNERSHIP_BITFIELD_LEN: usize = 64;

/// Tracked key item ids.
pub mod item_id {
    pub const SHIMMERING_PEARL: u16 = 3212;
    pub const SEAL_OF_THE_DEEP: u16 = 3213;
    pub const ASHEN_IDOL: u16 = 3455;
    pub const WAYFARERS_PRISM: u16 = 3467;
    pub const DUSKWROUGHT_PHYLACTERY: u16 = 3470;
    pub const ECHO_CRYSTAL: u16 = 3489;
    pub const CHRONAL_CELL: u16 = 2901;
}

/// Shared re-entry cooldown for the gated zone group: 60 hours.
pub const GATED_ZONE_COOLDOWN_SECS: u64 = 216_000;

/// Lobby zone -> gated zone pairs. Moving from the key to the value zone
/// is a gated-zone entry.
pub static GATED_ENTRIES: phf::Map<u16, u16> = phf_map! {
    230u16 => 294u16,
    236u16 => 294u16,
    245u16 => 297u16,
};

/// Staging zone for transit-item usage detection.
pub const TRANSIT_STAGING_ZONE: u16 = 202;

/// Destination zones reachable only by consuming the transit item from
/// the staging zone.
pub static TRANSIT_DESTINATIONS: phf::Set<u16> = phf_set! {
    214u16,
    215u16,
    219u16,
};

/// Item consumed by a staging -> destination transition.
pub const TRANSIT_ITEM_ID: u16 = item_id::WAYFARERS_PRISM;

/// Maximum charges of the storage-counted consumable.
pub const STORAGE_MAX: u8 = 3;

/// One regeneration cycle of the storage-counted consumable: 6 hours.
pub const STORAGE_REGEN_SECS: u64 = 21_600;
