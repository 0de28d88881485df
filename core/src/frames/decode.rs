use crate::protocol::{
    OWNERSHIP_BITFIELD_LEN, OWNERSHIP_BLOCK_IDS, offset, opcode,
};

use super::bits::{read_bit, read_u16_le, read_u24_le, read_u32_le};

/// One decoded event from the observed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameFrame {
    /// Absolute ownership flags for one 512-id block of key items
    ItemOwnershipSnapshot(OwnershipSnapshot),
    /// The player moved to a new zone
    ZoneChanged { zone_id: u16 },
    /// A time-credit reading was observed (hourglass usage message)
    TimeCreditObserved {
        actor_id: u32,
        message_id: u16,
        /// Stored credit in seconds
        value: u32,
    },
    /// Storage count response for the charge-counted consumable
    StorageCountObserved { count: u8 },
    /// Logout countdown tick; identity becomes stale when it reaches zero
    LogoutImminent { countdown: u8 },
    /// Unknown opcode or short/malformed payload
    Unrecognized,
}

/// Ownership bitfield for one 512-id block.
///
/// Item ids map to bits as `id = block * 512 + bit`, LSB-first within each
/// byte. The snapshot is absolute: a clear bit means the item is not held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipSnapshot {
    block: u8,
    bits: [u8; OWNERSHIP_BITFIELD_LEN],
}

impl OwnershipSnapshot {
    /// First item id covered by this block.
    pub fn base_id(&self) -> u16 {
        self.block as u16 * OWNERSHIP_BLOCK_IDS
    }

    /// Held flag for `item_id`, or `None` when the id falls outside this
    /// block.
    pub fn held(&self, item_id: u16) -> Option<bool> {
        let base = self.base_id();
        if item_id < base || item_id >= base + OWNERSHIP_BLOCK_IDS {
            return None;
        }
        let bit = item_id - base;
        Some(read_bit(&self.bits, (bit / 8) as usize, (bit % 8) as u8))
    }
}

/// Decode a raw payload tagged with a host opcode.
///
/// Never fails: anything that cannot be decoded yields
/// [`GameFrame::Unrecognized`].
pub fn decode_frame(opcode: u16, payload: &[u8]) -> GameFrame {
    match opcode {
        opcode::KEY_ITEM_LIST => decode_key_item_list(payload),
        opcode::ZONE_CHANGE => decode_zone_change(payload),
        opcode::TIME_CREDIT => decode_time_credit(payload),
        opcode::STORAGE_COUNT => decode_storage_count(payload),
        opcode::LOGOUT_IMMINENT => decode_logout_imminent(payload),
        _ => GameFrame::Unrecognized,
    }
}

fn decode_key_item_list(payload: &[u8]) -> GameFrame {
    let Some(&block) = payload.get(offset::BLOCK_INDEX) else {
        return GameFrame::Unrecognized;
    };
    let Some(raw) =
        payload.get(offset::OWNERSHIP_BITS..offset::OWNERSHIP_BITS + OWNERSHIP_BITFIELD_LEN)
    else {
        return GameFrame::Unrecognized;
    };
    let mut bits = [0u8; OWNERSHIP_BITFIELD_LEN];
    bits.copy_from_slice(raw);
    GameFrame::ItemOwnershipSnapshot(OwnershipSnapshot { block, bits })
}

fn decode_zone_change(payload: &[u8]) -> GameFrame {
    match read_u16_le(payload, offset::ZONE_ID) {
        Some(zone_id) => GameFrame::ZoneChanged { zone_id },
        None => GameFrame::Unrecognized,
    }
}

fn decode_time_credit(payload: &[u8]) -> GameFrame {
    let (Some(actor_id), Some(message_id), Some(value)) = (
        read_u32_le(payload, offset::ACTOR_ID),
        read_u16_le(payload, offset::MESSAGE_ID),
        read_u24_le(payload, offset::TIME_VALUE),
    ) else {
        return GameFrame::Unrecognized;
    };
    GameFrame::TimeCreditObserved {
        actor_id,
        message_id,
        value,
    }
}

fn decode_storage_count(payload: &[u8]) -> GameFrame {
    match payload.get(offset::STORAGE_COUNT) {
        Some(&count) => GameFrame::StorageCountObserved { count },
        None => GameFrame::Unrecognized,
    }
}

fn decode_logout_imminent(payload: &[u8]) -> GameFrame {
    match payload.get(offset::LOGOUT_COUNTDOWN) {
        Some(&countdown) => GameFrame::LogoutImminent { countdown },
        None => GameFrame::Unrecognized,
    }
}
