pub mod formatting;
pub mod status;

pub use status::{
    Availability, GatedStatus, ItemStatus, StatusSnapshot, StorageStatus, TimeBankStatus,
};
