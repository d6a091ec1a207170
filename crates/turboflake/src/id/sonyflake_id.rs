use core::fmt;

/// Number of bits in the intra-tick sequence field.
pub const SONYFLAKE_SEQUENCE_BITS: u32 = 8;
/// Largest intra-tick sequence value.
pub const SONYFLAKE_SEQUENCE_MAX: u64 = (1 << SONYFLAKE_SEQUENCE_BITS) - 1;
/// Number of bits in the machine ID field.
pub const SONYFLAKE_MACHINE_ID_BITS: u32 = 16;
/// Largest machine ID value.
pub const SONYFLAKE_MACHINE_ID_MAX: u64 = (1 << SONYFLAKE_MACHINE_ID_BITS) - 1;
/// Bit offset of the machine ID field.
pub const SONYFLAKE_MACHINE_ID_OFFSET: u32 = SONYFLAKE_SEQUENCE_BITS;
/// Bit offset of the timestamp field.
pub const SONYFLAKE_TIME_OFFSET: u32 = SONYFLAKE_MACHINE_ID_BITS + SONYFLAKE_SEQUENCE_BITS;
/// Number of bits in the timestamp field (10 ms ticks, ~348 years).
pub const SONYFLAKE_TIME_BITS: u32 = 64 - SONYFLAKE_TIME_OFFSET;
/// Largest timestamp value.
pub const SONYFLAKE_TIME_MAX: u64 = (1 << SONYFLAKE_TIME_BITS) - 1;

/// A 64-bit Sonyflake-style ID.
///
/// - 40 bits timestamp (10 ms ticks since the generator's epoch)
/// - 16 bits machine ID
/// - 8 bits sequence
///
/// ```text
///  Bit Index:  63             24 23           8 7        0
///              +----------------+--------------+----------+
///  Field:      | timestamp (40) | machine (16) | seq (8)  |
///              +----------------+--------------+----------+
/// ```
///
/// IDs order first by timestamp, then by machine ID, then by sequence, which
/// is exactly the order a generator mints them in.
///
/// # Example
///
/// ```
/// use turboflake::SonyflakeId;
///
/// let id = SonyflakeId::from_components(1000, 0x7F7F, 3);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.machine_id(), 0x7F7F);
/// assert_eq!(id.sequence(), 3);
/// assert_eq!(u64::from(id), (1000 << 24) | (0x7F7F << 8) | 3);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct SonyflakeId {
    id: u64,
}

impl SonyflakeId {
    /// Composes an ID from its fields.
    ///
    /// The timestamp is truncated to its 40-bit field.
    #[inline]
    pub const fn from_components(timestamp: u64, machine_id: u16, sequence: u8) -> Self {
        debug_assert!(timestamp <= SONYFLAKE_TIME_MAX, "timestamp overflow");
        let id = ((timestamp & SONYFLAKE_TIME_MAX) << SONYFLAKE_TIME_OFFSET)
            | ((machine_id as u64) << SONYFLAKE_MACHINE_ID_OFFSET)
            | sequence as u64;
        Self { id }
    }

    /// Extracts the timestamp (ticks since epoch) from the ID.
    #[inline]
    pub const fn timestamp(&self) -> u64 {
        self.id >> SONYFLAKE_TIME_OFFSET
    }

    /// Extracts the machine ID from the ID.
    #[inline]
    pub const fn machine_id(&self) -> u16 {
        ((self.id >> SONYFLAKE_MACHINE_ID_OFFSET) & SONYFLAKE_MACHINE_ID_MAX) as u16
    }

    /// Extracts the intra-tick sequence from the ID.
    #[inline]
    pub const fn sequence(&self) -> u8 {
        (self.id & SONYFLAKE_SEQUENCE_MAX) as u8
    }

    /// Converts this type into its raw representation.
    #[inline]
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Converts a raw value into this type. Every `u64` is a valid ID.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }
}

impl From<SonyflakeId> for u64 {
    fn from(id: SonyflakeId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for SonyflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for SonyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SonyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = f.alternate();
        let mut dbg = f.debug_struct("SonyflakeId");
        dbg.field("id", &self.id);
        if full {
            dbg.field("timestamp", &self.timestamp())
                .field("machine_id", &self.machine_id())
                .field("sequence", &self.sequence());
        }
        dbg.finish()
    }
}
