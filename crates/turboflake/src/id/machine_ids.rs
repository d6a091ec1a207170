use core::{fmt, ops::Deref};

use crate::{ConfigError, SONYFLAKE_MACHINE_ID_MAX};

/// Largest number of machine IDs a single generator can hold.
pub const MAX_MACHINE_IDS: usize = SONYFLAKE_MACHINE_ID_MAX as usize + 1;

/// A validated, sorted set of distinct 16-bit machine IDs.
///
/// A generator cycles through its machine IDs once the 8-bit sequence of the
/// current one is exhausted, so `n` machine IDs give `n * 256` IDs per tick.
///
/// Machine ID sets given to independent generators must be disjoint for their
/// IDs to be distinct.
///
/// # Example
///
/// ```
/// use turboflake::{ConfigError, MachineIds};
///
/// let ids = MachineIds::new([0xFFFF, 0x0000, 0x7F7F]).unwrap();
/// assert_eq!(&ids[..], &[0x0000, 0x7F7F, 0xFFFF]);
///
/// assert_eq!(
///     MachineIds::new([1, 2, 1]),
///     Err(ConfigError::DuplicateMachineId { value: 1 })
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MachineIds {
    ids: Box<[u16]>,
}

impl MachineIds {
    /// Validates and sorts a set of machine IDs.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoMachineIds`] if `ids` is empty
    /// - [`ConfigError::TooManyMachineIds`] if it holds more than
    ///   [`MAX_MACHINE_IDS`] values
    /// - [`ConfigError::MachineIdOutOfRange`] for a value outside `[0, 65535]`
    /// - [`ConfigError::DuplicateMachineId`] if a value repeats
    pub fn new<I>(ids: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        let raw = collect_bounded(ids)?;
        if raw.is_empty() {
            return Err(ConfigError::NoMachineIds);
        }

        let mut ids = raw
            .into_iter()
            .map(|value| {
                u16::try_from(value).map_err(|_| ConfigError::MachineIdOutOfRange { value })
            })
            .collect::<Result<Vec<u16>, _>>()?;

        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ConfigError::DuplicateMachineId { value: pair[0] });
        }

        Ok(Self {
            ids: ids.into_boxed_slice(),
        })
    }

    /// Number of machine IDs in the set; never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`: an empty set is rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `machine_id` belongs to this set.
    pub fn contains(&self, machine_id: u16) -> bool {
        self.ids.binary_search(&machine_id).is_ok()
    }
}

/// Collects at most [`MAX_MACHINE_IDS`] raw machine IDs.
///
/// Longer inputs are rejected after reading one value past the limit; the
/// reported count is then a lower bound.
pub(crate) fn collect_bounded<I>(ids: I) -> Result<Vec<i64>, ConfigError>
where
    I: IntoIterator,
    I::Item: Into<i64>,
{
    let iter = ids.into_iter();
    let (hint, _) = iter.size_hint();
    let raw: Vec<i64> = iter.take(MAX_MACHINE_IDS + 1).map(Into::into).collect();

    if raw.len() > MAX_MACHINE_IDS {
        return Err(ConfigError::TooManyMachineIds {
            count: hint.max(raw.len()),
        });
    }
    Ok(raw)
}

impl Deref for MachineIds {
    type Target = [u16];

    fn deref(&self) -> &Self::Target {
        &self.ids
    }
}

impl fmt::Debug for MachineIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids.iter()).finish()
    }
}

impl TryFrom<Vec<u16>> for MachineIds {
    type Error = ConfigError;

    fn try_from(ids: Vec<u16>) -> Result<Self, Self::Error> {
        Self::new(ids)
    }
}

impl TryFrom<&[u16]> for MachineIds {
    type Error = ConfigError;

    fn try_from(ids: &[u16]) -> Result<Self, Self::Error> {
        Self::new(ids.iter().copied())
    }
}
