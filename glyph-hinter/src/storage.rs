//! Storage area.

use std::collections::BTreeMap;

use super::error::HintErrorKind;

/// Sparse storage area shared by all programs of a session.
///
/// Slots that were never written read as zero.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Storage {
    slots: BTreeMap<u32, i32>,
}

impl Storage {
    pub fn get(&self, index: i32) -> Result<i32, HintErrorKind> {
        let key = u32::try_from(index).map_err(|_| HintErrorKind::InvalidStorageIndex(index))?;
        Ok(self.slots.get(&key).copied().unwrap_or_default())
    }

    pub fn set(&mut self, index: i32, value: i32) -> Result<(), HintErrorKind> {
        let key = u32::try_from(index).map_err(|_| HintErrorKind::InvalidStorageIndex(index))?;
        self.slots.insert(key, value);
        Ok(())
    }

    /// Returns the written slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.slots.iter().map(|(index, value)| (*index, *value))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_slots() {
        let mut storage = Storage::default();
        assert_eq!(storage.get(1000), Ok(0));
        storage.set(1000, 7).unwrap();
        storage.set(3, -2).unwrap();
        assert_eq!(storage.get(1000), Ok(7));
        assert_eq!(storage.iter().collect::<Vec<_>>(), [(3, -2), (1000, 7)]);
    }

    #[test]
    fn negative_index() {
        let mut storage = Storage::default();
        assert_eq!(storage.get(-1), Err(HintErrorKind::InvalidStorageIndex(-1)));
        assert_eq!(
            storage.set(-5, 1),
            Err(HintErrorKind::InvalidStorageIndex(-5))
        );
    }
}
