//! Element identifiers.
//!
//! Boxes, lines and labels share one id namespace so that the selection
//! controller can refer to "the selected element" without knowing its kind.
//! Ids are opaque to callers but persist as unsigned integers.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Identifier of a diagram element, unique across all element kinds.
///
/// # Examples
///
/// ```
/// use trellis_core::identifier::{ElementId, IdAllocator};
///
/// let mut ids = IdAllocator::default();
/// let first = ids.allocate().unwrap();
/// let second = ids.allocate().unwrap();
/// assert_ne!(first, second);
/// assert_eq!(ElementId::new(7).to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Wraps a raw id value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for ElementId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Monotonic source of fresh [`ElementId`]s.
///
/// Never hands out the same id twice, even after the element carrying it has
/// been deleted.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Returns a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IdsExhausted`] once the id space is used up.
    pub fn allocate(&mut self) -> Result<ElementId, ModelError> {
        let id = ElementId(self.next);
        self.next = self.next.checked_add(1).ok_or(ModelError::IdsExhausted)?;
        Ok(id)
    }

    /// Makes sure future allocations never collide with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IdOutOfRange`] for `u64::MAX`, which leaves no
    /// id to allocate after it. The cursor is unchanged on error.
    pub fn reserve(&mut self, id: ElementId) -> Result<(), ModelError> {
        if id.0 >= self.next {
            self.next = id.0.checked_add(1).ok_or(ModelError::IdOutOfRange(id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_monotonic() {
        let mut ids = IdAllocator::default();
        let a = ids.allocate().unwrap();
        let b = ids.allocate().unwrap();
        assert!(b > a);
        assert_eq!(ids.allocate(), Ok(ElementId::new(3)));
    }

    #[test]
    fn test_reserve_skips_past_loaded_ids() {
        let mut ids = IdAllocator::default();
        ids.reserve(ElementId::new(41)).unwrap();
        assert_eq!(ids.allocate(), Ok(ElementId::new(42)));

        // Reserving an older id leaves the cursor alone.
        ids.reserve(ElementId::new(5)).unwrap();
        assert_eq!(ids.allocate(), Ok(ElementId::new(43)));
    }

    #[test]
    fn test_reserve_rejects_last_id() {
        let mut ids = IdAllocator::default();
        let last = ElementId::new(u64::MAX);
        assert_eq!(ids.reserve(last), Err(ModelError::IdOutOfRange(last)));
        assert_eq!(ids.allocate(), Ok(ElementId::new(1)));
    }

    #[test]
    fn test_allocate_stops_at_end_of_id_space() {
        let mut ids = IdAllocator::default();
        ids.reserve(ElementId::new(u64::MAX - 2)).unwrap();
        assert_eq!(ids.allocate(), Ok(ElementId::new(u64::MAX - 1)));
        assert_eq!(ids.allocate(), Err(ModelError::IdsExhausted));
        assert_eq!(ids.allocate(), Err(ModelError::IdsExhausted));
    }

    #[test]
    fn test_parse_and_display() {
        let id: ElementId = " 12 ".parse().unwrap();
        assert_eq!(id, ElementId::new(12));
        assert_eq!(id.to_string(), "12");
        assert!("abc".parse::<ElementId>().is_err());
    }
}
