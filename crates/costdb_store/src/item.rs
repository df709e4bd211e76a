//! The cost item record and its patch type.

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use costdb_engine::RecordKey;
use serde::{Deserialize, Serialize};

/// A single cost entry.
///
/// The identifier is assigned by the engine on insert and is not part
/// of the encoded payload. Dates are `YYYY-MM-DD` strings, matching the
/// form the surrounding application collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    /// Engine-assigned identifier; `None` until inserted.
    #[serde(skip)]
    pub id: Option<RecordKey>,
    /// Monetary amount.
    pub amount: f64,
    /// Category label, e.g. "Food".
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// Date of the expense, `YYYY-MM-DD`.
    pub date: String,
}

impl CostItem {
    /// Creates a cost item awaiting insertion (no identifier yet).
    pub fn new(
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            amount,
            category: category.into(),
            description: description.into(),
            date: date.into(),
        }
    }

    /// Returns the year of the expense date, if the date parses.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        let (year, _, _) = parse_date(&self.date)?;
        Some(year)
    }

    /// Returns the month (1-12) of the expense date, if the date parses.
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        let (_, month, _) = parse_date(&self.date)?;
        Some(month)
    }
}

/// Parses a `YYYY-MM-DD` string into (year, month, day).
fn parse_date(date: &str) -> Option<(i32, u32, u32)> {
    let mut parts = date.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some((year, month, day))
}

/// A partial cost item for `update`.
///
/// Fields left as `None` keep the stored value; fields set override it.
/// Built with chainable setters:
///
/// ```rust
/// use costdb_store::CostItemPatch;
///
/// let patch = CostItemPatch::new().amount(50.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostItemPatch {
    /// Replacement amount, if any.
    pub amount: Option<f64>,
    /// Replacement category, if any.
    pub category: Option<String>,
    /// Replacement description, if any.
    pub description: Option<String>,
    /// Replacement date, if any.
    pub date: Option<String>,
}

impl CostItemPatch {
    /// Creates an empty patch (updates nothing).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement amount.
    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the replacement category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the replacement description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the replacement date.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

impl Record for CostItem {
    type Patch = CostItemPatch;

    fn key(&self) -> Option<RecordKey> {
        self.id
    }

    fn merge(&self, patch: CostItemPatch) -> Self {
        Self {
            id: self.id,
            amount: patch.amount.unwrap_or(self.amount),
            category: patch.category.unwrap_or_else(|| self.category.clone()),
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            date: patch.date.unwrap_or_else(|| self.date.clone()),
        }
    }

    fn encode(&self) -> StoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| StoreError::operation(e.to_string()))?;
        Ok(buf)
    }

    fn decode(key: RecordKey, bytes: &[u8]) -> StoreResult<Self> {
        let mut item: Self = ciborium::de::from_reader(bytes)
            .map_err(|e| StoreError::operation(e.to_string()))?;
        item.id = Some(key);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lunch() -> CostItem {
        CostItem::new(42.5, "Food", "lunch", "2024-03-15")
    }

    #[test]
    fn new_item_has_no_key() {
        assert_eq!(lunch().key(), None);
    }

    #[test]
    fn date_parts() {
        let item = lunch();
        assert_eq!(item.year(), Some(2024));
        assert_eq!(item.month(), Some(3));
    }

    #[test]
    fn bad_dates_parse_to_none() {
        for date in ["", "2024", "2024-13-01", "2024-00-10", "soon", "2024-03-99"] {
            let item = CostItem::new(1.0, "c", "d", date);
            assert_eq!(item.year(), None, "date {date:?}");
            assert_eq!(item.month(), None, "date {date:?}");
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let item = lunch();
        let merged = item.merge(CostItemPatch::new());
        assert_eq!(merged, item);
    }

    #[test]
    fn patch_overrides_only_present_fields() {
        let mut item = lunch();
        item.id = Some(RecordKey::new(1));

        let merged = item.merge(CostItemPatch::new().amount(50.0));

        assert_eq!(merged.id, Some(RecordKey::new(1)));
        assert_eq!(merged.amount, 50.0);
        assert_eq!(merged.category, "Food");
        assert_eq!(merged.description, "lunch");
        assert_eq!(merged.date, "2024-03-15");
    }

    #[test]
    fn full_patch_replaces_everything_but_key() {
        let mut item = lunch();
        item.id = Some(RecordKey::new(7));

        let merged = item.merge(
            CostItemPatch::new()
                .amount(9.99)
                .category("Travel")
                .description("bus fare")
                .date("2024-04-01"),
        );

        assert_eq!(
            merged,
            CostItem {
                id: Some(RecordKey::new(7)),
                amount: 9.99,
                category: "Travel".to_string(),
                description: "bus fare".to_string(),
                date: "2024-04-01".to_string(),
            }
        );
    }

    #[test]
    fn encode_decode_roundtrip() {
        let item = lunch();
        let bytes = item.encode().unwrap();
        let decoded = CostItem::decode(RecordKey::new(3), &bytes).unwrap();

        assert_eq!(decoded.id, Some(RecordKey::new(3)));
        assert_eq!(decoded.amount, item.amount);
        assert_eq!(decoded.category, item.category);
        assert_eq!(decoded.description, item.description);
        assert_eq!(decoded.date, item.date);
    }

    #[test]
    fn key_is_not_part_of_the_payload() {
        let mut with_key = lunch();
        with_key.id = Some(RecordKey::new(42));

        assert_eq!(with_key.encode().unwrap(), lunch().encode().unwrap());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(CostItem::decode(RecordKey::new(1), b"not cbor").is_err());
    }
}
