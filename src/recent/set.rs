use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::store::RecentRow;

/// Number of slots in a user's recently-visited row.
pub const RECENT_CAPACITY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Movie,
    Show,
}

impl ItemKind {
    fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Movie => "movie",
            ItemKind::Show => "show",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("movie") {
            Ok(ItemKind::Movie)
        } else if s.eq_ignore_ascii_case("show") {
            Ok(ItemKind::Show)
        } else {
            Err(format!("unknown item kind: {}", s))
        }
    }
}

/// Reference to a piece of content a user visited. Two refs are equal
/// iff both kind and id match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: i64,
}

impl ItemRef {
    pub fn movie(id: i64) -> Self {
        ItemRef {
            kind: ItemKind::Movie,
            id,
        }
    }

    pub fn show(id: i64) -> Self {
        ItemRef {
            kind: ItemKind::Show,
            id,
        }
    }

    /// Decode a stored slot value, `{ "id": ..., "type": "movie" | "show" }`.
    /// Anything that does not match that shape decodes as an empty slot:
    /// legacy and partially written rows must never fail a read.
    pub fn from_slot(value: &Value) -> Option<ItemRef> {
        let obj = value.as_object()?;
        let kind = obj.get("type")?.as_str()?.parse::<ItemKind>().ok()?;
        let id = obj.get("id")?;
        let id = match id.as_i64() {
            Some(n) => n,
            None => id.as_str()?.trim().parse().ok()?,
        };
        Some(ItemRef { kind, id })
    }

    pub fn to_slot(&self) -> Value {
        json!({ "id": self.id, "type": self.kind.as_str() })
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Ordered set of the items a user visited most recently, capacity
/// [`RECENT_CAPACITY`]. Slot 0 is the most recent; an item never occupies
/// more than one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentSet {
    slots: [Option<ItemRef>; RECENT_CAPACITY],
}

impl RecentSet {
    /// Decode a stored row, slot by slot. Malformed slot contents are
    /// normalized to empty rather than surfaced as errors.
    pub fn from_row(row: &RecentRow) -> Self {
        let decode = |slot: &Option<Value>| slot.as_ref().and_then(ItemRef::from_slot);
        RecentSet {
            slots: [
                decode(&row.visited_1),
                decode(&row.visited_2),
                decode(&row.visited_3),
            ],
        }
    }

    pub fn to_row(&self, user_id: &str) -> RecentRow {
        let encode = |slot: &Option<ItemRef>| slot.as_ref().map(ItemRef::to_slot);
        RecentRow {
            user_id: user_id.to_string(),
            visited_1: encode(&self.slots[0]),
            visited_2: encode(&self.slots[1]),
            visited_3: encode(&self.slots[2]),
        }
    }

    /// The most recently visited item, if any.
    pub fn head(&self) -> Option<&ItemRef> {
        self.slots[0].as_ref()
    }

    /// The new set after a visit to `item`: the item moves to slot 0,
    /// remaining distinct items keep their relative order, and whatever
    /// falls past the last slot is dropped.
    pub fn visit(&self, item: &ItemRef) -> RecentSet {
        let mut slots: [Option<ItemRef>; RECENT_CAPACITY] = Default::default();
        slots[0] = Some(item.clone());
        let mut n = 1;
        for existing in self.slots.iter().flatten() {
            if n == RECENT_CAPACITY {
                break;
            }
            if existing != item {
                slots[n] = Some(existing.clone());
                n += 1;
            }
        }
        RecentSet { slots }
    }

    /// Occupied slots in order, empties dropped.
    pub fn items(&self) -> Vec<ItemRef> {
        self.slots.iter().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(slots: [Option<ItemRef>; RECENT_CAPACITY]) -> RecentSet {
        RecentSet { slots }
    }

    fn full_set(a: ItemRef, b: ItemRef, c: ItemRef) -> RecentSet {
        set_of([Some(a), Some(b), Some(c)])
    }

    #[test]
    fn test_visit_head_is_idempotent() {
        let set = full_set(ItemRef::movie(1), ItemRef::movie(2), ItemRef::show(3));
        assert_eq!(set.visit(&ItemRef::movie(1)), set);
    }

    #[test]
    fn test_visit_promotes_middle_slot() {
        let set = full_set(ItemRef::movie(1), ItemRef::movie(2), ItemRef::show(3));
        let next = set.visit(&ItemRef::movie(2));
        assert_eq!(
            next.items(),
            vec![ItemRef::movie(2), ItemRef::movie(1), ItemRef::show(3)]
        );
    }

    #[test]
    fn test_visit_promotes_tail_slot() {
        let set = full_set(ItemRef::movie(1), ItemRef::movie(2), ItemRef::show(3));
        let next = set.visit(&ItemRef::show(3));
        assert_eq!(
            next.items(),
            vec![ItemRef::show(3), ItemRef::movie(1), ItemRef::movie(2)]
        );
    }

    #[test]
    fn test_visit_full_set_evicts_oldest() {
        let set = full_set(ItemRef::movie(1), ItemRef::movie(2), ItemRef::show(3));
        let next = set.visit(&ItemRef::show(4));
        assert_eq!(
            next.items(),
            vec![ItemRef::show(4), ItemRef::movie(1), ItemRef::movie(2)]
        );
    }

    #[test]
    fn test_visit_fills_empty_slot_without_eviction() {
        let set = set_of([Some(ItemRef::movie(1)), None, None]);
        let next = set.visit(&ItemRef::movie(2));
        assert_eq!(next.items(), vec![ItemRef::movie(2), ItemRef::movie(1)]);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_visit_with_gap_keeps_relative_order() {
        // Slot 2 empty, slots 1 and 3 occupied.
        let set = set_of([Some(ItemRef::movie(1)), None, Some(ItemRef::show(3))]);
        let next = set.visit(&ItemRef::movie(2));
        assert_eq!(
            next.items(),
            vec![ItemRef::movie(2), ItemRef::movie(1), ItemRef::show(3)]
        );
    }

    #[test]
    fn test_same_id_different_kind_are_distinct() {
        let set = set_of([Some(ItemRef::movie(7)), None, None]);
        let next = set.visit(&ItemRef::show(7));
        assert_eq!(next.items(), vec![ItemRef::show(7), ItemRef::movie(7)]);
    }

    #[test]
    fn test_visit_never_duplicates_or_overflows() {
        let mut set = RecentSet::default();
        let visits = [
            ItemRef::movie(1),
            ItemRef::movie(2),
            ItemRef::movie(1),
            ItemRef::show(1),
            ItemRef::movie(3),
            ItemRef::movie(2),
            ItemRef::movie(2),
        ];
        for item in &visits {
            set = set.visit(item);
            let items = set.items();
            assert!(items.len() <= RECENT_CAPACITY);
            assert_eq!(set.head(), Some(item));
            for (i, a) in items.iter().enumerate() {
                for b in &items[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_slot_decode_accepts_string_ids() {
        let slot = json!({ "id": "42", "type": "movie" });
        assert_eq!(ItemRef::from_slot(&slot), Some(ItemRef::movie(42)));
    }

    #[test]
    fn test_slot_decode_rejects_malformed_values() {
        for slot in [
            json!("movie:1"),
            json!({ "id": 1 }),
            json!({ "type": "movie" }),
            json!({ "id": 1, "type": "episode" }),
            json!({ "id": "not-a-number", "type": "show" }),
            json!(null),
            json!([1, "movie"]),
        ] {
            assert_eq!(ItemRef::from_slot(&slot), None, "slot: {}", slot);
        }
    }

    #[test]
    fn test_row_round_trip_preserves_order() {
        let set = full_set(ItemRef::show(9), ItemRef::movie(8), ItemRef::movie(7));
        let row = set.to_row("user-1");
        assert_eq!(row.user_id, "user-1");
        assert_eq!(RecentSet::from_row(&row), set);
    }

    #[test]
    fn test_from_row_drops_malformed_middle_slot() {
        let row = RecentRow {
            user_id: "user-1".to_string(),
            visited_1: Some(json!({ "id": 1, "type": "movie" })),
            visited_2: Some(json!({ "id": "bogus" })),
            visited_3: Some(json!({ "id": 3, "type": "show" })),
        };
        let set = RecentSet::from_row(&row);
        assert_eq!(set.items(), vec![ItemRef::movie(1), ItemRef::show(3)]);
    }
}
