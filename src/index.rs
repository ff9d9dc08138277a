// Per-supplier indexes keyed by (hotel id, destination id)

use crate::supplier::{RawRecord, Supplier, SupplierSnapshot};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    pub hotel_id: String,
    pub destination_id: String,
}

impl CompositeKey {
    pub fn new(hotel_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self {
            hotel_id: hotel_id.into(),
            destination_id: destination_id.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.hotel_id.is_empty() && !self.destination_id.is_empty()
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hotel_id, self.destination_id)
    }
}

// Identifier text of a JSON value: strings trimmed, numbers and booleans
// in their JSON spelling, anything else empty
pub fn coerce_key(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => number_key(n),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

// Whole-number floats are written as integers so `5432.0` and `5432` match
fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f)
            if n.is_f64() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
        {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

// Last write wins per key, keys remember the position they were first seen at
#[derive(Debug, Clone, Default)]
pub struct SupplierIndex {
    positions: HashMap<CompositeKey, usize>,
    entries: Vec<(CompositeKey, RawRecord)>,
}

impl SupplierIndex {
    pub fn build(
        records: impl IntoIterator<Item = RawRecord>,
        hotel_key_field: &str,
        destination_key_field: &str,
    ) -> Self {
        let mut index = SupplierIndex::default();
        for record in records {
            let key = CompositeKey::new(
                coerce_key(record.get(hotel_key_field)),
                coerce_key(record.get(destination_key_field)),
            );
            index.insert(key, record);
        }
        index
    }

    pub fn for_supplier(supplier: Supplier, records: impl IntoIterator<Item = RawRecord>) -> Self {
        let index = Self::build(
            records,
            supplier.hotel_key_field(),
            supplier.destination_key_field(),
        );
        debug!(supplier = %supplier, keys = index.len(), "Indexed supplier records");
        index
    }

    fn insert(&mut self, key: CompositeKey, record: RawRecord) {
        match self.positions.get(&key) {
            Some(&position) => {
                debug!(key = %key, "Duplicate supplier key, keeping the later record");
                self.entries[position].1 = record;
            }
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, record));
            }
        }
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&RawRecord> {
        self.positions
            .get(key)
            .map(|&position| &self.entries[position].1)
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.positions.contains_key(key)
    }

    // Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// The three supplier indexes of one invocation, immutable once built
#[derive(Debug, Clone, Default)]
pub struct SupplierIndexes {
    pub acme: SupplierIndex,
    pub patagonia: SupplierIndex,
    pub paperflies: SupplierIndex,
}

impl SupplierIndexes {
    pub fn from_snapshot(snapshot: SupplierSnapshot) -> Self {
        Self {
            acme: SupplierIndex::for_supplier(Supplier::Acme, snapshot.acme),
            patagonia: SupplierIndex::for_supplier(Supplier::Patagonia, snapshot.patagonia),
            paperflies: SupplierIndex::for_supplier(Supplier::Paperflies, snapshot.paperflies),
        }
    }

    pub fn get(&self, supplier: Supplier) -> &SupplierIndex {
        match supplier {
            Supplier::Acme => &self.acme,
            Supplier::Patagonia => &self.patagonia,
            Supplier::Paperflies => &self.paperflies,
        }
    }

    // Every indexed key, acme first, then patagonia, then paperflies; may repeat
    pub fn all_keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.acme
            .keys()
            .chain(self.patagonia.keys())
            .chain(self.paperflies.keys())
    }
}
