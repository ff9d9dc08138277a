// Candidate key selection for the four query modes

use crate::index::{CompositeKey, SupplierIndexes};
use std::collections::HashSet;
use tracing::debug;

// Optional filters as supplied by the caller; `None` means "not given"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotelQuery {
    pub hotel_ids: Option<Vec<String>>,
    pub destination_ids: Option<Vec<String>>,
}

impl HotelQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_hotel_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hotel_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_destination_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destination_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn mode(&self) -> QueryMode<'_> {
        QueryMode::from_filters(self.hotel_ids.as_deref(), self.destination_ids.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode<'a> {
    All,
    ByBoth {
        hotel_ids: &'a [String],
        destination_ids: &'a [String],
    },
    ByHotel(&'a [String]),
    ByDestination(&'a [String]),
}

impl<'a> QueryMode<'a> {
    pub fn from_filters(
        hotel_ids: Option<&'a [String]>,
        destination_ids: Option<&'a [String]>,
    ) -> Self {
        match (hotel_ids, destination_ids) {
            (None, None) => QueryMode::All,
            (Some(hotel_ids), Some(destination_ids)) => QueryMode::ByBoth {
                hotel_ids,
                destination_ids,
            },
            (Some(hotel_ids), None) => QueryMode::ByHotel(hotel_ids),
            (None, Some(destination_ids)) => QueryMode::ByDestination(destination_ids),
        }
    }
}

/// Enumerates the candidate keys for `mode`, in first-discovery order.
///
/// Keys already in `seen` are skipped and every emitted key is added to it, so
/// one set threaded through a single invocation keeps the result free of
/// duplicates. Requested ids are trimmed to match how keys are indexed.
pub fn select_keys(
    indexes: &SupplierIndexes,
    mode: QueryMode<'_>,
    seen: &mut HashSet<CompositeKey>,
) -> Vec<CompositeKey> {
    let mut keys = Vec::new();
    let mut push = |key: CompositeKey| {
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    };

    match mode {
        QueryMode::All => {
            for key in indexes.all_keys() {
                push(key.clone());
            }
        }
        QueryMode::ByBoth {
            hotel_ids,
            destination_ids,
        } => {
            for hotel_id in hotel_ids {
                for destination_id in destination_ids {
                    push(CompositeKey::new(hotel_id.trim(), destination_id.trim()));
                }
            }
        }
        QueryMode::ByHotel(hotel_ids) => {
            for hotel_id in hotel_ids {
                let hotel_id = hotel_id.trim();
                for key in indexes.all_keys().filter(|key| key.hotel_id == hotel_id) {
                    push(key.clone());
                }
            }
        }
        QueryMode::ByDestination(destination_ids) => {
            for destination_id in destination_ids {
                let destination_id = destination_id.trim();
                for key in indexes
                    .all_keys()
                    .filter(|key| key.destination_id == destination_id)
                {
                    push(key.clone());
                }
            }
        }
    }

    debug!(mode = ?mode, candidates = keys.len(), "Selected candidate keys");
    keys
}

// Fresh dedup scope for a single query
pub fn query(indexes: &SupplierIndexes, query: &HotelQuery) -> Vec<CompositeKey> {
    let mut seen = HashSet::new();
    select_keys(indexes, query.mode(), &mut seen)
}
