// End-to-end merge: fetch, index, select keys, resolve, format

use crate::error::SupplierError;
use crate::formatter::{format, OutputRecord};
use crate::index::SupplierIndexes;
use crate::query::{select_keys, HotelQuery};
use crate::resolver::resolve;
use crate::supplier::{fetch_snapshot, SupplierSource};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Merges the three supplier payloads into canonical hotels.
///
/// Each call takes a fresh snapshot from the source; nothing is kept between
/// calls.
pub struct HotelAggregator<S: SupplierSource> {
    source: S,
}

impl<S: SupplierSource> HotelAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn aggregate(&self, query: &HotelQuery) -> Result<Vec<OutputRecord>, SupplierError> {
        let started = Instant::now();
        let snapshot = fetch_snapshot(&self.source).await?;
        let indexes = SupplierIndexes::from_snapshot(snapshot);
        let hotels = merge(&indexes, query);

        info!(
            hotels = hotels.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregated supplier data"
        );
        Ok(hotels)
    }
}

// Synchronous core over an already indexed snapshot
pub fn merge(indexes: &SupplierIndexes, query: &HotelQuery) -> Vec<OutputRecord> {
    let mut seen = HashSet::new();
    let keys = select_keys(indexes, query.mode(), &mut seen);
    let candidates = keys.len();

    let hotels: Vec<OutputRecord> = keys
        .iter()
        .filter_map(|key| {
            let canonical = resolve(
                indexes.acme.get(key),
                indexes.patagonia.get(key),
                indexes.paperflies.get(key),
            );
            format(canonical)
        })
        .collect();

    debug!(
        candidates,
        emitted = hotels.len(),
        "Merged candidate keys"
    );
    hotels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::mock_source::FailingSupplierSource;
    use crate::supplier::{FileSupplierSource, StaticSupplierSource, Supplier};
    use serde_json::json;
    use std::collections::HashSet;

    fn beach_villas_source() -> StaticSupplierSource {
        StaticSupplierSource::new()
            .with_json(
                Supplier::Acme,
                json!([
                    {
                        "Id": "iJhz",
                        "DestinationId": 5432,
                        "Name": " Beach Villas ",
                        "Latitude": -8.409518,
                        "Longitude": 115.188919,
                        "Address": " C081 Pantai Berawa ",
                    },
                    {"Id": "other", "DestinationId": 7000, "Name": "Other Hotel"},
                ]),
            )
            .unwrap()
            .with_json(
                Supplier::Patagonia,
                json!([{
                    "id": "iJhz",
                    "destination": 5432,
                    "name": "Beach Villas",
                    "lat": -8.409,
                    "lng": 115.1887,
                    "address": "C081 Pantai Berawa",
                }]),
            )
            .unwrap()
            .with_json(
                Supplier::Paperflies,
                json!([{
                    "hotel_id": "iJhz",
                    "destination_id": 5432,
                    "hotel_name": "Beach Villas",
                    "location": {"country": "Indonesia"},
                }]),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_aggregate_all_hotels() {
        let aggregator = HotelAggregator::new(beach_villas_source());
        let hotels = aggregator.aggregate(&HotelQuery::all()).await.unwrap();

        assert_eq!(hotels.len(), 2);
        let villas = &hotels[0];
        assert_eq!(villas.id, "iJhz");
        assert_eq!(villas.destination_id, "5432");
        assert_eq!(villas.name, "Beach Villas");
        assert_eq!(villas.location.lat.as_ref().and_then(|n| n.as_f64()), Some(-8.409518));
        assert_eq!(villas.location.lng.as_ref().and_then(|n| n.as_f64()), Some(115.188919));
        assert_eq!(villas.location.address.as_deref(), Some("C081 Pantai Berawa"));
        assert_eq!(villas.location.country.as_deref(), Some("Indonesia"));
        assert_eq!(hotels[1].id, "other");
    }

    #[tokio::test]
    async fn test_aggregate_by_hotel_only() {
        let aggregator = HotelAggregator::new(beach_villas_source());
        let query = HotelQuery::all().with_hotel_ids(["iJhz"]);
        let hotels = aggregator.aggregate(&query).await.unwrap();

        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].id, "iJhz");
        assert_eq!(hotels[0].destination_id, "5432");
    }

    #[tokio::test]
    async fn test_aggregate_by_both_skips_unknown_combination() {
        let aggregator = HotelAggregator::new(beach_villas_source());

        let query = HotelQuery::all()
            .with_hotel_ids(["iJhz"])
            .with_destination_ids(["5432"]);
        let hotels = aggregator.aggregate(&query).await.unwrap();
        assert_eq!(hotels.len(), 1);

        // No supplier knows this pair, so nothing resolves and the gate drops it
        let query = HotelQuery::all()
            .with_hotel_ids(["iJhz"])
            .with_destination_ids(["1"]);
        let hotels = aggregator.aggregate(&query).await.unwrap();
        assert!(hotels.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_by_destination_only() {
        let aggregator = HotelAggregator::new(beach_villas_source());
        let query = HotelQuery::all().with_destination_ids(["7000", "0000"]);
        let hotels = aggregator.aggregate(&query).await.unwrap();

        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].name, "Other Hotel");
    }

    #[tokio::test]
    async fn test_records_without_identifiers_are_dropped() {
        let source = StaticSupplierSource::new()
            .with_json(
                Supplier::Acme,
                json!([
                    {"Id": "", "DestinationId": 1, "Name": "No id"},
                    {"Id": "x", "Name": "No destination"},
                    {"Id": "y", "DestinationId": 2, "Name": "Complete"},
                ]),
            )
            .unwrap();
        let hotels = HotelAggregator::new(source)
            .aggregate(&HotelQuery::all())
            .await
            .unwrap();

        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].name, "Complete");
    }

    #[test]
    fn test_merge_whole_float_destination_is_one_hotel() {
        let acme = serde_json::from_str(
            r#"[{"Id": "iJhz", "DestinationId": 5432.0, "Name": "Beach Villas"}]"#,
        )
        .unwrap();
        let snapshot = crate::supplier::SupplierSnapshot {
            acme,
            patagonia: serde_json::from_str(r#"[{"id": "iJhz", "destination": 5432, "lat": 1.5}]"#)
                .unwrap(),
            paperflies: vec![],
        };
        let hotels = merge(&SupplierIndexes::from_snapshot(snapshot), &HotelQuery::all());

        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].destination_id, "5432");
        assert_eq!(hotels[0].name, "Beach Villas");
        assert_eq!(hotels[0].location.lat.as_ref().and_then(|n| n.as_f64()), Some(1.5));
    }

    #[tokio::test]
    async fn test_supplier_failure_aborts_aggregation() {
        let source = FailingSupplierSource::new(beach_villas_source(), Supplier::Paperflies);
        let result = HotelAggregator::new(source)
            .aggregate(&HotelQuery::all())
            .await;

        match result {
            Err(SupplierError::ApiResponseError {
                supplier,
                status_code,
                ..
            }) => {
                assert_eq!(supplier, Supplier::Paperflies);
                assert_eq!(status_code, 503);
            }
            other => panic!("expected a paperflies failure, got {:?}", other),
        }
    }

    #[test]
    fn test_blocking_aggregate_on_samples() {
        let aggregator = HotelAggregator::new(FileSupplierSource::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/samples"
        )));
        let hotels = tokio_test::block_on(aggregator.aggregate(&HotelQuery::all())).unwrap();

        // No (id, destination_id) pair twice
        let mut pairs = HashSet::new();
        for hotel in &hotels {
            assert!(pairs.insert((hotel.id.clone(), hotel.destination_id.clone())));
            assert!(!hotel.id.is_empty());
            assert!(!hotel.destination_id.is_empty());
        }
        assert_eq!(hotels.len(), 3);
    }

    #[test]
    fn test_merge_on_samples_resolves_images() {
        let aggregator = HotelAggregator::new(FileSupplierSource::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/samples"
        )));
        let query = HotelQuery::all().with_hotel_ids(["iJhz"]);
        let hotels = tokio_test::block_on(aggregator.aggregate(&query)).unwrap();

        assert_eq!(hotels.len(), 1);
        let hotel = &hotels[0];
        assert_eq!(hotel.name, "Beach Villas Singapore");
        assert_eq!(hotel.location.city.as_deref(), Some("Singapore"));
        assert_eq!(hotel.location.country.as_deref(), Some("Singapore"));

        // Room images come from patagonia, site images from paperflies
        let rooms = hotel.images.rooms.as_ref().unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].description, "Double room");
        let site = hotel.images.site.as_ref().unwrap();
        assert_eq!(site[0].description, "Front");
        assert_eq!(hotel.booking_conditions.as_ref().map(Vec::len), Some(3));
    }
}
