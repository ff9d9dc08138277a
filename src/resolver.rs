// Field-by-field reconciliation of the three supplier records for one hotel

use crate::index::coerce_key;
use crate::supplier::RawRecord;
use serde::Serialize;
use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub link: String,
    pub description: String,
}

// Flat, fully resolved hotel; `None` means no supplier had the field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalRecord {
    pub hotel_id: Option<String>,
    pub destination_id: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<Number>,
    pub longitude: Option<Number>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub amenities_general: Option<Vec<String>>,
    pub amenities_room: Option<Vec<String>>,
    pub images_rooms: Option<Vec<Image>>,
    pub images_site: Option<Vec<Image>>,
    pub images_amenities: Option<Vec<Image>>,
    pub booking_conditions: Option<Vec<String>>,
}

/// Resolves one canonical hotel from whatever each supplier has for its key.
///
/// Every field walks a fixed precedence chain and takes the first candidate
/// that is present (strings: non-blank once trimmed). Image lists come from a
/// single supplier, patagonia's room images winning over paperflies'.
pub fn resolve(
    acme: Option<&RawRecord>,
    patagonia: Option<&RawRecord>,
    paperflies: Option<&RawRecord>,
) -> CanonicalRecord {
    CanonicalRecord {
        hotel_id: identifier(field(acme, &["Id"]))
            .or_else(|| identifier(field(patagonia, &["id"])))
            .or_else(|| identifier(field(paperflies, &["hotel_id"]))),
        destination_id: identifier(field(acme, &["DestinationId"]))
            .or_else(|| identifier(field(patagonia, &["destination"])))
            .or_else(|| identifier(field(paperflies, &["destination_id"]))),
        name: text(field(acme, &["Name"]))
            .or_else(|| text(field(patagonia, &["name"])))
            .or_else(|| text(field(paperflies, &["hotel_name"]))),
        latitude: coordinate(field(acme, &["Latitude"]))
            .or_else(|| coordinate(field(patagonia, &["lat"]))),
        longitude: coordinate(field(acme, &["Longitude"]))
            .or_else(|| coordinate(field(patagonia, &["lng"]))),
        address: text(field(acme, &["Address"]))
            .or_else(|| text(field(patagonia, &["address"])))
            .or_else(|| text(field(paperflies, &["location", "address"]))),
        city: text(field(acme, &["City"])),
        country: text(field(paperflies, &["location", "country"]))
            .or_else(|| text(field(acme, &["Country"]))),
        description: text(field(paperflies, &["details"])),
        amenities_general: string_list(field(paperflies, &["amenities", "general"])),
        amenities_room: string_list(field(paperflies, &["amenities", "room"])),
        images_rooms: image_list(field(patagonia, &["images", "rooms"]), "url", "description")
            .or_else(|| {
                image_list(field(paperflies, &["images", "rooms"]), "link", "caption")
            }),
        images_site: image_list(field(paperflies, &["images", "site"]), "link", "caption"),
        images_amenities: image_list(
            field(patagonia, &["images", "amenities"]),
            "url",
            "description",
        ),
        booking_conditions: string_list(field(paperflies, &["booking_conditions"])),
    }
}

// Walks nested objects; any missing step yields None
fn field<'a>(record: Option<&'a RawRecord>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut value = record?.get(*first)?;
    for step in rest {
        value = value.as_object()?.get(*step)?;
    }
    Some(value)
}

// Trimmed string, None when blank or not a string
fn text(value: Option<&Value>) -> Option<String> {
    let trimmed = value?.as_str()?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Identifiers show up both as strings and as numbers
fn identifier(value: Option<&Value>) -> Option<String> {
    let id = coerce_key(value);
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

// Numbers pass through untouched; numeric strings are accepted, blank ones are absent
fn coordinate(value: Option<&Value>) -> Option<Number> {
    match value? {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Some(Number::from(n));
            }
            trimmed.parse::<f64>().ok().and_then(Number::from_f64)
        }
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(items.iter().filter_map(|item| text(Some(item))).collect())
}

// Entries without a usable link are dropped, a missing description becomes empty
fn image_list(value: Option<&Value>, link_field: &str, description_field: &str) -> Option<Vec<Image>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| {
                let entry = item.as_object()?;
                let link = text(entry.get(link_field))?;
                let description = text(entry.get(description_field)).unwrap_or_default();
                Some(Image { link, description })
            })
            .collect(),
    )
}
