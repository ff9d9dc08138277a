// Output shape exposed to consumers

use crate::resolver::{CanonicalRecord, Image};
use serde::Serialize;
use serde_json::Number;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub id: String,
    pub destination_id: String,
    pub name: String,
    pub location: Location,
    pub description: Option<String>,
    pub amenities: Amenities,
    pub images: Images,
    pub booking_conditions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub lat: Option<Number>,
    pub lng: Option<Number>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amenities {
    pub general: Option<Vec<String>>,
    pub room: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Images {
    pub rooms: Option<Vec<Image>>,
    pub site: Option<Vec<Image>>,
    pub amenities: Option<Vec<Image>>,
}

// None when either identifier is missing; an unresolved name is emitted empty
pub fn format(canonical: CanonicalRecord) -> Option<OutputRecord> {
    let (id, destination_id) = match (canonical.hotel_id, canonical.destination_id) {
        (Some(id), Some(destination_id)) if !id.is_empty() && !destination_id.is_empty() => {
            (id, destination_id)
        }
        (id, destination_id) => {
            debug!(
                hotel_id = ?id,
                destination_id = ?destination_id,
                "Dropping hotel without both identifiers"
            );
            return None;
        }
    };

    Some(OutputRecord {
        id,
        destination_id,
        name: canonical.name.unwrap_or_default(),
        location: Location {
            lat: canonical.latitude,
            lng: canonical.longitude,
            address: canonical.address,
            city: canonical.city,
            country: canonical.country,
        },
        description: canonical.description,
        amenities: Amenities {
            general: canonical.amenities_general,
            room: canonical.amenities_room,
        },
        images: Images {
            rooms: canonical.images_rooms,
            site: canonical.images_site,
            amenities: canonical.images_amenities,
        },
        booking_conditions: canonical.booking_conditions,
    })
}
