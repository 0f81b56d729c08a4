use crate::{ActivityRecord, ActivityType, Address, Catalog, Category, Facility};

fn facility(id: i64, title: &str, street: &str, postal_code: &str, lat: f64, lng: f64) -> Facility {
    let slug = title.to_lowercase().replace(' ', "-");
    Facility {
        id,
        title: title.to_string(),
        phone: format!("416-392-{:04}", 1000 + id),
        email: format!("{slug}@toronto.example"),
        url: format!("https://toronto.example/facilities/{slug}"),
        address: Address {
            id: id * 10,
            street: street.to_string(),
            city: "Toronto".to_string(),
            province: "ON".to_string(),
            postal_code: postal_code.to_string(),
            country: "Canada".to_string(),
        },
        longitude: lng,
        latitude: lat,
        distance: None,
    }
}

fn activity(id: i64, title: &str, type_id: i64, facility_id: i64, day: u32, hour: u32) -> ActivityRecord {
    ActivityRecord {
        id,
        title: title.to_string(),
        type_id,
        facility_id,
        reservation_url: format!("https://toronto.example/reserve/{id}"),
        is_available: id % 3 != 0,
        start_time: format!("2021-03-{day:02}T{hour:02}:00:00"),
        end_time: format!("2021-03-{day:02}T{:02}:00:00", hour + 1),
        min_age: Some(if type_id == 4 { 6 } else { 16 }),
        max_age: None,
        last_updated: "2021-02-28T09:30:00Z".to_string(),
    }
}

/// The catalog the standalone server and the integration tests run against.
pub fn seed() -> Catalog {
    let categories = vec![
        Category { id: 1, title: "Aquatics".to_string() },
        Category { id: 2, title: "Skating".to_string() },
        Category { id: 3, title: "Fitness".to_string() },
    ];

    let types = vec![
        ActivityType { id: 1, title: "Lane Swim".to_string(), category: 1 },
        ActivityType { id: 2, title: "Leisure Swim".to_string(), category: 1 },
        ActivityType { id: 3, title: "Shinny".to_string(), category: 2 },
        ActivityType { id: 4, title: "Family Skate".to_string(), category: 2 },
        ActivityType { id: 5, title: "Yoga".to_string(), category: 3 },
    ];

    let facilities = vec![
        facility(7, "Regent Park Aquatic Centre", "640 Dundas St E", "M5A 2B8", 43.6598, -79.3621),
        facility(8, "Nathan Phillips Square", "100 Queen St W", "M5H 2N1", 43.6525, -79.3839),
        facility(9, "Scarborough Village Recreation Centre", "3600 Kingston Rd", "M1M 1R9", 43.7386, -79.2114),
        facility(10, "Wallace Emerson Community Centre", "1260 Dufferin St", "M6H 4C3", 43.6664, -79.4411),
    ];

    let activities = vec![
        activity(1, "Lane Swim", 1, 7, 1, 7),
        activity(2, "Lane Swim", 1, 7, 2, 7),
        activity(3, "Lane Swim", 1, 9, 1, 12),
        activity(4, "Leisure Swim", 2, 7, 3, 14),
        activity(5, "Shinny 18+", 3, 8, 1, 20),
        activity(6, "Shinny 18+", 3, 10, 4, 21),
        activity(7, "Family Skate", 4, 8, 6, 13),
        activity(8, "Family Skate", 4, 8, 7, 13),
        activity(9, "Family Skate", 4, 10, 6, 10),
        activity(10, "Family Skate", 4, 10, 7, 10),
        activity(11, "Hatha Yoga", 5, 9, 2, 18),
    ];

    Catalog {
        categories,
        types,
        facilities,
        activities,
    }
}
