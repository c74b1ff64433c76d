//! FoxService: finding the closest rabbit hole that has someone home.

use super::{ServiceError, ServiceResult};
use crate::models::rabbit_hole::{NearbyRabbitHole, RabbitHole};
use geo::{Distance, Haversine, Point};
use sqlx::SqlitePool;
use std::sync::Arc;

const METERS_PER_KM: f64 = 1000.0;

#[derive(Clone)]
pub struct FoxService {
    pub db: Arc<SqlitePool>,
}

impl FoxService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// The populated hole nearest to (`latitude`, `longitude`).
    ///
    /// Holes with no bunnies are skipped. Returns `NotFound` when no hole
    /// qualifies.
    pub async fn nearest_populated(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> ServiceResult<NearbyRabbitHole> {
        let holes = sqlx::query_as::<_, RabbitHole>(
            "SELECT h.id, h.location, h.owner_id, h.bunnies_limit, h.latitude, h.longitude
             FROM rabbit_holes h
             WHERE EXISTS (SELECT 1 FROM bunnies b WHERE b.home_id = h.id)
             ORDER BY h.id",
        )
        .fetch_all(&*self.db)
        .await?;

        closest_hole(latitude, longitude, holes)
            .ok_or_else(|| {
                ServiceError::not_found("populated rabbit hole near", format!("{latitude},{longitude}"))
            })
    }
}

/// Great-circle distance in kilometres.
pub fn distance_km(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> f64 {
    Haversine.distance(Point::new(from_lon, from_lat), Point::new(to_lon, to_lat)) / METERS_PER_KM
}

/// Pick the hole closest to the origin. On equal distance the lowest id wins.
pub fn closest_hole(
    latitude: f64,
    longitude: f64,
    holes: impl IntoIterator<Item = RabbitHole>,
) -> Option<NearbyRabbitHole> {
    let mut best: Option<(f64, i64, RabbitHole)> = None;

    for hole in holes {
        let distance = distance_km(latitude, longitude, hole.latitude, hole.longitude);
        let better = match &best {
            None => true,
            Some((best_distance, best_id, _)) => {
                distance < *best_distance || (distance == *best_distance && hole.id < *best_id)
            }
        };
        if better {
            best = Some((distance, hole.id, hole));
        }
    }

    best.map(|(distance_km, _, hole)| NearbyRabbitHole {
        location: hole.location,
        latitude: hole.latitude,
        longitude: hole.longitude,
        distance_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hole(id: i64, location: &str, latitude: f64, longitude: f64) -> RabbitHole {
        RabbitHole {
            id,
            location: location.into(),
            owner_id: 1,
            bunnies_limit: 5,
            latitude,
            longitude,
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn picks_the_nearest_hole() {
        let holes = vec![
            hole(1, "far", 10.0, 10.0),
            hole(2, "near", 0.1, 0.1),
            hole(3, "middle", 1.0, 1.0),
        ];
        let nearest = closest_hole(0.0, 0.0, holes).unwrap();
        assert_eq!(nearest.location, "near");
        assert!(nearest.distance_km > 0.0);
    }

    #[test]
    fn ties_go_to_the_lowest_id() {
        let holes = vec![hole(7, "seven", 1.0, 1.0), hole(3, "three", 1.0, 1.0)];
        let nearest = closest_hole(0.0, 0.0, holes).unwrap();
        assert_eq!(nearest.location, "three");
    }

    #[test]
    fn no_candidates_means_nothing_nearby() {
        assert!(closest_hole(0.0, 0.0, Vec::new()).is_none());
    }
}
