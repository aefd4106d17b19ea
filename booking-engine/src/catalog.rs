//! Catalog Service - read-only master-data facade with in-memory caching
//!
//! Rooms, movies and concession items are owned by external management
//! surfaces. The engine reads them through this service and never
//! writes them; the upsert/remove APIs exist for the surrounding system
//! (and tests) to feed the cache.

use parking_lot::RwLock;
use shared::models::{Concession, Movie, Room};
use std::collections::HashMap;

/// Catalog service - master-data lookups for the booking engine
#[derive(Default)]
pub struct CatalogService {
    rooms: RwLock<HashMap<i64, Room>>,
    movies: RwLock<HashMap<i64, Movie>>,
    concessions: RwLock<HashMap<i64, Concession>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("rooms", &self.rooms.read().len())
            .field("movies", &self.movies.read().len())
            .field("concessions", &self.concessions.read().len())
            .finish()
    }
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Rooms
    // ========================================================================

    pub fn upsert_room(&self, room: Room) {
        self.rooms.write().insert(room.id, room);
    }

    pub fn get_room(&self, room_id: i64) -> Option<Room> {
        self.rooms.read().get(&room_id).cloned()
    }

    /// Bookable capacity of a room (excludes out-of-service seats)
    pub fn room_capacity(&self, room_id: i64) -> Option<usize> {
        self.rooms.read().get(&room_id).map(Room::capacity)
    }

    // ========================================================================
    // Movies
    // ========================================================================

    pub fn upsert_movie(&self, movie: Movie) {
        self.movies.write().insert(movie.id, movie);
    }

    pub fn get_movie(&self, movie_id: i64) -> Option<Movie> {
        self.movies.read().get(&movie_id).cloned()
    }

    /// Runtime in minutes, used to derive showing end times
    pub fn movie_duration_minutes(&self, movie_id: i64) -> Option<i64> {
        self.movies.read().get(&movie_id).map(|m| m.duration_minutes)
    }

    // ========================================================================
    // Concessions
    // ========================================================================

    pub fn upsert_concession(&self, concession: Concession) {
        self.concessions.write().insert(concession.id, concession);
    }

    pub fn get_concession(&self, concession_id: i64) -> Option<Concession> {
        self.concessions.read().get(&concession_id).cloned()
    }
}
