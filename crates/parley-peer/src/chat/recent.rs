//! Recently used rooms.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Hook called after every successful join.
pub trait RecentRooms: Send + Sync {
    fn record_room_used(&self, room: &str);
    /// Most recent first.
    fn rooms(&self) -> Vec<String>;
}

/// Bounded, deduplicated most-recently-used list kept in memory.
pub struct MruRooms {
    capacity: usize,
    rooms: Mutex<VecDeque<String>>,
}

impl MruRooms {
    pub const DEFAULT_CAPACITY: usize = 5;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            rooms: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Seed from a previously saved list (most recent first).
    pub fn with_rooms(capacity: usize, saved: impl IntoIterator<Item = String>) -> Self {
        let mru = Self::new(capacity);
        let saved: Vec<String> = saved.into_iter().collect();
        for room in saved.iter().rev() {
            mru.record_room_used(room);
        }
        mru
    }
}

impl Default for MruRooms {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl RecentRooms for MruRooms {
    fn record_room_used(&self, room: &str) {
        let mut rooms = self.rooms.lock().unwrap_or_else(|p| p.into_inner());
        rooms.retain(|r| r != room);
        rooms.push_front(room.to_string());
        rooms.truncate(self.capacity);
    }

    fn rooms(&self) -> Vec<String> {
        let rooms = self.rooms.lock().unwrap_or_else(|p| p.into_inner());
        rooms.iter().cloned().collect()
    }
}
