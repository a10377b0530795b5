use std::collections::{BTreeSet, HashMap};

/// Room -> usernames believed present.
///
/// Membership is whatever the observed envelopes say: joins added, leaves
/// removed, bulk updates replaced. Nothing is cross-checked against the
/// transport. Entries are created by the first join/update seen for a room.
#[derive(Debug, Default, Clone)]
pub struct Roster {
    rooms: HashMap<String, BTreeSet<String>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self, room: &str) -> Option<&BTreeSet<String>> {
        self.rooms.get(room)
    }

    /// Usernames in lexicographic order (empty if the room is unknown).
    pub fn sorted(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, room: &str, user: &str) -> bool {
        self.rooms.get(room).is_some_and(|set| set.contains(user))
    }

    /// Add-if-absent. Returns whether the set changed.
    pub fn add(&mut self, room: &str, user: &str) -> bool {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(user.to_string())
    }

    /// Remove-if-present. Returns whether the set changed.
    pub fn remove(&mut self, room: &str, user: &str) -> bool {
        self.rooms.get_mut(room).is_some_and(|set| set.remove(user))
    }

    /// Wholesale replace.
    pub fn replace(&mut self, room: &str, users: BTreeSet<String>) {
        self.rooms.insert(room.to_string(), users);
    }

    /// Empty an existing entry; unknown rooms stay unknown.
    pub fn clear(&mut self, room: &str) {
        if let Some(set) = self.rooms.get_mut(room) {
            set.clear();
        }
    }
}
