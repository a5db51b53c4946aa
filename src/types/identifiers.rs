//! Identifier types for the production simulator
//!
//! Stations, routes and workers live in arenas owned by the engine, so their
//! identifiers are plain indices. A run is tagged with a UUID so reports from
//! separate runs can be told apart.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Index of a station inside the station arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(pub usize);

impl StationId {
    /// Position of the station in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STN_{}", self.0)
    }
}

/// Index of a part route (part type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteId(pub usize);

impl RouteId {
    /// Position of the route in the engine's route list
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RTE_{}", self.0)
    }
}

/// Index of a worker in the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub usize);

impl WorkerId {
    /// Position of the worker in the roster
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WKR_{}", self.0)
    }
}

/// One execution slot of one station
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    /// Station owning the slot
    pub station: StationId,
    /// Slot index within the station
    pub slot: usize,
}

impl SlotRef {
    /// Create a slot reference
    pub fn new(station: StationId, slot: usize) -> Self {
        Self { station, slot }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.station, self.slot)
    }
}

/// Identity of one part instance: its route plus the arrival serial number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartId {
    /// Route the part belongs to
    pub route: RouteId,
    /// Arrival serial within that route
    pub serial: u64,
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PART_{}_{}", self.route.0, self.serial)
    }
}

/// Unique identifier for a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RUN_{}", self.0.simple())
    }
}

impl Serialize for RunId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("RUN_{}", self.0.simple()))
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("RUN_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(RunId(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_identifiers_display() {
        assert_eq!(StationId(3).to_string(), "STN_3");
        assert_eq!(RouteId(0).to_string(), "RTE_0");
        assert_eq!(WorkerId(12).to_string(), "WKR_12");
        assert_eq!(SlotRef::new(StationId(2), 1).to_string(), "STN_2#1");
        let part = PartId { route: RouteId(1), serial: 7 };
        assert_eq!(part.to_string(), "PART_1_7");
    }

    #[test]
    fn test_slot_ref_ordering_follows_station_then_slot() {
        let a = SlotRef::new(StationId(0), 5);
        let b = SlotRef::new(StationId(1), 0);
        let c = SlotRef::new(StationId(1), 2);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_run_id_serialization_roundtrip() {
        let run_id = RunId::new();
        let json = serde_json::to_string(&run_id).unwrap();
        assert!(json.contains("RUN_"));
        let back: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(run_id, back);
    }

    #[test]
    fn test_run_id_accepts_raw_uuid() {
        let uuid = Uuid::new_v4();
        let json = format!("\"{}\"", uuid);
        let run_id: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(run_id.0, uuid);
    }
}
