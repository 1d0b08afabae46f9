use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// One player's statistics record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Player {
    pub last: String,
    pub first: String,
    pub age: f64,
    pub height: f64,
    pub wingspan: f64,
    pub weight: i64,
    pub gp: i64,
    pub mp: i64,
}

impl Player {
    pub fn key(&self) -> PlayerKey {
        PlayerKey {
            last: self.last.clone(),
            first: self.first.clone(),
        }
    }

    pub fn matches(&self, last: &str, first: &str) -> bool {
        self.last == last && self.first == first
    }

    /// Every float column must hold a finite value
    pub fn is_well_formed(&self) -> bool {
        self.age.is_finite() && self.height.is_finite() && self.wingspan.is_finite()
    }
}

/// Identity of a row: (last, first)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerKey {
    pub last: String,
    pub first: String,
}

impl std::fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.last, self.first)
    }
}

/// Partial update; only the fields that were supplied are `Some`
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPatch {
    pub key: PlayerKey,
    pub age: Option<f64>,
    pub height: Option<f64>,
    pub wingspan: Option<f64>,
    pub weight: Option<i64>,
    pub gp: Option<i64>,
    pub mp: Option<i64>,
}

impl PlayerPatch {
    pub fn apply_to(&self, player: &mut Player) {
        if let Some(age) = self.age {
            player.age = age;
        }
        if let Some(height) = self.height {
            player.height = height;
        }
        if let Some(wingspan) = self.wingspan {
            player.wingspan = wingspan;
        }
        if let Some(weight) = self.weight {
            player.weight = weight;
        }
        if let Some(gp) = self.gp {
            player.gp = gp;
        }
        if let Some(mp) = self.mp {
            player.mp = mp;
        }
    }
}

/// Query parameters for listing the table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortQuery {
    pub sort_age: Option<bool>,
}

/// Owned copy of the table, serialized column by column:
/// `{"last": {"0": "James", "1": ...}, "first": {...}, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub rows: Vec<Player>,
}

impl TableSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One column of the snapshot, keyed by row position
struct Column<'a, T> {
    rows: &'a [Player],
    value: fn(&Player) -> T,
}

impl<T: Serialize> Serialize for Column<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (position, player) in self.rows.iter().enumerate() {
            map.serialize_entry(&position.to_string(), &(self.value)(player))?;
        }
        map.end()
    }
}

impl Serialize for TableSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows = self.rows.as_slice();
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry("last", &Column { rows, value: |p| p.last.clone() })?;
        map.serialize_entry("first", &Column { rows, value: |p| p.first.clone() })?;
        map.serialize_entry("age", &Column { rows, value: |p| p.age })?;
        map.serialize_entry("height", &Column { rows, value: |p| p.height })?;
        map.serialize_entry("wingspan", &Column { rows, value: |p| p.wingspan })?;
        map.serialize_entry("weight", &Column { rows, value: |p| p.weight })?;
        map.serialize_entry("gp", &Column { rows, value: |p| p.gp })?;
        map.serialize_entry("mp", &Column { rows, value: |p| p.mp })?;
        map.end()
    }
}

/// Success envelope: `{"data": <table>}`
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: TableSnapshot,
}

/// Failure envelope: `{"message": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
