//! Bed and side snapshots returned by the SleepIQ client.

use std::fmt;

/// One half of a bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Lowercase name used in identifiers and attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of the person assigned to a side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sleeper {
    pub first_name: String,
}

/// State of one side of a bed at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideSnapshot {
    pub is_in_bed: bool,
    pub sleep_number: i64,
    pub alert_id: i64,
    pub alert_detailed_message: String,
    pub sleeper: Sleeper,
}

/// Metadata and per-side state of one bed at fetch time.
///
/// A side is `None` when no sleeper is assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedSnapshot {
    pub bed_id: String,
    pub name: String,
    pub mac_address: String,
    pub model: String,
    pub sku: String,
    pub generation: String,
    pub purchase_date: String,
    pub registration_date: String,
    pub size: String,
    pub left: Option<SideSnapshot>,
    pub right: Option<SideSnapshot>,
}

impl BedSnapshot {
    /// The snapshot of the given side, if a sleeper is assigned to it.
    #[must_use]
    pub fn side(&self, side: Side) -> Option<&SideSnapshot> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Sides that have a sleeper assigned, left first.
    pub fn occupied_sides(&self) -> impl Iterator<Item = Side> + '_ {
        Side::ALL
            .into_iter()
            .filter(|side| self.side(*side).is_some())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_select_side_without_reflection() {
        let bed = fixtures::bed("abc123");
        assert_eq!(
            bed.side(Side::Left).map(|s| s.sleeper.first_name.as_str()),
            Some("Sam")
        );
        assert_eq!(
            bed.side(Side::Right).map(|s| s.sleeper.first_name.as_str()),
            Some("Alex")
        );
    }

    #[test]
    fn should_skip_unassigned_sides() {
        let mut bed = fixtures::bed("abc123");
        bed.right = None;
        let sides: Vec<Side> = bed.occupied_sides().collect();
        assert_eq!(sides, vec![Side::Left]);
    }

    #[test]
    fn should_display_side_in_lowercase() {
        assert_eq!(Side::Left.to_string(), "left");
        assert_eq!(Side::Right.to_string(), "right");
    }
}
