//! Instruction vocabulary for turn-by-turn directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compass direction of the first segment, in 45° buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl Heading {
    /// Buckets a heading in degrees counter-clockwise from east.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_courier::directions::Heading;
    ///
    /// assert_eq!(Heading::from_degrees(10.0), Heading::East);
    /// assert_eq!(Heading::from_degrees(90.0), Heading::North);
    /// assert_eq!(Heading::from_degrees(350.0), Heading::East);
    /// ```
    pub fn from_degrees(degrees: f64) -> Self {
        let d = degrees.rem_euclid(360.0);
        if d <= 22.5 || d > 337.5 {
            Self::East
        } else if d <= 67.5 {
            Self::NorthEast
        } else if d <= 112.5 {
            Self::North
        } else if d <= 157.5 {
            Self::NorthWest
        } else if d <= 202.5 {
            Self::West
        } else if d <= 247.5 {
            Self::SouthWest
        } else if d <= 292.5 {
            Self::South
        } else {
            Self::SouthEast
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::East => "east",
            Self::NorthEast => "northeast",
            Self::North => "north",
            Self::NorthWest => "northwest",
            Self::West => "west",
            Self::SouthWest => "southwest",
            Self::South => "south",
            Self::SouthEast => "southeast",
        };
        f.write_str(name)
    }
}

/// Kind of turn at an intersection, from the signed turn angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Maneuver {
    SharpLeft,
    Left,
    KeepLeft,
    Straight,
    KeepRight,
    Right,
    SharpRight,
}

impl Maneuver {
    /// Classifies a turn angle in degrees; negative is left, positive right.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_courier::directions::Maneuver;
    ///
    /// assert_eq!(Maneuver::from_angle(-90.0), Maneuver::Left);
    /// assert_eq!(Maneuver::from_angle(5.0), Maneuver::Straight);
    /// assert_eq!(Maneuver::from_angle(150.0), Maneuver::SharpRight);
    /// ```
    pub fn from_angle(angle: f64) -> Self {
        if angle < -120.0 {
            Self::SharpLeft
        } else if angle < -50.0 {
            Self::Left
        } else if angle < -10.0 {
            Self::KeepLeft
        } else if angle <= 10.0 {
            Self::Straight
        } else if angle <= 50.0 {
            Self::KeepRight
        } else if angle <= 120.0 {
            Self::Right
        } else {
            Self::SharpRight
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::SharpLeft => "Make a sharp left",
            Self::Left => "Turn left",
            Self::KeepLeft => "Keep left",
            Self::Straight => "Continue straight",
            Self::KeepRight => "Keep right",
            Self::Right => "Turn right",
            Self::SharpRight => "Make a sharp right",
        }
    }
}

/// Which hand a street is counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// One step of turn-by-turn directions.
///
/// Street names are `None` when the map has no name for the street.
///
/// # Examples
///
/// ```
/// use u_courier::directions::{Instruction, Maneuver, Side};
///
/// let turn = Instruction::Turn { maneuver: Maneuver::Right, street: Some("Cross St".into()) };
/// assert_eq!(turn.to_string(), "Turn right onto Cross St");
///
/// let nth = Instruction::NthStreet { side: Side::Left, n: 3, street: None };
/// assert_eq!(nth.to_string(), "Take the 3rd street from the left");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Leave the start along the first street.
    Depart { heading: Heading, street: Option<String> },
    /// Drive on without turning.
    Continue { meters: f64 },
    /// Turn with an unambiguous maneuver.
    Turn { maneuver: Maneuver, street: Option<String> },
    /// Turn into the `n`-th street counted from one side; used when several
    /// streets leave on that side.
    NthStreet { side: Side, n: usize, street: Option<String> },
    /// Turn around and drive back.
    UTurn { street: Option<String> },
    /// Destination reached.
    Arrive,
}

fn ordinal_suffix(n: usize) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn write_onto(f: &mut fmt::Formatter<'_>, street: &Option<String>) -> fmt::Result {
    match street {
        Some(name) => write!(f, " onto {name}"),
        None => Ok(()),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depart { heading, street } => {
                write!(f, "Head {heading}")?;
                match street {
                    Some(name) => write!(f, " down {name}"),
                    None => Ok(()),
                }
            }
            Self::Continue { meters } => write!(f, "Continue for {meters:.0} meters"),
            Self::Turn { maneuver, street } => {
                f.write_str(maneuver.phrase())?;
                write_onto(f, street)
            }
            Self::NthStreet { side, n, street } => {
                write!(f, "Take the {n}{} street from the {side}", ordinal_suffix(*n))?;
                write_onto(f, street)
            }
            Self::UTurn { street } => {
                f.write_str("Make a U-turn")?;
                write_onto(f, street)
            }
            Self::Arrive => f.write_str("You have arrived"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_buckets() {
        let cases = [
            (0.0, Heading::East),
            (22.5, Heading::East),
            (22.6, Heading::NorthEast),
            (112.5, Heading::North),
            (180.0, Heading::West),
            (225.0, Heading::SouthWest),
            (270.0, Heading::South),
            (300.0, Heading::SouthEast),
            (337.6, Heading::East),
            (-90.0, Heading::South),
        ];
        for (deg, expected) in cases {
            assert_eq!(Heading::from_degrees(deg), expected, "{deg}");
        }
    }

    #[test]
    fn test_maneuver_boundaries() {
        assert_eq!(Maneuver::from_angle(-121.0), Maneuver::SharpLeft);
        assert_eq!(Maneuver::from_angle(-120.0), Maneuver::Left);
        assert_eq!(Maneuver::from_angle(-50.0), Maneuver::KeepLeft);
        assert_eq!(Maneuver::from_angle(-10.0), Maneuver::Straight);
        assert_eq!(Maneuver::from_angle(10.0), Maneuver::Straight);
        assert_eq!(Maneuver::from_angle(50.0), Maneuver::KeepRight);
        assert_eq!(Maneuver::from_angle(120.0), Maneuver::Right);
        assert_eq!(Maneuver::from_angle(120.5), Maneuver::SharpRight);
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(21), "st");
    }

    #[test]
    fn test_display() {
        let depart = Instruction::Depart {
            heading: Heading::North,
            street: Some("Main St".into()),
        };
        assert_eq!(depart.to_string(), "Head north down Main St");
        assert_eq!(Instruction::Continue { meters: 1112.4 }.to_string(), "Continue for 1112 meters");
        assert_eq!(
            Instruction::Turn { maneuver: Maneuver::KeepLeft, street: None }.to_string(),
            "Keep left"
        );
        assert_eq!(
            Instruction::NthStreet { side: Side::Right, n: 2, street: Some("Oak Ave".into()) }.to_string(),
            "Take the 2nd street from the right onto Oak Ave"
        );
        assert_eq!(Instruction::UTurn { street: None }.to_string(), "Make a U-turn");
        assert_eq!(Instruction::Arrive.to_string(), "You have arrived");
    }
}
