//! Static grid entities: destinations and obstacles.

use crate::grid::Position;
use serde::{Deserialize, Serialize};

/// Index into the world's destination list
pub type DestinationId = usize;

/// Default color for generated destinations
pub const DEFAULT_DESTINATION_COLOR: Color = Color([0, 0, 128]);

/// RGB color, carried through for renderers only
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

/// Behaviour tag of a destination.
///
/// Only `exit` has meaning to the engine (arrival removes the agent); every
/// other tag is kept verbatim and treated as a waypoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Preset {
    Exit,
    Waypoint(String),
}

impl Preset {
    #[inline]
    pub fn is_exit(&self) -> bool {
        matches!(self, Preset::Exit)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Preset::Exit => "exit",
            Preset::Waypoint(tag) => tag,
        }
    }
}

impl From<String> for Preset {
    fn from(tag: String) -> Self {
        if tag == "exit" {
            Preset::Exit
        } else {
            Preset::Waypoint(tag)
        }
    }
}

impl From<&str> for Preset {
    fn from(tag: &str) -> Self {
        Preset::from(tag.to_string())
    }
}

impl From<Preset> for String {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Exit => "exit".to_string(),
            Preset::Waypoint(tag) => tag,
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A goal cell agents walk towards. Never occupies the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub pos: Position,
    pub preset: Preset,
    #[serde(default)]
    pub color: Color,
}

impl Destination {
    pub fn new(pos: Position, preset: impl Into<Preset>, color: Color) -> Self {
        Self {
            pos,
            preset: preset.into(),
            color,
        }
    }

    /// Exit destination with the default color
    pub fn exit(pos: Position) -> Self {
        Self::new(pos, Preset::Exit, DEFAULT_DESTINATION_COLOR)
    }
}

/// Immovable blocker occupying one cell for the whole run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Position,
}

impl Obstacle {
    pub fn new(pos: Position) -> Self {
        Self { pos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert!(Preset::from("exit").is_exit());
        assert!(!Preset::from("waypoint").is_exit());
        assert!(!Preset::from("Exit").is_exit());
        assert_eq!(Preset::from("bench").as_str(), "bench");
    }

    #[test]
    fn test_destination_yaml() {
        let yaml = "pos: {x: 3, y: 0}\npreset: exit\ncolor: [255, 0, 0]\n";
        let dest: Destination = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(dest.pos, Position::new(3, 0));
        assert!(dest.preset.is_exit());
        assert_eq!(dest.color, Color([255, 0, 0]));

        let out = serde_yaml::to_string(&Destination::new(Position::new(1, 2), "shop", Color::default())).unwrap();
        assert!(out.contains("preset: shop"));
    }
}
