//! Level layouts supplied by external level sources.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Coordinate, Material};

/// Single element of a level layout.
///
/// Missing terrain dimensions default to the material's footprint scaled by
/// the cell size. Tanks always take the configured tank size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelElement {
    /// Kind of element to place.
    pub material: Material,
    /// Top-left corner of the element in pixels.
    pub origin: Coordinate,
    /// Explicit width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Explicit height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

impl LevelElement {
    /// Creates an element that uses the material's default dimensions.
    #[must_use]
    pub const fn new(material: Material, origin: Coordinate) -> Self {
        Self {
            material,
            origin,
            width: None,
            height: None,
        }
    }

    /// Creates an element with explicit pixel dimensions.
    #[must_use]
    pub const fn sized(material: Material, origin: Coordinate, width: u32, height: u32) -> Self {
        Self {
            material,
            origin,
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Ordered arrangement of elements that populates a battlefield.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Elements in the order they were authored.
    pub elements: Vec<LevelElement>,
}

impl LevelLayout {
    /// Creates a layout from the provided elements.
    #[must_use]
    pub fn new(elements: Vec<LevelElement>) -> Self {
        Self { elements }
    }
}

/// Reasons a level layout is refused. The world is left untouched whenever
/// one of these is reported.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelLoadError {
    /// The material cannot be placed from a level layout.
    #[error("element {index} uses material {material:?}, which cannot be placed in a level")]
    UnplaceableMaterial {
        /// Position of the element within the layout.
        index: usize,
        /// Offending material.
        material: Material,
    },
    /// The element has no area.
    #[error("element {index} ({material:?}) has a zero width or height")]
    ZeroSized {
        /// Position of the element within the layout.
        index: usize,
        /// Material of the element.
        material: Material,
    },
    /// Part of the element lies outside the grid.
    #[error("element {index} ({material:?}) at ({}, {}) extends outside the grid", .origin.x(), .origin.y())]
    OutOfBounds {
        /// Position of the element within the layout.
        index: usize,
        /// Material of the element.
        material: Material,
        /// Authored origin of the element.
        origin: Coordinate,
    },
    /// The layout places more than one player tank.
    #[error("element {index} places a second player tank")]
    DuplicatePlayer {
        /// Position of the second player tank within the layout.
        index: usize,
    },
    /// The layout places more than one eagle.
    #[error("element {index} places a second eagle")]
    DuplicateEagle {
        /// Position of the second eagle within the layout.
        index: usize,
    },
    /// Two solid elements share pixels.
    #[error("element {index} overlaps element {other}")]
    Overlap {
        /// Position of the later element within the layout.
        index: usize,
        /// Position of the earlier element it collides with.
        other: usize,
    },
    /// The configured player start is covered by a solid element.
    #[error("player start is blocked by element {other}")]
    PlayerStartBlocked {
        /// Position of the blocking element within the layout.
        other: usize,
    },
}
