//! Color sources from the 3MF materials extension

use super::Color;

/// Color group from materials extension
#[derive(Debug, Clone)]
pub struct ColorGroup {
    /// Color group ID
    pub id: usize,
    /// List of colors in this group, RGBA
    pub colors: Vec<(u8, u8, u8, u8)>,
}

impl ColorGroup {
    /// Create a new color group
    pub fn new(id: usize) -> Self {
        Self {
            id,
            colors: Vec::new(),
        }
    }
}

/// Base material group
#[derive(Debug, Clone)]
pub struct BaseMaterialGroup {
    /// Base material group ID
    pub id: usize,
    /// List of base materials in this group
    pub materials: Vec<BaseMaterial>,
}

impl BaseMaterialGroup {
    /// Create a new base material group
    pub fn new(id: usize) -> Self {
        Self {
            id,
            materials: Vec::new(),
        }
    }
}

/// Individual base material within a base material group
#[derive(Debug, Clone)]
pub struct BaseMaterial {
    /// Material name
    pub name: String,
    /// Display color in RGBA format (red, green, blue, alpha)
    pub displaycolor: (u8, u8, u8, u8),
}

impl BaseMaterial {
    /// Create a new base material
    pub fn new(name: String, displaycolor: (u8, u8, u8, u8)) -> Self {
        Self { name, displaycolor }
    }
}

/// A property group a triangle corner can point into
#[derive(Debug, Clone, Copy)]
pub enum PropertyGroup<'a> {
    /// A `<colorgroup>`
    Colors(&'a ColorGroup),
    /// A `<basematerials>` group
    BaseMaterials(&'a BaseMaterialGroup),
}

impl PropertyGroup<'_> {
    /// Number of entries in the group
    pub fn len(&self) -> usize {
        match self {
            PropertyGroup::Colors(group) => group.colors.len(),
            PropertyGroup::BaseMaterials(group) => group.materials.len(),
        }
    }

    /// Check if the group has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Color of the entry at `index`
    pub fn color(&self, index: usize) -> Option<Color> {
        match self {
            PropertyGroup::Colors(group) => {
                group.colors.get(index).copied().map(Color::from_rgba_tuple)
            }
            PropertyGroup::BaseMaterials(group) => group
                .materials
                .get(index)
                .map(|m| Color::from_rgba_tuple(m.displaycolor)),
        }
    }
}
