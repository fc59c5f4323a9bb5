//! Mesh data structures

mod core;
mod material;

pub use core::{Color, Mesh, Model, Object, Resources, Triangle, TriangleMesh, Vertex};
pub use material::{BaseMaterial, BaseMaterialGroup, ColorGroup, PropertyGroup};

impl Resources {
    /// Look up a color group or base material group by ID
    ///
    /// Color groups and base material groups share one ID space in 3MF, so
    /// at most one of them matches.
    pub fn property_group(&self, id: usize) -> Option<PropertyGroup<'_>> {
        if let Some(group) = self.color_groups.iter().find(|g| g.id == id) {
            return Some(PropertyGroup::Colors(group));
        }
        self.base_material_groups
            .iter()
            .find(|g| g.id == id)
            .map(PropertyGroup::BaseMaterials)
    }
}
