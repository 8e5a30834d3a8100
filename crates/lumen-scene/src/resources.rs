//! Owner of every geometry and material in the scene.

use crate::arena::{Arena, Handle};
use crate::geometry::Geometry;
use crate::material::Material;

/// A geometry paired with the material it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mesh {
    pub geometry: Handle<Geometry>,
    pub material: Handle<Material>,
}

/// Live resource counts, compared against expectations in leak checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceCounts {
    pub geometries: usize,
    pub materials: usize,
}

impl ResourceCounts {
    pub fn total(self) -> usize {
        self.geometries + self.materials
    }
}

/// Arena-backed storage for mesh resources.
///
/// Meshes are created and released only through [`ResourceArena::create_mesh`]
/// and [`ResourceArena::dispose_mesh`].
#[derive(Default)]
pub struct ResourceArena {
    geometries: Arena<Geometry>,
    materials: Arena<Material>,
    meshes_created: u64,
    meshes_disposed: u64,
}

impl ResourceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_mesh(&mut self, geometry: Geometry, material: Material) -> Mesh {
        self.meshes_created += 1;
        Mesh {
            geometry: self.geometries.insert(geometry),
            material: self.materials.insert(material),
        }
    }

    /// Release both halves of a mesh. Returns `false` if either was already gone.
    pub fn dispose_mesh(&mut self, mesh: Mesh) -> bool {
        let geometry = self.geometries.remove(mesh.geometry).is_some();
        let material = self.materials.remove(mesh.material).is_some();
        if geometry || material {
            self.meshes_disposed += 1;
        }
        geometry && material
    }

    pub fn geometry(&self, handle: Handle<Geometry>) -> Option<&Geometry> {
        self.geometries.get(handle)
    }

    pub fn material(&self, handle: Handle<Material>) -> Option<&Material> {
        self.materials.get(handle)
    }

    pub fn material_mut(&mut self, handle: Handle<Material>) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    /// True when both halves of the mesh still resolve.
    pub fn is_live(&self, mesh: Mesh) -> bool {
        self.geometries.contains(mesh.geometry) && self.materials.contains(mesh.material)
    }

    pub fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
        }
    }

    /// Meshes created and disposed since construction.
    pub fn lifetime_totals(&self) -> (u64, u64) {
        (self.meshes_created, self.meshes_disposed)
    }

    /// Drop everything, invalidating all outstanding handles.
    pub fn clear(&mut self) {
        let live = self.geometries.len() as u64;
        self.meshes_disposed += live;
        self.geometries.clear();
        self.materials.clear();
    }
}
