use crate::{hierarchy::GridHierarchy, projection::Entity, region::RegionMap};

use common::sparse::IncidenceMatrix;

/// Cumulative projections from the active entities onto every level grid.
///
/// Slot `level` of an entity kind has shape `(nentities(level), nactive)`.
/// Entry $(e, a)$ is one iff level entity $e$ lies in (cells, faces) or
/// coincides with (nodes) the active entity $a$, and $a$ lives on a level
/// no finer than `level`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionStack {
  cells: Vec<IncidenceMatrix>,
  faces: Vec<IncidenceMatrix>,
  nodes: Vec<IncidenceMatrix>,
}

impl ProjectionStack {
  /// Stack of a leaf grid that is exactly level 0.
  ///
  /// Slot 0 is the identity, every further slot is the previous one
  /// pushed through the single-level projection.
  pub fn new(hierarchy: &GridHierarchy) -> Self {
    let build = |entity: Entity| {
      let mut slots = vec![IncidenceMatrix::identity(hierarchy.nentities(entity, 0))];
      for level in 0..hierarchy.finest_level() {
        let next = hierarchy.projection(entity, level) * &slots[level];
        slots.push(next);
      }
      slots
    };
    Self {
      cells: build(Entity::Cell),
      faces: build(Entity::Face),
      nodes: build(Entity::Node),
    }
  }

  /// Rebuilds all slots after the active entities changed.
  pub fn from_region_maps(
    hierarchy: &GridHierarchy,
    cells: &RegionMap,
    faces: &RegionMap,
    nodes: &RegionMap,
  ) -> Self {
    let build = |entity: Entity, map: &RegionMap| {
      let mut slots = vec![map.level(0).clone()];
      for level in 1..hierarchy.nlevels() {
        let inherited = hierarchy.projection(entity, level - 1) * &slots[level - 1];
        slots.push(&inherited + map.level(level));
      }
      slots
    };
    Self {
      cells: build(Entity::Cell, cells),
      faces: build(Entity::Face, faces),
      nodes: build(Entity::Node, nodes),
    }
  }

  pub fn nlevels(&self) -> usize {
    self.cells.len()
  }
  pub fn get(&self, entity: Entity, level: usize) -> &IncidenceMatrix {
    match entity {
      Entity::Cell => &self.cells[level],
      Entity::Face => &self.faces[level],
      Entity::Node => &self.nodes[level],
    }
  }
  pub fn cells(&self, level: usize) -> &IncidenceMatrix {
    &self.cells[level]
  }
  pub fn faces(&self, level: usize) -> &IncidenceMatrix {
    &self.faces[level]
  }
  pub fn nodes(&self, level: usize) -> &IncidenceMatrix {
    &self.nodes[level]
  }
}
