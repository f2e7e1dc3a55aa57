extern crate nalgebra as na;

use approx::assert_relative_eq;
use cartgrid::GridTopology;
use leafgrid::{assemble, Entity, LeafGrid, LeafGridError, LeafGridInfo, RefineMask};

fn corner_grid() -> LeafGrid {
  let mut grid = LeafGridInfo::new([2, 2], [1.0, 1.0], 2)
    .compute_leaf_grid()
    .unwrap();
  let mask = RefineMask::from_indices(&[0], grid.num_cells()).unwrap();
  grid.refine_cells(&mask).unwrap();
  grid
}

/// Three levels with all of them in use after a single cascading call.
fn cascaded_grid() -> LeafGrid {
  let mut grid = LeafGridInfo::new([2, 2], [1.0, 1.0], 3)
    .compute_leaf_grid()
    .unwrap();
  grid
    .refine_cells(&RefineMask::from_indices(&[0], 4).unwrap())
    .unwrap();
  assert_eq!(grid.num_cells_per_level(), vec![3, 4, 0]);

  // the second coarse survivor and the first fine cell
  let mask = RefineMask::from_indices(&[1, 3], grid.num_cells()).unwrap();
  grid.refine_cells(&mask).unwrap();
  grid
}

/// Oriented normals of every cell sum to zero, unoriented areas to the
/// perimeter of its level.
fn assert_cells_closed(grid: &LeafGrid) {
  let faces_of_cells = grid.cell_faces().transpose();
  for (icell, &level) in grid.cell_level().iter().enumerate() {
    let spacing = grid.level_grid(level).unwrap().info().spacing();

    let mut normal_sum = na::DVector::<f64>::zeros(2);
    let mut perimeter = 0.0;
    for (iface, sign) in faces_of_cells.row(icell) {
      normal_sum += grid.face_normals().column(iface) * sign as f64;
      perimeter += grid.face_areas()[iface];
    }
    assert!(normal_sum.norm() < 1e-12, "cell {icell} is not closed");
    assert_relative_eq!(perimeter, 2.0 * (spacing.x + spacing.y), epsilon = 1e-12);
    assert_relative_eq!(grid.cell_volumes()[icell], spacing.x * spacing.y, epsilon = 1e-12);
  }
  assert_relative_eq!(grid.cell_volumes().sum(), 1.0, epsilon = 1e-12);
}

fn assert_faces_consistent(grid: &LeafGrid) {
  for iface in 0..grid.num_faces() {
    let mut signs: Vec<i32> = grid.cell_faces().row(iface).map(|(_, s)| s).collect();
    signs.sort();
    let center = grid.face_centers().column(iface);
    match signs.as_slice() {
      [-1, 1] => {}
      [_] => {
        let on_boundary = center.iter().any(|&x| x.abs() < 1e-12 || (x - 1.0).abs() < 1e-12);
        assert!(on_boundary, "face {iface} has one cell but is interior");
      }
      _ => panic!("face {iface} has cells {signs:?}"),
    }

    let nodes: Vec<_> = grid.face_nodes().transpose().row(iface).collect();
    assert_eq!(nodes.len(), 2, "face {iface} does not have two nodes");
    let midpoint = (grid.nodes().column(nodes[0].0) + grid.nodes().column(nodes[1].0)) / 2.0;
    assert!((midpoint - center).norm() < 1e-12);
  }
}

fn euler_characteristic(grid: &LeafGrid) -> isize {
  grid.num_nodes() as isize - grid.num_faces() as isize + grid.num_cells() as isize
}

#[test]
fn refined_corner() {
  let grid = corner_grid();
  assert_eq!(grid.num_cells(), 7);
  assert_eq!(grid.cell_level(), &[0, 0, 0, 1, 1, 1, 1]);
  assert_eq!(grid.num_faces(), 20);
  assert_eq!(grid.num_nodes(), 14);
  assert_eq!(grid.boundary_faces().len(), 10);
  assert_eq!(euler_characteristic(&grid), 1);

  // coarse survivors first, in level grid order
  assert_relative_eq!(grid.cell_centers()[(0, 0)], 0.75);
  assert_relative_eq!(grid.cell_centers()[(1, 0)], 0.25);
  assert_relative_eq!(grid.cell_centers()[(0, 3)], 0.125);
  assert_relative_eq!(grid.cell_centers()[(1, 3)], 0.125);

  // the east neighbour of the refined cell has a hanging node
  let cell_nodes = grid.cell_nodes();
  assert_eq!(cell_nodes.col_nnz(), vec![5, 5, 4, 4, 4, 4, 4]);

  assert_cells_closed(&grid);
  assert_faces_consistent(&grid);
}

#[test]
fn cascading_refinement() {
  let grid = cascaded_grid();
  assert_eq!(grid.num_cells_per_level(), vec![2, 7, 4]);
  assert_eq!(grid.num_cells(), 13);
  assert_eq!(
    grid.cell_level(),
    &[0, 0, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2]
  );
  assert_eq!(euler_characteristic(&grid), 1);
  assert_cells_closed(&grid);
  assert_faces_consistent(&grid);
}

#[test]
fn coarse_cell_next_to_twice_refined_cells() {
  let mut grid = LeafGridInfo::new([2, 2], [1.0, 1.0], 3)
    .compute_leaf_grid()
    .unwrap();
  grid
    .refine_level(0, &RefineMask::from_indices(&[0], 4).unwrap())
    .unwrap();
  // fine cell (1, 0), the lower west neighbour of coarse cell 1
  grid
    .refine_level(1, &RefineMask::from_indices(&[4], 7).unwrap())
    .unwrap();

  assert_eq!(grid.num_cells_per_level(), vec![3, 3, 4]);
  assert_eq!(grid.cell_level(), &[0, 0, 0, 1, 1, 1, 2, 2, 2, 2]);

  // west side of coarse cell 1: two quarter faces and one half face
  assert_eq!(grid.cell_faces().col_nnz()[0], 6);
  assert_eq!(grid.cell_nodes().col_nnz()[0], 6);

  assert_eq!(euler_characteristic(&grid), 1);
  assert_cells_closed(&grid);
  assert_faces_consistent(&grid);
}

#[test]
fn level_tags_match_projections() {
  let grid = cascaded_grid();
  let stack = grid.projections();
  let finest = grid.nlevels() - 1;

  // every finest cell lies in exactly one active cell
  assert!(stack.cells(finest).row_nnz().iter().all(|&n| n == 1));
  let descendants = stack.cells(finest).col_nnz();
  for (icell, &level) in grid.cell_level().iter().enumerate() {
    assert_eq!(descendants[icell], 4usize.pow((finest - level) as u32));
    assert_eq!(stack.cells(level).col_nnz()[icell], 1);
    for coarser in 0..level {
      assert_eq!(stack.cells(coarser).col_nnz()[icell], 0);
    }
  }

  // active faces and nodes appear on their own level
  for entity in [Entity::Face, Entity::Node] {
    let n = match entity {
      Entity::Face => grid.num_faces(),
      _ => grid.num_nodes(),
    };
    assert!(stack.get(entity, finest).col_nnz().iter().all(|&c| c >= 1));
    assert_eq!(stack.get(entity, finest).ncols(), n);
  }
}

#[test]
fn empty_mask_changes_nothing() {
  let mut grid = corner_grid();
  let before = grid.clone();

  grid.refine_cells(&RefineMask::none(7)).unwrap();
  grid.refine_level(0, &RefineMask::none(7)).unwrap();
  // flags on level 1 cells cannot be refined on a two level grid
  grid
    .refine_cells(&RefineMask::from_indices(&[3, 6], 7).unwrap())
    .unwrap();

  assert_eq!(grid.cell_faces(), before.cell_faces());
  assert_eq!(grid.face_nodes(), before.face_nodes());
  assert_eq!(grid.nodes(), before.nodes());
  assert_eq!(grid.cell_centers(), before.cell_centers());
  assert_eq!(grid.face_centers(), before.face_centers());
  assert_eq!(grid.face_normals(), before.face_normals());
  assert_eq!(grid.cell_level(), before.cell_level());
  assert_eq!(grid.projections(), before.projections());
}

#[test]
fn refining_everything_gives_next_level() {
  let mut grid = LeafGridInfo::new_unit_cells([3, 2], 2)
    .compute_leaf_grid()
    .unwrap();
  grid.refine_level(0, &RefineMask::all(6)).unwrap();

  let level1 = grid.level_grid(1).unwrap();
  assert_eq!(grid.cell_faces(), level1.cell_faces());
  assert_eq!(grid.face_nodes(), level1.face_nodes());
  assert_eq!(grid.face_normals(), level1.face_normals());
  assert_eq!(grid.cell_level(), &[1; 24]);
}

#[test]
fn fresh_projections_compose() {
  let grid = LeafGridInfo::new_unit_cells([2, 2], 3)
    .compute_leaf_grid()
    .unwrap();
  let stack = grid.projections();
  for level in 0..2 {
    let cells = grid.cell_proj_level(level, level + 1).unwrap();
    let faces = grid.face_proj_level(level, level + 1).unwrap();
    let nodes = grid.node_proj_level(level, level + 1).unwrap();
    assert_eq!(stack.cells(level + 1), &(&cells * stack.cells(level)));
    assert_eq!(stack.faces(level + 1), &(&faces * stack.faces(level)));
    assert_eq!(stack.nodes(level + 1), &(&nodes * stack.nodes(level)));
  }

  let proj = grid.cell_proj_level(0, 1).unwrap();
  assert_eq!(proj.shape(), (16, 4));
  assert!(proj.col_nnz().iter().all(|&n| n == 4));
  assert_eq!(
    grid.cell_proj_level(0, 2),
    Err(LeafGridError::InvalidLevelGap {
      level0: 0,
      level1: 2
    })
  );
}

#[test]
fn bad_masks_are_rejected() {
  let mut grid = corner_grid();
  assert_eq!(
    RefineMask::from_indices(&[7], grid.num_cells()),
    Err(LeafGridError::CellOutOfRange {
      cell: 7,
      num_cells: 7
    })
  );
  assert_eq!(
    grid.refine_cells(&RefineMask::all(4)),
    Err(LeafGridError::InconsistentMask {
      len: 4,
      num_cells: 7
    })
  );
  assert_eq!(grid.num_cells(), 7);
}

#[test]
fn reassembly_reproduces_state() {
  let grid = cascaded_grid();
  let state = assemble(grid.hierarchy(), grid.active_cells().clone()).unwrap();
  assert_eq!(state.cell_faces(), grid.cell_faces());
  assert_eq!(state.face_nodes(), grid.face_nodes());
  assert_eq!(state.cell_level(), grid.cell_level());
}
