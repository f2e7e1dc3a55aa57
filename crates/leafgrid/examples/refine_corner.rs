//! Refines a grid towards the lower left corner of the unit square,
//! one level per sweep, and prints the resulting leaf grid.

extern crate nalgebra as na;

use cartgrid::GridTopology;
use leafgrid::{LeafGridInfo, RefineMask};

fn main() -> Result<(), leafgrid::LeafGridError> {
  tracing_subscriber::fmt::init();

  let nlevels = 4;
  let mut grid = LeafGridInfo::new([4, 4], [1.0, 1.0], nlevels).compute_leaf_grid()?;

  for sweep in 1..nlevels {
    // cells within distance $2^(-sweep)$ of the corner
    let radius = 0.5f64.powi(sweep as i32);
    let flags = grid
      .cell_centers()
      .column_iter()
      .map(|c| c.norm() < radius)
      .collect();
    grid.refine_cells(&RefineMask::from_flags(flags))?;

    println!(
      "sweep {sweep}: {} cells, {} faces, {} nodes, cells per level {:?}",
      grid.num_cells(),
      grid.num_faces(),
      grid.num_nodes(),
      grid.num_cells_per_level()
    );
  }

  let volume: f64 = grid.cell_volumes().sum();
  let perimeter: f64 = grid
    .boundary_faces()
    .into_iter()
    .map(|iface| grid.face_areas()[iface])
    .sum();
  println!("total volume {volume:.3}, boundary length {perimeter:.3}");

  let finest = na::DVector::from_iterator(
    grid.num_cells(),
    grid.cell_level().iter().map(|&l| (l == nlevels - 1) as u8 as f64),
  );
  println!("finest cells cover an area of {:.4}", finest.dot(grid.cell_volumes()));
  Ok(())
}
