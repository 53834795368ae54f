//! Uniform spatial subdivision tree
//!
//! Divides a fixed world domain into equally-sized cells, eight children per
//! level, built eagerly to a configured depth. Works best when volumes are
//! spread roughly uniformly through the domain; the trade-off is a memory
//! footprint proportional to `8^depth`.
//!
//! Each volume lives in the smallest cell that fully contains it, so a volume
//! straddling a cell boundary stays in the parent and is never duplicated
//! downward. Cells keep a cumulative count of volumes in their subtree, which
//! lets queries skip empty branches without visiting them.

use slotmap::SecondaryMap;

use crate::foundation::math::Vec3;
use crate::scene::volume::{Aabb, Bounds, QueryVolume};
use crate::scene::ComponentId;
use crate::spatial::VolumeHierarchy;

/// Configuration for the uniform tree
#[derive(Debug, Clone)]
pub struct UniformTreeConfig {
    /// World region the tree subdivides
    pub domain: Aabb,

    /// Number of 8-way subdivision levels below the root
    pub depth: u32,
}

impl Default for UniformTreeConfig {
    fn default() -> Self {
        Self {
            domain: Aabb::from_center_extents(Vec3::zeros(), Vec3::new(512.0, 512.0, 512.0)),
            depth: 3,
        }
    }
}

/// Index of a cell in the tree's cell arena.
type CellIndex = usize;

const ROOT: CellIndex = 0;

struct Cell {
    region: Aabb,
    parent: Option<CellIndex>,
    children: Option<[CellIndex; 8]>,

    // Volumes whose bound fits in this cell but in none of its children.
    volumes: Vec<ComponentId>,

    // Volumes stored in this cell or anywhere below it. Queries prune
    // subtrees with a zero count.
    subtree_count: usize,
}

struct VolumeRecord {
    cell: CellIndex,
    bounds: Bounds,
}

/// Uniform-subdivision implementation of [`VolumeHierarchy`].
///
/// Cells live in a flat arena indexed by `usize`; parent/child links are
/// indices, so the structure owns no cyclic references and relocation is an
/// index update.
pub struct UniformTree {
    cells: Vec<Cell>,
    records: SecondaryMap<ComponentId, VolumeRecord>,
}

impl Default for UniformTree {
    fn default() -> Self {
        Self::new(UniformTreeConfig::default())
    }
}

impl UniformTree {
    /// Build the full cell arena for the configured domain and depth.
    pub fn new(config: UniformTreeConfig) -> Self {
        let mut cells = Vec::new();
        build_cell(&mut cells, config.domain, config.depth, None);

        log::debug!(
            "uniform tree built: {} cells, depth {}",
            cells.len(),
            config.depth
        );

        Self {
            cells,
            records: SecondaryMap::new(),
        }
    }

    /// World region covered by the tree
    pub fn domain(&self) -> &Aabb {
        &self.cells[ROOT].region
    }

    /// Smallest cell fully containing `bounds`.
    ///
    /// Descends while a child encloses the bound entirely; children tile the
    /// parent, so at most one child can. Bounds exceeding the root domain
    /// stay at the root.
    fn find_cell(&self, bounds: &Bounds) -> CellIndex {
        let mut current = ROOT;

        'descend: while let Some(children) = self.cells[current].children {
            for child in children {
                if bounds.fits_inside(&self.cells[child].region) {
                    current = child;
                    continue 'descend;
                }
            }
            break;
        }

        current
    }

    fn place(&mut self, id: ComponentId, cell: CellIndex) {
        self.cells[cell].volumes.push(id);

        let mut walk = Some(cell);
        while let Some(index) = walk {
            self.cells[index].subtree_count += 1;
            walk = self.cells[index].parent;
        }
    }

    fn displace(&mut self, id: ComponentId, cell: CellIndex) {
        let volumes = &mut self.cells[cell].volumes;
        let position = volumes
            .iter()
            .position(|stored| *stored == id)
            .expect("volume record points at a cell that does not hold it");
        volumes.swap_remove(position);

        let mut walk = Some(cell);
        while let Some(index) = walk {
            self.cells[index].subtree_count -= 1;
            walk = self.cells[index].parent;
        }
    }

    fn collect(&self, index: CellIndex, query: &QueryVolume, results: &mut Vec<ComponentId>) {
        let cell = &self.cells[index];

        if cell.subtree_count == 0 {
            return;
        }

        // The region filter is conservative below the root, where a cell
        // fully encloses everything it stores. The root is the exception:
        // it also holds volumes bigger than the domain or outside it, so
        // its region says nothing about its contents.
        if index != ROOT && !query.intersects_region(&cell.region) {
            return;
        }

        for id in &cell.volumes {
            if query.intersects_bounds(&self.records[*id].bounds) {
                results.push(*id);
            }
        }

        if let Some(children) = cell.children {
            for child in children {
                self.collect(child, query, results);
            }
        }
    }
}

impl VolumeHierarchy for UniformTree {
    fn add_volume(&mut self, id: ComponentId, bounds: Bounds) {
        let cell = self.find_cell(&bounds);

        assert!(
            self.records
                .insert(id, VolumeRecord { cell, bounds })
                .is_none(),
            "volume registered twice in hierarchy"
        );

        self.place(id, cell);
    }

    fn remove_volume(&mut self, id: ComponentId) {
        let record = self
            .records
            .remove(id)
            .expect("removing a volume that is not registered");

        self.displace(id, record.cell);
    }

    fn update_volume(&mut self, id: ComponentId, bounds: Bounds) {
        let new_cell = self.find_cell(&bounds);

        let record = self
            .records
            .get_mut(id)
            .expect("updating a volume that is not registered");

        let old_cell = record.cell;
        record.bounds = bounds;
        record.cell = new_cell;

        if old_cell != new_cell {
            self.displace(id, old_cell);
            self.place(id, new_cell);
        }
    }

    fn intersections(&self, query: &QueryVolume) -> Vec<ComponentId> {
        let mut results = Vec::new();
        self.collect(ROOT, query, &mut results);
        results
    }

    fn volume_count(&self) -> usize {
        self.records.len()
    }

    fn clear(&mut self) {
        self.records.clear();
        for cell in &mut self.cells {
            cell.volumes.clear();
            cell.subtree_count = 0;
        }
    }
}

/// Recursively append a cell and its subtree to the arena, returning the
/// cell's index.
fn build_cell(
    cells: &mut Vec<Cell>,
    region: Aabb,
    levels_left: u32,
    parent: Option<CellIndex>,
) -> CellIndex {
    let index = cells.len();
    cells.push(Cell {
        region,
        parent,
        children: None,
        volumes: Vec::new(),
        subtree_count: 0,
    });

    if levels_left > 0 {
        let center = region.center();
        let quarter = region.extents() * 0.5;

        let mut children = [0; 8];
        for (octant, slot) in children.iter_mut().enumerate() {
            let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };

            let child_center = Vec3::new(
                center.x + quarter.x * sign(1),
                center.y + quarter.y * sign(2),
                center.z + quarter.z * sign(4),
            );

            *slot = build_cell(
                cells,
                Aabb::from_center_extents(child_center, quarter),
                levels_left - 1,
                Some(index),
            );
        }

        cells[index].children = Some(children);
    }

    index
}
