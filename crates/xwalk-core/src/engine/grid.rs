use crate::core::models::collection::{AtomIndex, AtomList};
use crate::core::utils::geometry::BoundingBox;
use crate::engine::config::PATH_CLEARANCE_RADIUS;
use crate::engine::error::EngineError;
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Flat index of a cell within an [`OccupancyGrid`].
pub type CellIndex = usize;

/// One cubic cell of the occupancy grid.
///
/// Occupancy and clearance are fixed at construction and only change through
/// endpoint shell clearing; the visited/distance/back-pointer triple is
/// scratch state of the current search and is restored by a soft reset.
#[derive(Debug, Clone)]
pub struct GridCell {
    occupied: bool,
    /// Number of occupied cells within the path-clearance radius.
    clearance: u16,
    /// Endpoint pocket marker: clearance is waived so a search can enter and
    /// leave the cross-linked atoms.
    exempt: bool,
    visited: bool,
    distance: f64,
    prev: Option<CellIndex>,
}

impl GridCell {
    fn pristine() -> Self {
        Self {
            occupied: false,
            clearance: 0,
            exempt: false,
            visited: false,
            distance: f64::INFINITY,
            prev: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn prev(&self) -> Option<CellIndex> {
        self.prev
    }
}

/// Uniform cubic-cell decomposition of the molecular volume.
///
/// The grid is built once per structure (or once per source atom in local
/// mode) and reused across all pair searches on it. Occupancy marks every
/// cell whose centre lies within the solvent-inflated van der Waals sphere
/// of any atom; a precomputed clearance count per cell makes the
/// "path keeps [`PATH_CLEARANCE_RADIUS`] from the protein" test O(1).
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    origin: Point3<f64>,
    cell_size: f64,
    dims: [usize; 3],
    cells: Vec<GridCell>,
    /// Per atom-list index: every cell inside that atom's inflated sphere.
    /// Empty for atoms outside a local grid.
    atom_shells: Vec<Vec<CellIndex>>,
    /// Index offsets reaching all cells within the clearance radius.
    clearance_stencil: Vec<[i32; 3]>,
    /// Cells mutated by the current search, awaiting soft reset.
    touched: Vec<CellIndex>,
    /// Cells whose clearance is currently waived, awaiting closure.
    pockets: Vec<CellIndex>,
}

impl OccupancyGrid {
    /// Builds the full grid over the whole structure.
    ///
    /// The bounding box of all atom centres is expanded on every face by
    /// (max vdW radius + solvent radius + clearance radius + one cell): the
    /// first three terms keep every inflated sphere strictly inside the
    /// grid, the clearance term keeps the band a path needs when skirting
    /// the convex hull representable.
    pub fn build(
        atoms: &AtomList,
        cell_size: f64,
        solvent_radius: f64,
    ) -> Result<Self, EngineError> {
        let bbox = atoms.bounding_box().ok_or(EngineError::EmptyStructure)?;
        let margin =
            atoms.max_vdw_radius() + solvent_radius + PATH_CLEARANCE_RADIUS + cell_size;
        let mut grid = Self::allocate(bbox.expanded(margin), cell_size, atoms.len());

        for (idx, atom) in atoms.enumerate() {
            grid.occupy_sphere(idx, &atom.position, atom.vdw_radius + solvent_radius);
        }

        debug!(
            dims = ?grid.dims,
            occupied = grid.occupied_cell_count(),
            "Occupancy grid built."
        );
        Ok(grid)
    }

    /// Builds a local grid around one source atom.
    ///
    /// The gridded volume is the intersection of a cube centred on `center`
    /// with edge 2·(max_distance + 2·cell_size) and the full expanded box.
    /// Atoms whose inflated sphere lies wholly outside are skipped; their
    /// shells stay empty and targets among them resolve to no cell.
    pub fn build_local(
        atoms: &AtomList,
        center: &Point3<f64>,
        max_distance: f64,
        cell_size: f64,
        solvent_radius: f64,
    ) -> Result<Self, EngineError> {
        let bbox = atoms.bounding_box().ok_or(EngineError::EmptyStructure)?;
        let margin =
            atoms.max_vdw_radius() + solvent_radius + PATH_CLEARANCE_RADIUS + cell_size;
        let full = bbox.expanded(margin);

        let half = max_distance + 2.0 * cell_size;
        let reach = Vector3::new(half, half, half);
        let cube = BoundingBox {
            min: center - reach,
            max: center + reach,
        };
        let local = cube.intersection(&full).ok_or_else(|| {
            EngineError::Internal("local grid cube does not overlap the structure".to_string())
        })?;

        let mut grid = Self::allocate(local, cell_size, atoms.len());

        let mut skipped = 0usize;
        for (idx, atom) in atoms.enumerate() {
            let inflated = atom.vdw_radius + solvent_radius;
            if !local.expanded(inflated).contains(&atom.position) {
                skipped += 1;
                continue;
            }
            grid.occupy_sphere(idx, &atom.position, inflated);
        }

        debug!(
            dims = ?grid.dims,
            skipped_atoms = skipped,
            "Local occupancy grid built."
        );
        Ok(grid)
    }

    fn allocate(bbox: BoundingBox, cell_size: f64, atom_count: usize) -> Self {
        let extent = bbox.extent();
        let dims = [
            (extent.x / cell_size).ceil().max(1.0) as usize,
            (extent.y / cell_size).ceil().max(1.0) as usize,
            (extent.z / cell_size).ceil().max(1.0) as usize,
        ];
        let cells = vec![GridCell::pristine(); dims[0] * dims[1] * dims[2]];

        let reach = (PATH_CLEARANCE_RADIUS / cell_size).floor() as i32;
        let limit_sq = (PATH_CLEARANCE_RADIUS / cell_size).powi(2);
        let mut clearance_stencil = Vec::new();
        for dk in -reach..=reach {
            for dj in -reach..=reach {
                for di in -reach..=reach {
                    let norm_sq = (di * di + dj * dj + dk * dk) as f64;
                    if norm_sq <= limit_sq {
                        clearance_stencil.push([di, dj, dk]);
                    }
                }
            }
        }

        Self {
            origin: bbox.min,
            cell_size,
            dims,
            cells,
            atom_shells: vec![Vec::new(); atom_count],
            clearance_stencil,
            touched: Vec::new(),
            pockets: Vec::new(),
        }
    }

    // --- Index arithmetic -------------------------------------------------

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    fn flat(&self, i: usize, j: usize, k: usize) -> CellIndex {
        i + j * self.dims[0] + k * self.dims[0] * self.dims[1]
    }

    pub fn coords_of(&self, index: CellIndex) -> [usize; 3] {
        let nx = self.dims[0];
        let ny = self.dims[1];
        [index % nx, (index / nx) % ny, index / (nx * ny)]
    }

    /// Cell containing a world-space point, or `None` outside the grid.
    pub fn index_of(&self, point: &Point3<f64>) -> Option<CellIndex> {
        let mut coords = [0usize; 3];
        for d in 0..3 {
            let c = ((point[d] - self.origin[d]) / self.cell_size).floor();
            if c < 0.0 || c >= self.dims[d] as f64 {
                return None;
            }
            coords[d] = c as usize;
        }
        Some(self.flat(coords[0], coords[1], coords[2]))
    }

    /// Centre of a cell in world space.
    pub fn cell_center(&self, index: CellIndex) -> Point3<f64> {
        let [i, j, k] = self.coords_of(index);
        Point3::new(
            self.origin.x + (i as f64 + 0.5) * self.cell_size,
            self.origin.y + (j as f64 + 0.5) * self.cell_size,
            self.origin.z + (k as f64 + 0.5) * self.cell_size,
        )
    }

    /// Neighbouring cell at an index offset, or `None` across the boundary.
    pub fn offset_index(&self, index: CellIndex, offset: [i32; 3]) -> Option<CellIndex> {
        let [i, j, k] = self.coords_of(index);
        let coords = [
            i as i64 + offset[0] as i64,
            j as i64 + offset[1] as i64,
            k as i64 + offset[2] as i64,
        ];
        for d in 0..3 {
            if coords[d] < 0 || coords[d] >= self.dims[d] as i64 {
                return None;
            }
        }
        Some(self.flat(coords[0] as usize, coords[1] as usize, coords[2] as usize))
    }

    pub fn cell(&self, index: CellIndex) -> &GridCell {
        &self.cells[index]
    }

    // --- Occupancy and clearance -----------------------------------------

    fn occupy_sphere(&mut self, atom: AtomIndex, center: &Point3<f64>, radius: f64) {
        let radius_sq = radius * radius;
        let mut lo = [0i64; 3];
        let mut hi = [0i64; 3];
        for d in 0..3 {
            lo[d] = (((center[d] - radius) - self.origin[d]) / self.cell_size).floor() as i64;
            hi[d] = (((center[d] + radius) - self.origin[d]) / self.cell_size).floor() as i64;
            lo[d] = lo[d].max(0);
            hi[d] = hi[d].min(self.dims[d] as i64 - 1);
            if lo[d] > hi[d] {
                return;
            }
        }

        let mut shell = Vec::new();
        for k in lo[2]..=hi[2] {
            for j in lo[1]..=hi[1] {
                for i in lo[0]..=hi[0] {
                    let index = self.flat(i as usize, j as usize, k as usize);
                    let delta = self.cell_center(index) - center;
                    if delta.norm_squared() <= radius_sq {
                        shell.push(index);
                        if !self.cells[index].occupied {
                            self.occupy_cell(index);
                        }
                    }
                }
            }
        }
        self.atom_shells[atom] = shell;
    }

    fn occupy_cell(&mut self, index: CellIndex) {
        self.cells[index].occupied = true;
        self.adjust_clearance(index, 1);
    }

    fn clear_cell(&mut self, index: CellIndex) {
        self.cells[index].occupied = false;
        self.adjust_clearance(index, -1);
    }

    fn adjust_clearance(&mut self, index: CellIndex, delta: i32) {
        for n in 0..self.clearance_stencil.len() {
            let offset = self.clearance_stencil[n];
            if let Some(neighbor) = self.offset_index(index, offset) {
                let count = &mut self.cells[neighbor].clearance;
                *count = count.checked_add_signed(delta as i16).unwrap_or(0);
            }
        }
    }

    /// Cells within this atom's inflated sphere, as recorded at construction.
    pub fn atom_shell(&self, atom: AtomIndex) -> &[CellIndex] {
        &self.atom_shells[atom]
    }

    /// Un-occupies every cell of an atom's shell so a search can start or
    /// terminate inside it. Cells shared with other atoms are cleared too;
    /// [`Self::restore_atom_shell`] re-occupies the full shell afterwards.
    pub fn clear_atom_shell(&mut self, atom: AtomIndex) {
        let shell = self.atom_shells[atom].clone();
        for index in shell {
            if self.cells[index].occupied {
                self.clear_cell(index);
            }
        }
    }

    /// Re-occupies an atom's shell after its searches have finished.
    pub fn restore_atom_shell(&mut self, atom: AtomIndex) {
        let shell = self.atom_shells[atom].clone();
        for index in shell {
            if !self.cells[index].occupied {
                self.occupy_cell(index);
            }
        }
    }

    /// Waives the clearance constraint around an endpoint cell so the search
    /// can leave a site wedged against the rest of the structure.
    pub fn open_pocket(&mut self, center: CellIndex) {
        for n in 0..self.clearance_stencil.len() {
            let offset = self.clearance_stencil[n];
            if let Some(neighbor) = self.offset_index(center, offset) {
                if !self.cells[neighbor].exempt {
                    self.cells[neighbor].exempt = true;
                    self.pockets.push(neighbor);
                }
            }
        }
    }

    /// Re-arms the clearance constraint everywhere.
    pub fn close_pockets(&mut self) {
        while let Some(index) = self.pockets.pop() {
            self.cells[index].exempt = false;
        }
    }

    /// Whether a path may pass through this cell: unoccupied, and either
    /// clear of the protein or inside an endpoint pocket.
    pub fn is_walkable(&self, index: CellIndex) -> bool {
        let cell = &self.cells[index];
        !cell.occupied && (cell.clearance == 0 || cell.exempt)
    }

    pub fn occupied_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupied).count()
    }

    // --- Search scratch state --------------------------------------------

    /// Records a relaxation: the cell is reached at `distance` through
    /// `prev`. First touch of a cell is logged for the soft reset.
    pub(crate) fn visit(&mut self, index: CellIndex, distance: f64, prev: Option<CellIndex>) {
        let cell = &mut self.cells[index];
        if !cell.visited {
            cell.visited = true;
            self.touched.push(index);
        }
        cell.distance = distance;
        cell.prev = prev;
    }

    /// Restores every cell mutated by the previous search. Cost is
    /// proportional to the number of cells explored, not the grid size.
    pub fn soft_reset(&mut self) {
        while let Some(index) = self.touched.pop() {
            let cell = &mut self.cells[index];
            cell.visited = false;
            cell.distance = f64::INFINITY;
            cell.prev = None;
        }
    }

    /// Whether the straight segment between two points crosses only
    /// unoccupied cells. Samples at half-cell resolution; leaving the grid
    /// counts as obstructed. Clearance is deliberately not tested: the
    /// sweep answers whether Euclidean and surface distance coincide.
    pub fn line_unobstructed(&self, from: &Point3<f64>, to: &Point3<f64>) -> bool {
        let delta = to - from;
        let length = delta.norm();
        let steps = ((length / (self.cell_size * 0.5)).ceil() as usize).max(1);
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let sample = from + delta * t;
            match self.index_of(&sample) {
                Some(index) => {
                    if self.cells[index].occupied {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}
