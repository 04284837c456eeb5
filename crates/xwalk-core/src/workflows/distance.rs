use crate::core::io::pdb::MAX_COORDINATE;
use crate::core::models::collection::{AtomIndex, AtomList};
use crate::core::params;
use crate::core::utils::identifiers::is_backbone_atom;
use crate::engine::config::{DistanceConfig, MAX_PROTEIN_DIMENSION, RES_SEQ_RANGE};
use crate::engine::error::{EngineError, PairFailure};
use crate::engine::grid::OccupancyGrid;
use crate::engine::pairs::{self, CandidatePair};
use crate::engine::progress::{CancelToken, Progress, ProgressReporter};
use crate::engine::search;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One emitted distance measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRecord {
    /// 1-based position in the output, assigned after all sources finish.
    pub index: usize,
    pub source: AtomIndex,
    pub target: AtomIndex,
    /// Straight-line distance in Å.
    pub euclidean: f64,
    /// Solvent-accessible surface distance in Å; `None` when the pair is
    /// unreachable within the bound or failed per-pair validation.
    pub sasd: Option<f64>,
    /// Per-pair failure, if any. Unreachable-within-bound is not a failure.
    pub failure: Option<PairFailure>,
}

/// Computes the SASD of every admitted candidate pair of `atoms`.
///
/// The occupancy grid is built once and reused across all sources; in local
/// mode (forced by configuration, or automatic once the structure exceeds
/// [`MAX_PROTEIN_DIMENSION`]) it is rebuilt around each source instead.
/// Cancellation is cooperative: the token is polled between sources and
/// between targets, and a cancelled run returns the records finished so far.
#[instrument(skip_all, name = "distance_workflow")]
pub fn run(
    atoms: &mut AtomList,
    config: &DistanceConfig,
    reporter: &ProgressReporter,
    cancel: &CancelToken,
) -> Result<Vec<DistanceRecord>, EngineError> {
    // --- Phase 1: Setup ---
    reporter.report(Progress::PhaseStart { name: "Setup" });
    config.validate()?;
    validate_atoms(atoms)?;
    params::assign_radii(atoms, config.radius_set);
    let candidates = pairs::enumerate(atoms, config);
    reporter.report(Progress::PhaseFinish);

    if candidates.is_empty() {
        info!("No candidate pairs match the pair specification.");
        return Ok(Vec::new());
    }

    // --- Phase 2: Grid construction ---
    reporter.report(Progress::PhaseStart {
        name: "Grid Construction",
    });
    let (grid_atoms, shell_map) = gridded_atoms(atoms, config.backbone_only);
    let bbox = grid_atoms
        .bounding_box()
        .ok_or(EngineError::EmptyStructure)?;
    let local = config.local_grid || bbox.max_dimension() > MAX_PROTEIN_DIMENSION;
    if local {
        info!(
            max_dimension = bbox.max_dimension(),
            "Using per-source local grids."
        );
    }
    let max_distance = config.effective_max_distance();
    let base_grid = if local {
        None
    } else {
        Some(OccupancyGrid::build(
            &grid_atoms,
            config.grid_cell_size,
            config.solvent_radius,
        )?)
    };
    reporter.report(Progress::PhaseFinish);

    // --- Phase 3: Distance calculation, one search per source ---
    reporter.report(Progress::PhaseStart {
        name: "Distance Calculation",
    });
    let grouped = candidates.into_iter().chunk_by(|pair| pair.source);
    let groups: Vec<(AtomIndex, Vec<CandidatePair>)> = grouped
        .into_iter()
        .map(|(source, group)| (source, group.collect()))
        .collect();
    reporter.report(Progress::TaskStart {
        total: groups.len() as u64,
    });

    let per_source = |(source, group): &(AtomIndex, Vec<CandidatePair>)| -> Result<Vec<DistanceRecord>, EngineError> {
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }
        let mut grid = match &base_grid {
            Some(grid) => grid.clone(),
            None => {
                let center = atoms
                    .get(*source)
                    .expect("candidate index out of range")
                    .position;
                OccupancyGrid::build_local(
                    &grid_atoms,
                    &center,
                    max_distance,
                    config.grid_cell_size,
                    config.solvent_radius,
                )?
            }
        };
        let records = process_source(&mut grid, atoms, &shell_map, *source, group, max_distance, cancel);
        reporter.report(Progress::TaskIncrement { amount: 1 });
        Ok(records)
    };

    // With a single shared grid the sequential path avoids the per-source
    // clone; each worker of the parallel path owns a private snapshot over
    // the same immutable atom list.
    #[cfg(not(feature = "parallel"))]
    let outcome: Result<Vec<Vec<DistanceRecord>>, EngineError> = match &base_grid {
        Some(_) => {
            let mut grid = base_grid.clone().expect("full grid present");
            groups
                .iter()
                .map(|(source, group)| {
                    if cancel.is_cancelled() {
                        return Ok(Vec::new());
                    }
                    let records =
                        process_source(&mut grid, atoms, &shell_map, *source, group, max_distance, cancel);
                    reporter.report(Progress::TaskIncrement { amount: 1 });
                    Ok(records)
                })
                .collect()
        }
        None => groups.iter().map(per_source).collect(),
    };

    #[cfg(feature = "parallel")]
    let outcome: Result<Vec<Vec<DistanceRecord>>, EngineError> =
        groups.par_iter().map(per_source).collect();

    let mut records: Vec<DistanceRecord> = outcome?.into_iter().flatten().collect();
    for (position, record) in records.iter_mut().enumerate() {
        record.index = position + 1;
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    if cancel.is_cancelled() {
        warn!(
            finished = records.len(),
            "Run cancelled; returning partial results."
        );
    }
    let reachable = records.iter().filter(|r| r.sasd.is_some()).count();
    info!(
        pairs = records.len(),
        reachable,
        "Distance calculation complete."
    );
    Ok(records)
}

/// Rejects atoms the engine cannot place on any grid.
fn validate_atoms(atoms: &AtomList) -> Result<(), EngineError> {
    for atom in atoms {
        let p = &atom.position;
        if p.x.abs() > MAX_COORDINATE || p.y.abs() > MAX_COORDINATE || p.z.abs() > MAX_COORDINATE {
            return Err(EngineError::Input(format!(
                "atom {} has coordinates outside ±{} Å",
                atom.descriptor(),
                MAX_COORDINATE
            )));
        }
        if !RES_SEQ_RANGE.contains(&atom.res_seq) {
            return Err(EngineError::Input(format!(
                "atom {} has a residue number outside [-999, 9999]",
                atom.descriptor()
            )));
        }
    }
    Ok(())
}

/// The atom list the grid is built from, plus the map from candidate-atom
/// indices to grid-atom indices (used for shell clearing). In backbone-only
/// mode non-backbone atoms contribute no occupancy, so candidates among them
/// have no shell to clear.
fn gridded_atoms(atoms: &AtomList, backbone_only: bool) -> (AtomList, Vec<Option<AtomIndex>>) {
    if !backbone_only {
        return (atoms.clone(), (0..atoms.len()).map(Some).collect());
    }
    let mut filtered = AtomList::new();
    let mut map = vec![None; atoms.len()];
    for (index, atom) in atoms.enumerate() {
        if is_backbone_atom(&atom.name) {
            map[index] = Some(filtered.push(atom.clone()));
        }
    }
    (filtered, map)
}

/// Runs all measurements that share one source atom on a prepared grid.
///
/// Endpoint shells are cleared and their clearance pockets opened before the
/// search; afterwards the grid is restored for the next source. Records come
/// back in target order with `index` unset.
fn process_source(
    grid: &mut OccupancyGrid,
    atoms: &AtomList,
    shell_map: &[Option<AtomIndex>],
    source: AtomIndex,
    group: &[CandidatePair],
    max_distance: f64,
    cancel: &CancelToken,
) -> Vec<DistanceRecord> {
    let source_atom = atoms.get(source).expect("candidate index out of range");
    let record = |pair: &CandidatePair, sasd: Option<f64>, failure: Option<PairFailure>| {
        DistanceRecord {
            index: 0,
            source: pair.source,
            target: pair.target,
            euclidean: pair.euclidean,
            sasd,
            failure,
        }
    };

    // A source outside the (local) grid fails every pair of the group.
    let Some(source_cell) = grid.index_of(&source_atom.position) else {
        debug!(source = %source_atom.descriptor(), "Source outside the grid.");
        return group
            .iter()
            .map(|pair| record(pair, None, Some(PairFailure::OutsideGrid)))
            .collect();
    };

    let mut cleared = Vec::with_capacity(group.len() + 1);
    let clear_shell = |grid: &mut OccupancyGrid, atom: AtomIndex, cleared: &mut Vec<AtomIndex>| {
        if let Some(grid_index) = shell_map[atom] {
            grid.clear_atom_shell(grid_index);
            cleared.push(grid_index);
        }
    };
    clear_shell(grid, source, &mut cleared);
    for pair in group {
        clear_shell(grid, pair.target, &mut cleared);
    }
    grid.open_pocket(source_cell);

    let mut records = Vec::with_capacity(group.len());
    let mut searched: Vec<(usize, crate::engine::grid::CellIndex)> = Vec::new();

    if grid.cell(source_cell).is_occupied() {
        // Another atom overlaps the source even with its own shell cleared.
        warn!(source = %source_atom.descriptor(), "Source cell occupied by a foreign atom.");
        records.extend(
            group
                .iter()
                .map(|pair| record(pair, None, Some(PairFailure::ShellConflict))),
        );
    } else {
        for pair in group {
            if cancel.is_cancelled() {
                break;
            }
            let target_atom = atoms.get(pair.target).expect("candidate index out of range");
            let Some(target_cell) = grid.index_of(&target_atom.position) else {
                debug!(target = %target_atom.descriptor(), "Target outside the grid; unreachable.");
                records.push(record(pair, None, Some(PairFailure::OutsideGrid)));
                continue;
            };
            if grid.cell(target_cell).is_occupied() {
                records.push(record(pair, None, Some(PairFailure::ShellConflict)));
                continue;
            }

            if pair.euclidean > max_distance {
                // Any surface path is at least as long as the straight line,
                // so the pair cannot come in under the bound. Report it at
                // its Euclidean distance when the line runs through open
                // solvent, as a sentinel otherwise.
                let unobstructed =
                    grid.line_unobstructed(&source_atom.position, &target_atom.position);
                records.push(record(pair, unobstructed.then_some(pair.euclidean), None));
                continue;
            }

            grid.open_pocket(target_cell);
            searched.push((records.len(), target_cell));
            records.push(record(pair, None, None));
        }

        if !searched.is_empty() {
            let target_cells: Vec<_> = searched.iter().map(|(_, cell)| *cell).collect();
            let paths = search::shortest_paths(grid, source_cell, &target_cells, max_distance);
            for ((position, _), path) in searched.iter().zip(paths) {
                if path.is_reachable() {
                    records[*position].sasd = Some(path.distance());
                }
            }
        }
    }

    grid.close_pockets();
    for grid_index in cleared {
        grid.restore_atom_shell(grid_index);
    }
    grid.soft_reset();
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{Atom, AtomFlags, Element};
    use crate::engine::config::{AtomSelector, PairSpec};
    use nalgebra::Point3;

    const CELL_DIAGONAL: f64 = 1.7320508075688772;

    fn nz(serial: usize, chain_id: char, res_seq: isize, x: f64, y: f64) -> Atom {
        Atom {
            serial,
            name: "NZ".to_string(),
            alt_loc: ' ',
            res_name: "LYS".to_string(),
            res_seq,
            i_code: ' ',
            chain_id,
            position: Point3::new(x, y, 0.0),
            element: Element::N,
            vdw_radius: 0.0,
            charge: None,
            flags: AtomFlags::default(),
        }
    }

    fn lysine_config() -> DistanceConfig {
        let selector = AtomSelector {
            residue_names: ["LYS".to_string()].into(),
            atom_names: ["NZ".to_string()].into(),
            ..Default::default()
        };
        DistanceConfig {
            pair: PairSpec {
                first: selector.clone(),
                second: selector,
            },
            ..Default::default()
        }
    }

    fn run_quiet(
        atoms: &mut AtomList,
        config: &DistanceConfig,
    ) -> Result<Vec<DistanceRecord>, EngineError> {
        run(atoms, config, &ProgressReporter::new(), &CancelToken::new())
    }

    #[test]
    fn vacuum_pair_is_reported_near_its_euclidean_distance() {
        let mut atoms: AtomList = [nz(1, 'A', 1, 0.0, 0.0), nz(2, 'A', 9, 10.0, 0.0)]
            .into_iter()
            .collect();
        let records = run_quiet(&mut atoms, &lysine_config()).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.index, 1);
        assert!((record.euclidean - 10.0).abs() < 1e-9);
        let sasd = record.sasd.expect("pair should be reachable");
        assert!((sasd - 10.0).abs() <= CELL_DIAGONAL);
        assert_eq!(record.failure, None);
    }

    #[test]
    fn pair_beyond_the_bound_with_open_line_reports_euclidean() {
        let mut atoms: AtomList = [nz(1, 'A', 1, 0.0, 0.0), nz(2, 'A', 9, 50.0, 0.0)]
            .into_iter()
            .collect();
        let records = run_quiet(&mut atoms, &lysine_config()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sasd, Some(records[0].euclidean));
    }

    #[test]
    fn blocked_pair_beyond_the_bound_is_a_sentinel() {
        let mut atoms = AtomList::new();
        atoms.push(nz(1, 'A', 1, 0.0, 0.0));
        atoms.push(nz(2, 'A', 9, 50.0, 0.0));
        // A wall of glycine calphas between them.
        let mut serial = 3;
        for y in -6..=6 {
            for z in -6..=6 {
                atoms.push(Atom {
                    serial,
                    name: "CA".to_string(),
                    alt_loc: ' ',
                    res_name: "GLY".to_string(),
                    res_seq: serial as isize,
                    i_code: ' ',
                    chain_id: 'A',
                    position: Point3::new(25.0, y as f64 * 2.0, z as f64 * 2.0),
                    element: Element::C,
                    vdw_radius: 0.0,
                    charge: None,
                    flags: AtomFlags::default(),
                });
                serial += 1;
            }
        }
        let records = run_quiet(&mut atoms, &lysine_config()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sasd, None);
        assert_eq!(records[0].failure, None);
    }

    #[test]
    fn homomeric_dimer_reports_the_symmetric_pair_once() {
        let mut atoms: AtomList = [
            nz(1, 'A', 42, 0.0, 0.0),
            nz(2, 'B', 42, 12.0, 0.0),
        ]
        .into_iter()
        .collect();
        let config = DistanceConfig {
            homomeric: true,
            ..lysine_config()
        };
        let records = run_quiet(&mut atoms, &config).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].sasd.is_some());
    }

    #[test]
    fn local_grid_reports_far_targets_unreachable() {
        let mut atoms: AtomList = [
            nz(1, 'A', 1, 0.0, 0.0),
            nz(2, 'B', 1, 200.0, 0.0),
        ]
        .into_iter()
        .collect();
        let config = DistanceConfig {
            local_grid: true,
            ..lysine_config()
        };
        let records = run_quiet(&mut atoms, &config).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sasd, None);
        assert_eq!(records[0].failure, Some(PairFailure::OutsideGrid));
    }

    #[test]
    fn oversized_structures_switch_to_local_grids_automatically() {
        // 200 Å apart: beyond MAX_PROTEIN_DIMENSION, so the local-grid mode
        // kicks in without being requested and the far target falls outside
        // the source's box.
        let mut atoms: AtomList = [
            nz(1, 'A', 1, 0.0, 0.0),
            nz(2, 'B', 1, 200.0, 0.0),
        ]
        .into_iter()
        .collect();
        let records = run_quiet(&mut atoms, &lysine_config()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].sasd.is_none());
    }

    #[test]
    fn invalid_configuration_aborts_the_run() {
        let mut atoms: AtomList = [nz(1, 'A', 1, 0.0, 0.0), nz(2, 'A', 2, 5.0, 0.0)]
            .into_iter()
            .collect();
        let config = DistanceConfig {
            max_distance: -1.0,
            ..lysine_config()
        };
        assert!(matches!(
            run_quiet(&mut atoms, &config),
            Err(EngineError::Config { .. })
        ));
    }

    #[test]
    fn out_of_bounds_atoms_abort_the_run() {
        let mut atoms: AtomList = [nz(1, 'A', 1, 0.0, 0.0), nz(2, 'A', 2, 10_500.0, 0.0)]
            .into_iter()
            .collect();
        assert!(matches!(
            run_quiet(&mut atoms, &lysine_config()),
            Err(EngineError::Input(_))
        ));
    }

    #[test]
    fn cancelled_token_short_circuits_the_sources() {
        let mut atoms: AtomList = [nz(1, 'A', 1, 0.0, 0.0), nz(2, 'A', 9, 10.0, 0.0)]
            .into_iter()
            .collect();
        let cancel = CancelToken::new();
        cancel.cancel();
        let records = run(
            &mut atoms,
            &lysine_config(),
            &ProgressReporter::new(),
            &cancel,
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn radii_are_assigned_during_setup() {
        let mut atoms: AtomList = [nz(1, 'A', 1, 0.0, 0.0), nz(2, 'A', 9, 10.0, 0.0)]
            .into_iter()
            .collect();
        assert_eq!(atoms.get(0).unwrap().vdw_radius, 0.0);
        run_quiet(&mut atoms, &lysine_config()).unwrap();
        assert!((atoms.get(0).unwrap().vdw_radius - 1.65).abs() < 1e-9);
    }
}
