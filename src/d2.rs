pub mod bc;
pub mod io;
pub mod post;

pub use bc::{BoundaryFace, FaceStrengths};

use crate::global_variables::*;
use crate::io::WriteDataMode;
use crate::{Outcome, Phase, SolverError};
use rayon::prelude::*;
use std::collections::HashMap;
use std::mem;
use std::process;
use std::time::Instant;

pub const D: usize = 2;

pub const C: [[i32; D]; 4] = [[1, 0], [-1, 0], [0, 1], [0, -1]];

#[derive(Clone)]
pub struct Simulation {
    pub case_name: String,
    pub simulation_time: Instant,
    pub tolerance: Float,
    pub max_iter: usize,
    pub animated_cap: Option<usize>,
    pub write_data_mode: WriteDataMode,
}

impl Simulation {
    pub fn stop_condition(&self, error_max: Float, sweep_count: usize) -> Option<Outcome> {
        if error_max <= self.tolerance {
            return Some(Outcome::Converged);
        }
        if sweep_count >= self.max_iter {
            return Some(Outcome::IterationLimitReached);
        }
        None
    }

    pub fn animated_stop_condition(&self, error_max: Float, sweep_count: usize) -> Option<Outcome> {
        if error_max <= self.tolerance {
            return Some(Outcome::Converged);
        }
        if let Some(cap) = self.animated_cap {
            if sweep_count >= cap {
                return Some(Outcome::IterationLimitReached);
            }
        }
        None
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            case_name: String::from(CASE_NAME),
            simulation_time: Instant::now(),
            tolerance: ALLOWED_ERROR,
            max_iter: ALLOWED_ITER,
            animated_cap: None,
            write_data_mode: WriteDataMode::Frequency(100),
        }
    }

    pub fn from_setup(parameters: HashMap<String, String>) -> Self {
        let case_name = parameters["case_name"].clone();
        let tolerance = parameters["tolerance"].parse::<Float>().unwrap();
        let max_iter = parameters["max_iter"].parse::<usize>().unwrap();
        let animated_cap = match parameters["animated_cap"].as_str() {
            "none" => None,
            cap => Some(cap.parse::<usize>().unwrap()),
        };
        let write_data_mode = Simulation::set_write_data_mode(&parameters["write_data_mode"]);
        Self {
            case_name,
            simulation_time: Instant::now(),
            tolerance,
            max_iter,
            animated_cap,
            write_data_mode,
        }
    }

    fn set_write_data_mode(mode: &str) -> WriteDataMode {
        let mut write_data_mode = mode.split_whitespace();
        let mode = write_data_mode.next().unwrap();
        match mode {
            "frequency" => {
                let frequency = write_data_mode.next().unwrap().parse::<usize>().unwrap();
                WriteDataMode::Frequency(frequency)
            }
            "list" => {
                let list = write_data_mode
                    .map(|x| x.parse::<usize>().unwrap())
                    .collect();
                WriteDataMode::ListOfSteps(list)
            }
            _ => panic!("Invalid write results mode: {mode}."),
        }
    }
}

#[derive(Clone)]
pub struct Cell {
    pub potential: Float,

    pub is_boundary: bool,
}

impl Cell {
    pub fn new(potential: Float) -> Self {
        Self {
            potential,
            is_boundary: false,
        }
    }
}

pub struct Lattice {
    pub nx: usize,
    pub ny: usize,
    pub interior_default: Float,
    pub strengths: FaceStrengths,
    pub cells: Vec<Cell>,
}

impl Lattice {
    pub fn index(&self, x: usize, y: usize) -> usize {
        x + self.nx * y
    }

    pub fn get_cell(&self, index: &[usize]) -> &Cell {
        &self.cells[self.index(index[0], index[1])]
    }

    pub fn get_cell_mut(&mut self, index: &[usize]) -> &mut Cell {
        let cell_index = self.index(index[0], index[1]);
        &mut self.cells[cell_index]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn potentials(&self) -> Vec<Float> {
        self.cells.iter().map(|cell| cell.potential).collect()
    }
}

impl Lattice {
    pub fn new(
        nx: usize,
        ny: usize,
        strengths: FaceStrengths,
        interior_default: Float,
    ) -> Result<Self, SolverError> {
        if nx < 1 || ny < 1 {
            return Err(SolverError::InvalidDimensions { nx, ny, nz: 1 });
        }
        let mut lattice = Self {
            nx,
            ny,
            interior_default,
            strengths,
            cells: vec![Cell::new(interior_default); nx * ny],
        };
        lattice.stamp_boundaries();
        Ok(lattice)
    }
}

pub fn relaxation_phase(
    nx: usize,
    cells: &[Cell],
    read: &[Float],
    write: &mut [Float],
    phase: Phase,
    sor_coef: Float,
) {
    write
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, target)| {
            let x = index % nx;
            let y = index / nx;
            if cells[index].is_boundary || (x + y) % 2 != phase.parity() {
                *target = read[index];
                return;
            }
            // Interior cells always have all four neighbors in range.
            let mut sum = 0.0;
            for [cx, cy] in C {
                let neighbor_x = (x as i32 + cx) as usize;
                let neighbor_y = (y as i32 + cy) as usize;
                sum += read[neighbor_x + nx * neighbor_y];
            }
            let average = sum / 4.0;
            *target = (1.0 - sor_coef) * read[index] + sor_coef * average;
        });
}

pub struct Solver {
    pub lattice: Lattice,
    pub sor_coef: Float,
    pub sweep_count: usize,
    pub error_max: Float,
    read: Vec<Float>,
    mid: Vec<Float>,
    write: Vec<Float>,
}

impl Solver {
    pub fn update_units(&self) -> usize {
        self.read.len()
    }

    pub fn potentials(&self) -> &[Float] {
        &self.read
    }

    pub fn sweep(&mut self) -> (Float, usize) {
        relaxation_phase(
            self.lattice.nx,
            &self.lattice.cells,
            &self.read,
            &mut self.mid,
            Phase::One,
            self.sor_coef,
        );
        relaxation_phase(
            self.lattice.nx,
            &self.lattice.cells,
            &self.mid,
            &mut self.write,
            Phase::Two,
            self.sor_coef,
        );
        let error_max = self
            .read
            .par_iter()
            .zip(self.write.par_iter())
            .map(|(before, after)| (after - before).abs())
            .reduce(|| 0.0, Float::max);
        mem::swap(&mut self.read, &mut self.write);
        self.sweep_count += 1;
        self.error_max = error_max;
        self.sync_lattice();
        (error_max, self.sweep_count)
    }

    pub fn relax(&mut self) {
        relaxation_phase(
            self.lattice.nx,
            &self.lattice.cells,
            &self.read,
            &mut self.mid,
            Phase::One,
            self.sor_coef,
        );
        relaxation_phase(
            self.lattice.nx,
            &self.lattice.cells,
            &self.mid,
            &mut self.write,
            Phase::Two,
            self.sor_coef,
        );
        mem::swap(&mut self.read, &mut self.write);
        self.sync_lattice();
    }

    pub fn relax_phase(&mut self, phase: Phase) {
        relaxation_phase(
            self.lattice.nx,
            &self.lattice.cells,
            &self.read,
            &mut self.mid,
            phase,
            self.sor_coef,
        );
        mem::swap(&mut self.read, &mut self.mid);
        self.sync_lattice();
    }

    pub fn run_to_convergence(&mut self, tolerance: Float, max_iter: usize) -> Outcome {
        while self.sweep_count < max_iter {
            let (error_max, _) = self.sweep();
            if error_max <= tolerance {
                return Outcome::Converged;
            }
        }
        Outcome::IterationLimitReached
    }

    fn sync_lattice(&mut self) {
        self.lattice
            .cells
            .par_iter_mut()
            .zip(self.read.par_iter())
            .for_each(|(cell, &potential)| cell.potential = potential);
    }
}

impl Solver {
    pub fn new(lattice: Lattice, sor_coef: Float) -> Self {
        let read = lattice.potentials();
        let mid = read.clone();
        let write = read.clone();
        Self {
            lattice,
            sor_coef,
            sweep_count: 0,
            error_max: Float::INFINITY,
            read,
            mid,
            write,
        }
    }
}

pub fn run() {
    let simulation = Simulation::build_case_setup().unwrap();

    let mut solver = Solver::build_case_conditions().unwrap();

    let outcome = loop {
        // The cap is tested before sweeping so a zero budget leaves the
        // interior untouched.
        if solver.sweep_count >= simulation.max_iter {
            break Outcome::IterationLimitReached;
        }
        let (error_max, sweep) = solver.sweep();
        simulation.print_error(sweep, error_max);
        if let Err(e) = simulation.write_error_history(sweep, error_max) {
            eprintln!("Error while writing the error history file: {e}.");
            process::exit(1);
        };
        if let Some(outcome) = simulation.stop_condition(error_max, sweep) {
            break outcome;
        }
    };

    simulation.report_outcome(outcome, &solver);
    simulation.write_results(&solver);
}

pub fn run_animated() {
    let simulation = Simulation::build_case_setup().unwrap();

    let mut solver = Solver::build_case_conditions().unwrap();

    // The animated loop carries no built-in iteration cap; animated_cap is
    // an optional safety limit read from the case setup file.
    let outcome = loop {
        let (error_max, sweep) = solver.sweep();
        simulation.print_error(sweep, error_max);
        if let Err(e) = simulation.write_error_history(sweep, error_max) {
            eprintln!("Error while writing the error history file: {e}.");
            process::exit(1);
        };
        simulation.write_data(&solver);
        if let Some(outcome) = simulation.animated_stop_condition(error_max, sweep) {
            break outcome;
        }
    };

    simulation.report_outcome(outcome, &solver);
    simulation.write_results(&solver);
}

pub fn run_relax(phase: Option<Phase>) {
    let simulation = Simulation::build_case_setup().unwrap();

    let mut solver = Solver::build_case_conditions().unwrap();

    match phase {
        None => solver.relax(),
        Some(phase) => solver.relax_phase(phase),
    }

    simulation.write_results(&solver);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_strengths() -> FaceStrengths {
        FaceStrengths {
            left: 1.0,
            right: 0.0,
            up: 0.0,
            bottom: 0.0,
        }
    }

    fn ramp_solver(nx: usize, ny: usize, sor_coef: Float) -> Solver {
        let lattice = Lattice::new(nx, ny, ramp_strengths(), INTERIOR_DEFAULT_2D).unwrap();
        Solver::new(lattice, sor_coef)
    }

    #[test]
    fn boundary_cells_cover_the_outer_ring() {
        let lattice = Lattice::new(5, 4, ramp_strengths(), INTERIOR_DEFAULT_2D).unwrap();
        for y in 0..4 {
            for x in 0..5 {
                let on_ring = x == 0 || x == 4 || y == 0 || y == 3;
                assert_eq!(lattice.get_cell(&[x, y]).is_boundary, on_ring);
            }
        }
    }

    #[test]
    fn shared_corners_take_the_last_stamped_face() {
        let lattice = Lattice::new(4, 4, ramp_strengths(), INTERIOR_DEFAULT_2D).unwrap();
        // Faces are stamped up, bottom, left, right: the side faces win.
        assert_eq!(lattice.get_cell(&[0, 0]).potential, 1.0);
        assert_eq!(lattice.get_cell(&[0, 3]).potential, 1.0);
        assert_eq!(lattice.get_cell(&[3, 0]).potential, 0.0);
        assert_eq!(lattice.get_cell(&[3, 3]).potential, 0.0);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let result = Lattice::new(0, 10, ramp_strengths(), INTERIOR_DEFAULT_2D);
        assert!(matches!(
            result,
            Err(SolverError::InvalidDimensions { nx: 0, ny: 10, .. })
        ));
    }

    #[test]
    fn hand_computed_sweep_on_a_4x4_grid() {
        // Interior cells: (1,1), (2,1), (1,2), (2,2). Phase 1 updates the
        // odd-parity pair (2,1) and (1,2) from the pre-sweep buffer; phase 2
        // updates (1,1) and (2,2) from the phase-1 result.
        let mut solver = ramp_solver(4, 4, 1.0);
        let (error_max, sweep) = solver.sweep();
        let lattice = &solver.lattice;
        assert_eq!(lattice.get_cell(&[1, 2]).potential, 0.25);
        assert_eq!(lattice.get_cell(&[2, 1]).potential, 0.0);
        assert_eq!(lattice.get_cell(&[1, 1]).potential, 0.3125);
        assert_eq!(lattice.get_cell(&[2, 2]).potential, 0.0625);
        assert_eq!(error_max, 0.3125);
        assert_eq!(sweep, 1);
    }

    #[test]
    fn boundary_values_never_change() {
        let mut solver = ramp_solver(8, 8, 1.0);
        let initial = solver.lattice.potentials();
        for _ in 0..50 {
            solver.sweep();
        }
        for y in 0..8 {
            for x in 0..8 {
                let cell = solver.lattice.get_cell(&[x, y]);
                if cell.is_boundary {
                    assert_eq!(cell.potential, initial[x + 8 * y]);
                }
            }
        }
    }

    #[test]
    fn error_trends_to_zero_on_8x8() {
        let mut solver = ramp_solver(8, 8, 1.0);
        let mut last_errors = Vec::new();
        for _ in 0..500 {
            let (error_max, _) = solver.sweep();
            assert!(error_max >= 0.0);
            last_errors.push(error_max);
        }
        let early = last_errors[..10].iter().cloned().fold(0.0, Float::max);
        let late = last_errors[490..].iter().cloned().fold(0.0, Float::max);
        assert!(late < early);
        assert!(late <= ALLOWED_ERROR);
    }

    #[test]
    fn converges_within_the_iteration_budget() {
        let mut solver = ramp_solver(8, 8, 1.0);
        let outcome = solver.run_to_convergence(ALLOWED_ERROR, 2000);
        assert_eq!(outcome, Outcome::Converged);
        assert!(solver.error_max <= ALLOWED_ERROR);
        assert!(solver.sweep_count < 2000);
    }

    #[test]
    fn uniform_field_is_a_bit_for_bit_fixed_point() {
        let lattice = Lattice::new(6, 6, FaceStrengths::uniform(0.5), 0.5).unwrap();
        let mut solver = Solver::new(lattice, 1.0);
        let (error_max, _) = solver.sweep();
        assert_eq!(error_max, 0.0);
        let before = solver.potentials().to_vec();
        solver.sweep();
        assert_eq!(solver.potentials(), &before[..]);
    }

    #[test]
    fn ramp_scenario_keeps_interior_within_bounds() {
        let mut solver = ramp_solver(4, 4, 1.0);
        let outcome = solver.run_to_convergence(1e-6, 2000);
        assert_eq!(outcome, Outcome::Converged);
        for y in 0..4 {
            assert_eq!(solver.lattice.get_cell(&[0, y]).potential, 1.0);
            assert_eq!(solver.lattice.get_cell(&[3, y]).potential, 0.0);
        }
        for y in 1..3 {
            for x in 1..3 {
                let potential = solver.lattice.get_cell(&[x, y]).potential;
                assert!(potential > 0.0 && potential < 1.0);
            }
        }
        // The field falls off away from the driven face.
        let near = solver.lattice.get_cell(&[1, 1]).potential;
        let far = solver.lattice.get_cell(&[2, 1]).potential;
        assert!(near > far);
    }

    #[test]
    fn zero_iteration_budget_returns_immediately() {
        let mut solver = ramp_solver(6, 6, 1.0);
        let outcome = solver.run_to_convergence(ALLOWED_ERROR, 0);
        assert_eq!(outcome, Outcome::IterationLimitReached);
        assert_eq!(solver.sweep_count, 0);
        for y in 1..5 {
            for x in 1..5 {
                assert_eq!(
                    solver.lattice.get_cell(&[x, y]).potential,
                    INTERIOR_DEFAULT_2D
                );
            }
        }
    }

    #[test]
    fn over_relaxation_still_converges() {
        let mut solver = ramp_solver(8, 8, 1.25);
        let outcome = solver.run_to_convergence(ALLOWED_ERROR, 2000);
        assert_eq!(outcome, Outcome::Converged);
    }

    #[test]
    fn stop_condition_reports_the_halt_reason() {
        let simulation = Simulation::new();
        assert_eq!(simulation.stop_condition(1e-2, 10), None);
        assert_eq!(
            simulation.stop_condition(1e-6, 10),
            Some(Outcome::Converged)
        );
        assert_eq!(
            simulation.stop_condition(1e-2, ALLOWED_ITER),
            Some(Outcome::IterationLimitReached)
        );
    }

    #[test]
    fn animated_stop_condition_honors_the_optional_cap() {
        let mut simulation = Simulation::new();
        assert_eq!(simulation.animated_stop_condition(1e-2, ALLOWED_ITER), None);
        assert_eq!(
            simulation.animated_stop_condition(1e-6, 10),
            Some(Outcome::Converged)
        );
        simulation.animated_cap = Some(50);
        assert_eq!(simulation.animated_stop_condition(1e-2, 49), None);
        assert_eq!(
            simulation.animated_stop_condition(1e-2, 50),
            Some(Outcome::IterationLimitReached)
        );
    }

    #[test]
    fn index_maps_row_major_coordinates() {
        let lattice = Lattice::new(5, 4, ramp_strengths(), INTERIOR_DEFAULT_2D).unwrap();
        assert_eq!(lattice.index(0, 0), 0);
        assert_eq!(lattice.index(3, 2), 13);
        assert_eq!(lattice.index(4, 3), lattice.len() - 1);
        let index = lattice.index(2, 1);
        assert_eq!(
            lattice.cells[index].potential,
            lattice.get_cell(&[2, 1]).potential
        );
    }

    #[test]
    fn incremental_sweeps_resume_between_calls() {
        let mut stepped = ramp_solver(6, 6, 1.0);
        let (_, first) = stepped.sweep();
        let (_, second) = stepped.sweep();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let mut batch = ramp_solver(6, 6, 1.0);
        batch.sweep();
        batch.sweep();
        assert_eq!(stepped.potentials(), batch.potentials());
    }
}
