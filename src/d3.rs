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

pub const D: usize = 3;

pub const C: [[i32; D]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

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
    pub nz: usize,
    pub interior_default: Float,
    pub strengths: FaceStrengths,
    pub cells: Vec<Cell>,
}

impl Lattice {
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.nx * y + self.nx * self.ny * z
    }

    pub fn get_cell(&self, index: &[usize]) -> &Cell {
        &self.cells[self.index(index[0], index[1], index[2])]
    }

    pub fn get_cell_mut(&mut self, index: &[usize]) -> &mut Cell {
        let cell_index = self.index(index[0], index[1], index[2]);
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

    // Renderer-facing coordinates, derived from the linear index instead of
    // being stored per cell.
    pub fn grid_index(&self, index: usize) -> [usize; D] {
        let x = index % self.nx;
        let y = (index / self.nx) % self.ny;
        let z = index / (self.nx * self.ny);
        [x, y, z]
    }

    pub fn normalized_position(&self, index: usize) -> [Float; D] {
        let [x, y, z] = self.grid_index(index);
        [
            (x as Float) / (self.nx as Float),
            (y as Float) / (self.ny as Float),
            (z as Float) / (self.nz as Float),
        ]
    }
}

impl Lattice {
    pub fn new(
        nx: usize,
        ny: usize,
        nz: usize,
        strengths: FaceStrengths,
        interior_default: Float,
    ) -> Result<Self, SolverError> {
        if nx < 1 || ny < 1 || nz < 1 {
            return Err(SolverError::InvalidDimensions { nx, ny, nz });
        }
        let mut lattice = Self {
            nx,
            ny,
            nz,
            interior_default,
            strengths,
            cells: vec![Cell::new(interior_default); nx * ny * nz],
        };
        lattice.stamp_boundaries();
        Ok(lattice)
    }
}

pub fn relaxation_phase(
    nx: usize,
    ny: usize,
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
            let y = (index / nx) % ny;
            let z = index / (nx * ny);
            if cells[index].is_boundary || (x + y + z) % 2 != phase.parity() {
                *target = read[index];
                return;
            }
            // Interior cells always have all six neighbors in range.
            let mut sum = 0.0;
            for [cx, cy, cz] in C {
                let neighbor_x = (x as i32 + cx) as usize;
                let neighbor_y = (y as i32 + cy) as usize;
                let neighbor_z = (z as i32 + cz) as usize;
                sum += read[neighbor_x + nx * neighbor_y + nx * ny * neighbor_z];
            }
            let average = sum / 6.0;
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
            self.lattice.ny,
            &self.lattice.cells,
            &self.read,
            &mut self.mid,
            Phase::One,
            self.sor_coef,
        );
        relaxation_phase(
            self.lattice.nx,
            self.lattice.ny,
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
            self.lattice.ny,
            &self.lattice.cells,
            &self.read,
            &mut self.mid,
            Phase::One,
            self.sor_coef,
        );
        relaxation_phase(
            self.lattice.nx,
            self.lattice.ny,
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
            self.lattice.ny,
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

    fn box_strengths() -> FaceStrengths {
        FaceStrengths {
            front: 1.0,
            back: 1.0,
            left: 0.0,
            right: 0.0,
            down: 0.0,
            up: 0.0,
        }
    }

    #[test]
    fn single_interior_cell_takes_the_neighbor_average() {
        let lattice = Lattice::new(3, 3, 3, box_strengths(), INTERIOR_DEFAULT_3D).unwrap();
        let mut solver = Solver::new(lattice, 1.0);
        let (error_max, _) = solver.sweep();
        // The lone interior cell has odd parity and averages its six face
        // neighbors in phase 1.
        let expected: Float = 2.0 / 6.0;
        assert_eq!(solver.lattice.get_cell(&[1, 1, 1]).potential, expected);
        assert_eq!(error_max, INTERIOR_DEFAULT_3D - expected);
    }

    #[test]
    fn second_sweep_reaches_the_fixed_point() {
        let lattice = Lattice::new(3, 3, 3, box_strengths(), INTERIOR_DEFAULT_3D).unwrap();
        let mut solver = Solver::new(lattice, 1.0);
        solver.sweep();
        let (error_max, _) = solver.sweep();
        assert_eq!(error_max, 0.0);
        let before = solver.potentials().to_vec();
        solver.sweep();
        assert_eq!(solver.potentials(), &before[..]);
    }

    #[test]
    fn shared_edges_take_the_last_stamped_face() {
        let strengths = FaceStrengths {
            front: 0.1,
            back: 0.2,
            left: 0.3,
            right: 0.4,
            down: 0.5,
            up: 0.6,
        };
        let lattice = Lattice::new(4, 4, 4, strengths, INTERIOR_DEFAULT_3D).unwrap();
        // Faces are stamped front, back, left, right, down, up.
        assert_eq!(lattice.get_cell(&[1, 3, 0]).potential, 0.6);
        assert_eq!(lattice.get_cell(&[0, 0, 0]).potential, 0.5);
        assert_eq!(lattice.get_cell(&[0, 1, 0]).potential, 0.3);
        assert_eq!(lattice.get_cell(&[3, 1, 2]).potential, 0.4);
        assert_eq!(lattice.get_cell(&[1, 1, 0]).potential, 0.1);
        assert_eq!(lattice.get_cell(&[1, 1, 3]).potential, 0.2);
    }

    #[test]
    fn grid_index_and_normalized_position_derive_from_the_linear_index() {
        let lattice = Lattice::new(4, 5, 6, box_strengths(), INTERIOR_DEFAULT_3D).unwrap();
        let index = lattice.index(3, 2, 4);
        assert_eq!(lattice.grid_index(index), [3, 2, 4]);
        assert_eq!(
            lattice.normalized_position(index),
            [3.0 / 4.0, 2.0 / 5.0, 4.0 / 6.0]
        );
    }

    #[test]
    fn boundary_values_never_change() {
        let lattice = Lattice::new(5, 5, 5, box_strengths(), INTERIOR_DEFAULT_3D).unwrap();
        let mut solver = Solver::new(lattice, 1.0);
        let initial = solver.lattice.potentials();
        for _ in 0..30 {
            solver.sweep();
        }
        for (index, cell) in solver.lattice.cells.iter().enumerate() {
            if cell.is_boundary {
                assert_eq!(cell.potential, initial[index]);
            }
        }
    }

    #[test]
    fn interior_cells_start_at_the_variant_default() {
        let lattice = Lattice::new(5, 5, 5, box_strengths(), INTERIOR_DEFAULT_3D).unwrap();
        for cell in lattice.cells.iter().filter(|cell| !cell.is_boundary) {
            assert_eq!(cell.potential, 0.5);
        }
    }

    #[test]
    fn converges_on_a_small_box() {
        let lattice = Lattice::new(6, 6, 6, box_strengths(), INTERIOR_DEFAULT_3D).unwrap();
        let mut solver = Solver::new(lattice, 1.0);
        let outcome = solver.run_to_convergence(ALLOWED_ERROR, ALLOWED_ITER);
        assert_eq!(outcome, Outcome::Converged);
        for cell in solver.lattice.cells.iter().filter(|cell| !cell.is_boundary) {
            assert!(cell.potential > 0.0 && cell.potential < 1.0);
        }
    }

    #[test]
    fn uniform_strengths_leave_a_uniform_box_unchanged() {
        let lattice = Lattice::new(4, 4, 4, FaceStrengths::uniform(0.5), 0.5).unwrap();
        let mut solver = Solver::new(lattice, 1.0);
        let (error_max, _) = solver.sweep();
        assert_eq!(error_max, 0.0);
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
    fn invalid_dimensions_are_rejected() {
        let result = Lattice::new(10, 0, 10, box_strengths(), INTERIOR_DEFAULT_3D);
        assert!(matches!(
            result,
            Err(SolverError::InvalidDimensions { ny: 0, .. })
        ));
    }
}
