#[cfg(test)]
mod tests {
    use laplace_sor::*;

    fn ramp_solver_2d(nx: usize, ny: usize) -> d2::Solver {
        let strengths = d2::FaceStrengths {
            left: 1.0,
            right: 0.0,
            up: 0.0,
            bottom: 0.0,
        };
        let lattice = d2::Lattice::new(nx, ny, strengths, INTERIOR_DEFAULT_2D).unwrap();
        d2::Solver::new(lattice, SOR_COEF)
    }

    fn box_solver_3d(n: usize) -> d3::Solver {
        let strengths = d3::FaceStrengths {
            front: 1.0,
            back: 0.0,
            left: 0.5,
            right: 0.5,
            down: 0.5,
            up: 0.5,
        };
        let lattice = d3::Lattice::new(n, n, n, strengths, INTERIOR_DEFAULT_3D).unwrap();
        d3::Solver::new(lattice, SOR_COEF)
    }

    #[test]
    fn test_update_units_and_potentials_cover_the_lattice() {
        let solver = ramp_solver_2d(7, 5);
        assert_eq!(solver.update_units(), 35);
        assert_eq!(solver.potentials().len(), 35);

        let solver = box_solver_3d(4);
        assert_eq!(solver.update_units(), 64);
        assert_eq!(solver.potentials().len(), 64);
    }

    #[test]
    fn test_batch_mode_matches_repeated_incremental_sweeps() {
        let mut batch = ramp_solver_2d(8, 8);
        let outcome = batch.run_to_convergence(ALLOWED_ERROR, ALLOWED_ITER);
        assert!(outcome.converged());

        let mut stepped = ramp_solver_2d(8, 8);
        loop {
            let (error_max, sweep) = stepped.sweep();
            if error_max <= ALLOWED_ERROR {
                assert_eq!(sweep, batch.sweep_count);
                break;
            }
            assert!(sweep < ALLOWED_ITER);
        }
        assert_eq!(batch.potentials(), stepped.potentials());
    }

    #[test]
    fn test_relax_applies_exactly_one_sweep() {
        let mut relaxed = ramp_solver_2d(6, 6);
        relaxed.relax();
        assert_eq!(relaxed.sweep_count, 0);

        let mut swept = ramp_solver_2d(6, 6);
        swept.sweep();
        assert_eq!(relaxed.potentials(), swept.potentials());
    }

    #[test]
    fn test_phase_restricted_relax_leaves_the_other_class_untouched() {
        let mut solver = ramp_solver_2d(6, 6);
        solver.relax_phase(Phase::Two);
        for y in 1..5 {
            for x in 1..5 {
                let cell = solver.lattice.get_cell(&[x, y]);
                if (x + y) % 2 == Phase::One.parity() {
                    assert_eq!(cell.potential, INTERIOR_DEFAULT_2D);
                }
            }
        }
    }

    #[test]
    fn test_3d_batch_mode_converges() {
        let mut solver = box_solver_3d(6);
        let outcome = solver.run_to_convergence(ALLOWED_ERROR, ALLOWED_ITER);
        assert_eq!(outcome, Outcome::Converged);
        for cell in solver.lattice.cells.iter().filter(|cell| !cell.is_boundary) {
            assert!(cell.potential > 0.0 && cell.potential < 1.0);
        }
    }

    #[test]
    fn test_iteration_limit_is_reported_distinctly() {
        let mut solver = ramp_solver_2d(32, 32);
        let outcome = solver.run_to_convergence(1e-7, 3);
        assert_eq!(outcome, Outcome::IterationLimitReached);
        assert!(!outcome.converged());
        assert_eq!(solver.sweep_count, 3);
    }
}
