use super::{FaceStrengths, Lattice, Simulation, Solver};
use crate::global_variables::*;
use crate::io::WriteDataMode;
use crate::Outcome;
use colored::*;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process;

impl Simulation {
    pub fn build_case_setup() -> io::Result<Simulation> {
        if let Err(e) = crate::io::create_case_directories() {
            eprintln!("Error while creating the case directories: {e}.");
            process::exit(1);
        };
        let case_setup_path =
            Path::new(crate::io::PRE_PROCESSING_PATH).join(crate::io::CASE_SETUP_FILE);
        let case_setup_path_str = case_setup_path.to_str().unwrap();
        let simulation: Simulation;
        if case_setup_path.exists() {
            println!(
                "Reading the case setup file: {}.\n",
                case_setup_path_str.yellow().bold()
            );
            let parameters = crate::io::read_case_setup()?;
            simulation = Simulation::from_setup(parameters);
        } else {
            simulation = Simulation::new();
        }
        if let Err(e) = simulation.create_script_for_error_graph() {
            eprintln!("Error while creating script for error graph file: {e}.");
            process::exit(1);
        };
        if let Err(e) = simulation.create_script_for_live_error_graph() {
            eprintln!("Error while creating script for live error graph file: {e}.");
            process::exit(1);
        };
        Ok(simulation)
    }
}

impl Simulation {
    pub fn print_error(&self, sweep: usize, error_max: Float) {
        if sweep % 100 == 1 {
            let duration = self.simulation_time.elapsed().as_secs_f64();
            println!("\n{} {:.2} s.", "Elapsed time:".cyan().bold(), duration);
            println!(
                "\n{:>8} {:>16}\n",
                "sweep".cyan().bold(),
                "error_max".cyan().bold()
            );
        }
        println!("{:>8} {:>16.8e}", sweep, error_max);
    }

    pub fn report_outcome(&self, outcome: Outcome, solver: &Solver) {
        match outcome {
            Outcome::Converged => println!(
                "\n{} after {} sweeps (error_max = {:.8e}).\n",
                "Converged".green().bold(),
                solver.sweep_count,
                solver.error_max
            ),
            Outcome::IterationLimitReached => println!(
                "\n{} after {} sweeps (error_max = {:.8e}).\n",
                "Iteration limit reached".red().bold(),
                solver.sweep_count,
                solver.error_max
            ),
        }
    }

    pub fn write_error_history(&self, sweep: usize, error_max: Float) -> io::Result<()> {
        let data_path = Path::new(crate::io::DATA_PATH);
        let path = data_path.join(crate::io::ERROR_HISTORY_FILE);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if sweep == 1 {
            writeln!(file, "{:>8} {:>16}", "sweep", "error_max")?;
        }
        writeln!(file, "{:>8} {:>16.8e}", sweep, error_max)?;
        Ok(())
    }

    pub fn write_data(&self, solver: &Solver) {
        match &self.write_data_mode {
            WriteDataMode::Frequency(n) => {
                if solver.sweep_count % n == 0 || solver.sweep_count == 0 {
                    println!();
                    self.write_data_from_steps(solver);
                }
            }
            WriteDataMode::ListOfSteps(list) => {
                if list.contains(&solver.sweep_count) || solver.sweep_count == 0 {
                    println!();
                    self.write_data_from_steps(solver);
                }
            }
        }
    }

    pub fn write_data_from_steps(&self, solver: &Solver) {
        let data_path = Path::new(crate::io::DATA_PATH);
        let step_path = data_path.join(&solver.sweep_count.to_string());
        if let Err(e) = fs::create_dir_all(&step_path) {
            eprintln!(
                "Error while creating the sweep {} directory: {e}.",
                &solver.sweep_count
            );
            process::exit(1);
        };
        let path = step_path.join(crate::io::POTENTIAL_FILE);
        println!(
            "\nWriting {} for sweep {}.\n",
            crate::io::POTENTIAL_FILE.yellow().bold(),
            &solver.sweep_count.to_string().yellow().bold()
        );
        if let Err(e) = write_potential(solver, path) {
            eprintln!("Error while writing the potential file: {e}.");
            process::exit(1);
        };
    }

    pub fn write_results(&self, solver: &Solver) {
        self.write_data_from_steps(solver);
        self.write_vtk_from_steps(solver);
        if let Err(e) = self.write_post_processing(
            solver,
            super::post::compute_mean_potential,
            "mean_potential.dat",
        ) {
            eprintln!("Error while writing the mean potential file: {e}.");
            process::exit(1);
        };
        if let Err(e) = self.write_post_processing(
            solver,
            super::post::compute_potential_extrema,
            "potential_extrema.dat",
        ) {
            eprintln!("Error while writing the potential extrema file: {e}.");
            process::exit(1);
        };
    }

    pub fn write_vtk_from_steps(&self, solver: &Solver) {
        let vtk_files_path = Path::new(crate::io::VTK_PATH);
        let case_name = self.case_name.replace(" ", "_").to_lowercase();
        let path_str = format!("{}_results_{:08}.vtk", case_name, &solver.sweep_count);
        let path = vtk_files_path.join(&path_str);
        println!(
            "\nWriting {} for sweep {}.\n",
            path_str.yellow().bold(),
            &solver.sweep_count.to_string().yellow().bold()
        );
        if let Err(e) = write_vtk(&solver.lattice, path) {
            eprintln!("Error while writing the vtk file: {e}.");
            process::exit(1);
        };
    }

    pub fn write_post_processing<F>(
        &self,
        solver: &Solver,
        function: F,
        file_name: &str,
    ) -> io::Result<()>
    where
        F: Fn(&Lattice) -> Vec<crate::post::PostResult>,
    {
        let post_results = &function(&solver.lattice);
        let post_processing_path = Path::new(crate::io::POST_PROCESSING_PATH);
        let path = post_processing_path.join(file_name);
        let write_header = !path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if write_header {
            write!(file, "{:>8}", "sweep")?;
            for post_result in post_results {
                write!(file, " {:>16}", post_result.name)?;
            }
            writeln!(file)?;
        }
        write!(file, "{:>8}", solver.sweep_count)?;
        for post_result in post_results {
            write!(file, " {:>16.8e}", post_result.value)?;
        }
        writeln!(file)?;
        Ok(())
    }

    fn create_script_for_error_graph(&self) -> io::Result<()> {
        let post_processing_path = Path::new(crate::io::POST_PROCESSING_PATH);
        let path = post_processing_path.join(crate::io::ERROR_GRAPH_FILE);
        let mut file = File::create(&path)?;
        let path_str = path.to_str().unwrap();
        println!(
            "Creating the error graph script file: {}.\n",
            path_str.yellow().bold()
        );
        writeln!(
            file,
            r#"set title "{case_name}"
    set ylabel "Maximum error"
    set xlabel "Sweeps"
    set grid
    set logscale y
    set yrange [{tolerance}:]
    set ytics format "%L"
    set mxtics 5
    set terminal push
    set terminal pngcairo font "courier"
    set output "fig_{case_name_prefix}_error.png"
    plot "../data/error_history.dat" u 1:2 t "error_max" w l
    set terminal pdfcairo font "courier"
    set output "fig_{case_name_prefix}_error.pdf"
    replot
    set terminal pop
    set output"#,
            case_name = self.case_name,
            tolerance = self.tolerance,
            case_name_prefix = self.case_name.replace(" ", "_").to_lowercase(),
        )?;
        Ok(())
    }

    fn create_script_for_live_error_graph(&self) -> io::Result<()> {
        let post_processing_path = Path::new(crate::io::POST_PROCESSING_PATH);
        let path = post_processing_path.join(crate::io::LIVE_ERROR_GRAPH_FILE);
        let mut file = File::create(&path)?;
        let path_str = path.to_str().unwrap();
        println!(
            "Creating the live error graph script: {}.\n",
            path_str.yellow().bold()
        );
        writeln!(
            file,
            r#"set title "{case_name}"
    set ylabel "Maximum error"
    set xlabel "Sweeps"
    set grid
    set logscale y
    set yrange [{tolerance}:]
    set ytics format "%L"
    set mxtics 5
    set terminal push
    set terminal qt font "courier,12"
    bind "q" "true=0"
    true = 1
    while (true) {{
    plot "../data/error_history.dat" u 1:2 t "error_max" w l lw 2
    pause 1
    }}
    set terminal pop"#,
            case_name = self.case_name,
            tolerance = self.tolerance,
        )?;
        Ok(())
    }
}

impl Solver {
    pub fn build_case_conditions() -> io::Result<Solver> {
        let case_conditions_path =
            Path::new(crate::io::PRE_PROCESSING_PATH).join(crate::io::CASE_CONDITIONS_FILE);
        let case_conditions_path_str = case_conditions_path.to_str().unwrap();
        if case_conditions_path.exists() {
            println!(
                "Reading the case conditions file: {}.\n",
                case_conditions_path_str.yellow().bold()
            );
        } else {
            let default_case_conditions = String::from(
                r#"nx                               = 256
ny                               = 256

left_strength                    = 1.0
right_strength                   = 0.0
up_strength                      = 0.0
bottom_strength                  = 0.0

interior_default                 = 0.0
sor_coef                         = 1.0
"#,
            );
            let mut file = File::create(&case_conditions_path)?;
            println!(
                "Creating the default case conditions file: {}.\n",
                case_conditions_path_str.yellow().bold()
            );
            write!(file, "{}", default_case_conditions)?;
        }
        let conditions = crate::io::read_case_conditions()?;
        let nx = conditions["nx"].parse::<usize>().unwrap();
        let ny = conditions["ny"].parse::<usize>().unwrap();
        let strengths = FaceStrengths::from_conditions(&conditions);
        let interior_default = conditions
            .get("interior_default")
            .map(|value| value.parse::<Float>().unwrap())
            .unwrap_or(INTERIOR_DEFAULT_2D);
        let mut sor_coef = conditions
            .get("sor_coef")
            .map(|value| value.parse::<Float>().unwrap())
            .unwrap_or(SOR_COEF);
        if sor_coef < SOR_COEF_MIN || sor_coef > SOR_COEF_MAX {
            println!(
                "The sor_coef {} lies outside [{}, {}] and was clamped.\n",
                sor_coef.to_string().yellow().bold(),
                SOR_COEF_MIN,
                SOR_COEF_MAX
            );
            sor_coef = sor_coef.clamp(SOR_COEF_MIN, SOR_COEF_MAX);
        }
        let lattice = match Lattice::new(nx, ny, strengths, interior_default) {
            Ok(lattice) => lattice,
            Err(e) => {
                eprintln!("Error while building the lattice: {e}.");
                process::exit(1);
            }
        };
        Ok(Solver::new(lattice, sor_coef))
    }
}

fn write_potential<P>(solver: &Solver, path: P) -> io::Result<()>
where
    P: AsRef<Path>,
{
    let mut file = File::create(path)?;
    writeln!(file, "{:>16}", "potential")?;
    for &potential in solver.potentials() {
        writeln!(file, "{:>16.8e}", potential)?;
    }
    Ok(())
}

fn write_vtk<P>(lattice: &Lattice, path: P) -> io::Result<()>
where
    P: AsRef<Path>,
{
    let mut file = File::create(path)?;
    writeln!(file, "# vtk DataFile Version 3.0")?;
    writeln!(file, "Laplace potential field")?;
    writeln!(file, "ASCII")?;
    writeln!(file, "DATASET STRUCTURED_GRID")?;
    writeln!(file, "DIMENSIONS {} {} 1", lattice.nx, lattice.ny)?;
    writeln!(file, "POINTS {} float", lattice.nx * lattice.ny)?;
    for j in 0..lattice.ny {
        for i in 0..lattice.nx {
            writeln!(
                file,
                "{:>.4e} {:>.4e} {:>.4e}",
                (i as Float) / (lattice.nx as Float),
                (j as Float) / (lattice.ny as Float),
                0.0
            )?;
        }
    }
    writeln!(file, "POINT_DATA {}", lattice.nx * lattice.ny)?;
    writeln!(file, "SCALARS potential float 1")?;
    writeln!(file, "LOOKUP_TABLE default")?;
    for j in 0..lattice.ny {
        for i in 0..lattice.nx {
            writeln!(file, "{:>.8e}", lattice.get_cell(&[i, j]).potential)?;
        }
    }
    Ok(())
}
