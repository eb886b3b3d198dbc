use clap::{arg, command, value_parser, Command};
use laplace_sor as laplace;
use laplace_sor::Phase;
use rayon::ThreadPoolBuilder;

fn main() {
    let matches = command!()
        .arg(
            arg!(
                -d --dimensions <DIMENSIONS> "Sets the dimension of the solver: 2 or 3"
            )
            .required(true)
            .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(
                -n --number_of_threads <NUMBER_OF_THREADS> "Sets the number of threads: 1, 2, 4, 8, 16 or 32"
            )
            .required(true)
            .value_parser(value_parser!(usize)),
        )
        .subcommand(
            Command::new("run")
                .about("Runs the solver until convergence or the iteration limit")
                .arg(
                    arg!(
                        -a --animated "Writes intermediate fields after every sweep"
                    )
                    .required(false),
                ),
        )
        .subcommand(
            Command::new("relax")
                .about("Applies a single sweep without convergence tracking")
                .arg(
                    arg!(
                        -p --phase <PHASE> "Restricts the sweep to one checkerboard phase: 1 or 2"
                    )
                    .required(false)
                    .value_parser(value_parser!(usize)),
                ),
        )
        .get_matches();

    if let Some(&num_threads) = matches.get_one::<usize>("number_of_threads") {
        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .unwrap();
    }

    match matches.subcommand() {
        Some(("run", sub_matches)) => {
            if let Some(dimensions) = matches.get_one::<usize>("dimensions") {
                match dimensions {
                    2 => match sub_matches.get_one::<bool>("animated").unwrap() {
                        false => laplace::d2::run(),
                        true => laplace::d2::run_animated(),
                    },
                    3 => match sub_matches.get_one::<bool>("animated").unwrap() {
                        false => laplace::d3::run(),
                        true => laplace::d3::run_animated(),
                    },
                    _ => {
                        eprintln!(
                            "Error: the number of dimensions {dimensions} is not valid. Please, use 2 or 3."
                        );
                        std::process::exit(1);
                    }
                }
            }
        }
        Some(("relax", sub_matches)) => {
            let phase = match sub_matches.get_one::<usize>("phase").copied() {
                None => None,
                Some(1) => Some(Phase::One),
                Some(2) => Some(Phase::Two),
                Some(phase) => {
                    eprintln!("Error: the phase {phase} is not valid. Please, use 1 or 2.");
                    std::process::exit(1);
                }
            };
            if let Some(dimensions) = matches.get_one::<usize>("dimensions") {
                match dimensions {
                    2 => laplace::d2::run_relax(phase),
                    3 => laplace::d3::run_relax(phase),
                    _ => {
                        eprintln!(
                            "Error: the number of dimensions {dimensions} is not valid. Please, use 2 or 3."
                        );
                        std::process::exit(1);
                    }
                }
            }
        }
        _ => {}
    }
}
