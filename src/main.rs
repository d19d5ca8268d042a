use clap::{arg, command, value_parser, Command};
use colored::*;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use swarm_flow as flow;

fn run(case: Option<&PathBuf>, output: &Path) -> flow::Result<()> {
    let configuration = match case {
        Some(path) => flow::io::build_case_setup(path)?,
        None => flow::Configuration::default(),
    };
    let simulation = flow::Simulation::new(configuration)?;
    let summary = simulation.run(output)?;
    println!(
        "\nFinished {} steps. Results in {}.",
        summary.steps.to_string().yellow().bold(),
        summary.run_path.display().to_string().yellow().bold()
    );
    Ok(())
}

fn post(run_path: &Path) -> flow::Result<()> {
    let written = flow::post::vtk::run_vtk_post_processing(run_path)?;
    println!(
        "Wrote {} vtk files.",
        written.len().to_string().yellow().bold()
    );
    Ok(())
}

fn main() {
    let matches = command!()
        .arg(
            arg!(
                -n --number_of_threads <NUMBER_OF_THREADS> "Sets the number of threads"
            )
            .required(false)
            .value_parser(value_parser!(usize)),
        )
        .subcommand(
            Command::new("run")
                .about("Runs the simulation")
                .arg(
                    arg!(
                        -c --case <FILE> "Case setup file; created with the defaults when missing"
                    )
                    .required(false)
                    .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(
                        -o --output <DIR> "Directory receiving the run_<timestamp> folder"
                    )
                    .required(false)
                    .default_value(".")
                    .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("post")
                .about("Runs the post-processing: writes the vtk files of a finished run")
                .arg(
                    arg!(
                        -r --run <DIR> "Run directory written by the run subcommand"
                    )
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand_required(true)
        .get_matches();

    if let Some(&num_threads) = matches.get_one::<usize>("number_of_threads") {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            eprintln!("{} {e}.", "Error while building the thread pool:".red().bold());
            std::process::exit(1);
        }
    }

    let result = match matches.subcommand() {
        Some(("run", sub_matches)) => {
            let output = sub_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));
            run(sub_matches.get_one::<PathBuf>("case"), &output)
        }
        Some(("post", sub_matches)) => match sub_matches.get_one::<PathBuf>("run") {
            Some(run_path) => post(run_path),
            None => Ok(()),
        },
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("{} {e}.", "Error:".red().bold());
        std::process::exit(1);
    }
}
