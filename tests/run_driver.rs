use std::fs;
use std::path::PathBuf;
use swarm_flow::io::{
    CONFIGURATION_FILE, FIGURES_PATH, OBSTACLES_FILE, PRESSURE_PATH, VELOCITY_PATH, VTK_PATH,
};
use swarm_flow::obstacle::{read_obstacles, Obstacle};
use swarm_flow::post::vtk::run_vtk_post_processing;
use swarm_flow::snapshot::{read_centered, read_staggered};
use swarm_flow::solver::StaggeredSolver;
use swarm_flow::{Configuration, Simulation};

fn scratch_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "swarm_flow_{name}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

fn count_entries(path: PathBuf) -> usize {
    fs::read_dir(path).unwrap().count()
}

#[test]
fn zero_steps_write_configuration_only() {
    let root = scratch_root("zero_steps");
    let configuration = Configuration {
        length_x: 4.0,
        length_y: 2.0,
        resolution: (20, 10),
        total_time: 0,
        ..Configuration::default()
    };
    let simulation = Simulation::with_obstacles(configuration.clone(), Vec::new(), StaggeredSolver).unwrap();
    let summary = simulation.run(&root).unwrap();

    assert_eq!(summary.steps, 0);
    assert!(summary
        .run_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("run_"));
    let written = fs::read_to_string(summary.run_path.join(CONFIGURATION_FILE)).unwrap();
    assert_eq!(written, configuration.to_file_contents());
    assert_eq!(count_entries(summary.run_path.join(FIGURES_PATH)), 0);
    assert_eq!(count_entries(summary.run_path.join(VELOCITY_PATH)), 0);
    assert_eq!(count_entries(summary.run_path.join(PRESSURE_PATH)), 0);
    assert!(summary.run_path.join("post_processing/porosity.dat").exists());
    assert!(!summary.run_path.join("residuals.dat").exists());
}

#[test]
fn short_run_writes_every_step() {
    let root = scratch_root("short_run");
    let configuration = Configuration {
        length_x: 16.0,
        length_y: 3.2,
        resolution: (160, 120),
        total_time: 2,
        ..Configuration::default()
    };
    let obstacles = vec![Obstacle::new([12.0, 1.6], 0.4)];
    let mut simulation =
        Simulation::with_obstacles(configuration, obstacles.clone(), StaggeredSolver).unwrap();
    simulation.figure_width = 160;
    let summary = simulation.run(&root).unwrap();
    let run_path = summary.run_path.clone();

    for time in ["0.000", "0.050"] {
        assert!(run_path
            .join(FIGURES_PATH)
            .join(format!("timestep_{time}.jpg"))
            .exists());
        assert!(run_path.join(VELOCITY_PATH).join(time).exists());
        assert!(run_path.join(PRESSURE_PATH).join(time).exists());
    }
    let residuals = fs::read_to_string(run_path.join("residuals.dat")).unwrap();
    assert_eq!(residuals.lines().count(), 3);
    let max_divergence =
        fs::read_to_string(run_path.join("post_processing/max_divergence.dat")).unwrap();
    assert_eq!(max_divergence.lines().count(), 3);

    let velocity = read_staggered(run_path.join(VELOCITY_PATH).join("0.050")).unwrap();
    assert_eq!(velocity, summary.velocity);
    let pressure = read_centered(run_path.join(PRESSURE_PATH).join("0.050")).unwrap();
    assert_eq!(pressure, summary.pressure);
    assert_eq!(read_obstacles(run_path.join(OBSTACLES_FILE)).unwrap(), obstacles);

    let written = run_vtk_post_processing(&run_path).unwrap();
    assert_eq!(written.len(), 3);
    let cell_types = fs::read_to_string(run_path.join(VTK_PATH).join("cell_type.vtk")).unwrap();
    let solid_cells = cell_types
        .lines()
        .skip_while(|line| !line.starts_with("LOOKUP_TABLE"))
        .skip(1)
        .filter(|line| *line == "1")
        .count();
    assert!(solid_cells > 0);
    assert_eq!(solid_cells, simulation.mask.number_of_solid_cells());
    assert!(run_path.join(VTK_PATH).join("results_0.000.vtk").exists());
    assert!(run_path.join(VTK_PATH).join("results_0.050.vtk").exists());
}
