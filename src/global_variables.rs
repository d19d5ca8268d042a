pub const CASE_NAME: &'static str = "Swarm Flow";

pub type Float = f64;

pub const LENGTH_X: Float = 40.0;

pub const LENGTH_Y: Float = 3.2;

pub const RESOLUTION: (usize, usize) = (4000, 320);

pub const SWARM_NUM_X: usize = 5;

pub const SWARM_NUM_Y: usize = 5;

pub const SWARM_MEMBER_RAD: Float = 0.16;

pub const SWARM_X_RANGE: (Float, Float) = (35.0, 38.0);

pub const INFLOW_FREQ: Float = 1.0;

pub const INFLOW_AMPLITUDE: Float = 30.0;

pub const INFLOW_OFFSET_CELLS: usize = 50;

pub const INFLOW_WIDTH_CELLS: usize = 50;

pub const INFLOW_BOTTOM_MARGIN_CELLS: usize = 50;

pub const INFLOW_TOP_MARGIN_CELLS: usize = 49;

pub const VISCOSITY: Float = 1e-3;

pub const DELTA_T: Float = 0.05;

pub const TOTAL_TIME: usize = 50;

pub const MAX_DIFFUSION_SUBSTEPS: usize = 10_000;

pub const SOLVE_REL_TOL: Float = 1e-5;

pub const SOLVE_ABS_TOL: Float = 1e-5;

pub const SOLVE_MAX_ITER: usize = 100_000;

pub const SYMLOG_LINTHRESH: Float = 0.03;

pub const SYMLOG_LINSCALE: Float = 0.03;

pub const PLOT_ASPECT: Float = 4.0;

pub const FIGURE_WIDTH: u32 = 2000;
