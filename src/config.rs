use crate::error::{FlowError, Result};
use crate::global_variables::*;
use crate::grid::Domain;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

pub const PARAMETER_NAMES: [&'static str; 11] = [
    "length_x",
    "length_y",
    "resolution",
    "swarm_num_x",
    "swarm_num_y",
    "swarm_member_rad",
    "inflow_freq",
    "inflow_amplitude",
    "viscosity",
    "dt",
    "total_time",
];

/// Scalar parameters of a run. Built once and only read afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    pub length_x: Float,
    pub length_y: Float,
    pub resolution: (usize, usize),
    pub swarm_num_x: usize,
    pub swarm_num_y: usize,
    pub swarm_member_rad: Float,
    pub inflow_freq: Float,
    pub inflow_amplitude: Float,
    pub viscosity: Float,
    pub dt: Float,
    /// Number of time steps, not a duration.
    pub total_time: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            length_x: LENGTH_X,
            length_y: LENGTH_Y,
            resolution: RESOLUTION,
            swarm_num_x: SWARM_NUM_X,
            swarm_num_y: SWARM_NUM_Y,
            swarm_member_rad: SWARM_MEMBER_RAD,
            inflow_freq: INFLOW_FREQ,
            inflow_amplitude: INFLOW_AMPLITUDE,
            viscosity: VISCOSITY,
            dt: DELTA_T,
            total_time: TOTAL_TIME,
        }
    }
}

impl Configuration {
    pub fn from_setup(parameters: &HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();
        let resolution = match parameters.get("resolution") {
            Some(value) => parse_resolution(value)?,
            None => defaults.resolution,
        };
        let configuration = Self {
            length_x: parse_or(parameters, "length_x", defaults.length_x)?,
            length_y: parse_or(parameters, "length_y", defaults.length_y)?,
            resolution,
            swarm_num_x: parse_or(parameters, "swarm_num_x", defaults.swarm_num_x)?,
            swarm_num_y: parse_or(parameters, "swarm_num_y", defaults.swarm_num_y)?,
            swarm_member_rad: parse_or(parameters, "swarm_member_rad", defaults.swarm_member_rad)?,
            inflow_freq: parse_or(parameters, "inflow_freq", defaults.inflow_freq)?,
            inflow_amplitude: parse_or(parameters, "inflow_amplitude", defaults.inflow_amplitude)?,
            viscosity: parse_or(parameters, "viscosity", defaults.viscosity)?,
            dt: parse_or(parameters, "dt", defaults.dt)?,
            total_time: parse_or(parameters, "total_time", defaults.total_time)?,
        };
        configuration.validate()?;
        Ok(configuration)
    }

    /// Strict variant for the `configuration.txt` of a finished run, where
    /// every parameter must be present.
    pub fn from_run_file(parameters: &HashMap<String, String>) -> Result<Self> {
        if let Some(name) = PARAMETER_NAMES
            .iter()
            .find(|name| !parameters.contains_key(**name))
        {
            return Err(FlowError::MissingParameter(name.to_string()));
        }
        Self::from_setup(parameters)
    }

    pub fn validate(&self) -> Result<()> {
        let (nx, ny) = self.resolution;
        if nx == 0 || ny == 0 {
            return Err(FlowError::InvalidConfiguration(format!(
                "resolution must be positive along both axes, got ({nx}, {ny})"
            )));
        }
        let positive = |value: Float| value > 0.0 && value.is_finite();
        let non_negative = |value: Float| value >= 0.0 && value.is_finite();
        if !(positive(self.length_x) && positive(self.length_y)) {
            return Err(FlowError::InvalidConfiguration(format!(
                "domain size must be positive, got {} x {}",
                self.length_x, self.length_y
            )));
        }
        if !positive(self.dt) {
            return Err(FlowError::InvalidConfiguration(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if !(non_negative(self.viscosity) && non_negative(self.swarm_member_rad)) {
            return Err(FlowError::InvalidConfiguration(format!(
                "viscosity and swarm_member_rad must be finite and not negative, got {} and {}",
                self.viscosity, self.swarm_member_rad
            )));
        }
        if !self.inflow_amplitude.is_finite() {
            return Err(FlowError::InvalidConfiguration(format!(
                "inflow_amplitude must be finite, got {}",
                self.inflow_amplitude
            )));
        }
        Ok(())
    }

    pub fn domain(&self) -> Domain {
        let (nx, ny) = self.resolution;
        Domain::new(self.length_x, self.length_y, nx, ny)
    }

    /// `name=value` lines in the order of `PARAMETER_NAMES`.
    pub fn to_file_contents(&self) -> String {
        let (nx, ny) = self.resolution;
        let values: [String; 11] = [
            self.length_x.to_string(),
            self.length_y.to_string(),
            format!("({nx}, {ny})"),
            self.swarm_num_x.to_string(),
            self.swarm_num_y.to_string(),
            self.swarm_member_rad.to_string(),
            self.inflow_freq.to_string(),
            self.inflow_amplitude.to_string(),
            self.viscosity.to_string(),
            self.dt.to_string(),
            self.total_time.to_string(),
        ];
        PARAMETER_NAMES
            .iter()
            .zip(values.iter())
            .map(|(name, value)| format!("{name}={value}\n"))
            .collect()
    }

    pub fn default_case_setup() -> String {
        let defaults = Self::default();
        let (nx, ny) = defaults.resolution;
        format!(
            r#"# {CASE_NAME} case setup

length_x                         = {length_x}
length_y                         = {length_y}
resolution                       = {nx} {ny}

swarm_num_x                      = {swarm_num_x}
swarm_num_y                      = {swarm_num_y}
swarm_member_rad                 = {swarm_member_rad}

inflow_freq                      = {inflow_freq}
inflow_amplitude                 = {inflow_amplitude}

viscosity                        = {viscosity}
dt                               = {dt}
total_time                       = {total_time}
"#,
            length_x = defaults.length_x,
            length_y = defaults.length_y,
            swarm_num_x = defaults.swarm_num_x,
            swarm_num_y = defaults.swarm_num_y,
            swarm_member_rad = defaults.swarm_member_rad,
            inflow_freq = defaults.inflow_freq,
            inflow_amplitude = defaults.inflow_amplitude,
            viscosity = defaults.viscosity,
            dt = defaults.dt,
            total_time = defaults.total_time,
        )
    }
}

fn parse_or<T>(parameters: &HashMap<String, String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
{
    match parameters.get(name) {
        Some(value) => parse_value(name, value),
        None => Ok(default),
    }
}

pub(crate) fn parse_value<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|_| FlowError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
}

fn parse_resolution(value: &str) -> Result<(usize, usize)> {
    let cleaned = value.replace(['(', ')', ','], " ");
    let parts = cleaned
        .split_whitespace()
        .map(|part| parse_value::<usize>("resolution", part))
        .collect::<Result<Vec<usize>>>()?;
    match parts.as_slice() {
        [nx, ny] => Ok((*nx, *ny)),
        _ => Err(invalid("resolution", value)),
    }
}

fn invalid(name: &str, value: impl Display) -> FlowError {
    FlowError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::extract_parameters;

    #[test]
    fn configuration_file_lists_every_parameter_in_order() {
        let contents = Configuration::default().to_file_contents();
        let names: Vec<&str> = contents
            .lines()
            .map(|line| line.split('=').next().unwrap())
            .collect();
        assert_eq!(names, PARAMETER_NAMES.to_vec());
        assert!(contents.contains("length_x=40\n"));
        assert!(contents.contains("length_y=3.2\n"));
        assert!(contents.contains("resolution=(4000, 320)\n"));
        assert!(contents.contains("viscosity=0.001\n"));
        assert!(contents.contains("dt=0.05\n"));
    }

    #[test]
    fn configuration_file_parses_back() {
        let configuration = Configuration {
            resolution: (64, 32),
            total_time: 3,
            inflow_amplitude: 12.5,
            ..Configuration::default()
        };
        let parameters = extract_parameters(&configuration.to_file_contents());
        let parsed = Configuration::from_setup(&parameters).unwrap();
        assert_eq!(parsed, configuration);
    }

    #[test]
    fn default_case_setup_matches_defaults() {
        let parameters = extract_parameters(&Configuration::default_case_setup());
        let parsed = Configuration::from_setup(&parameters).unwrap();
        assert_eq!(parsed, Configuration::default());
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let mut parameters = HashMap::new();
        parameters.insert(String::from("dt"), String::from("0.01"));
        let parsed = Configuration::from_setup(&parameters).unwrap();
        assert_eq!(parsed.dt, 0.01);
        assert_eq!(parsed.resolution, RESOLUTION);
    }

    #[test]
    fn run_file_needs_every_parameter() {
        let mut parameters = extract_parameters(&Configuration::default().to_file_contents());
        assert!(Configuration::from_run_file(&parameters).is_ok());
        parameters.remove("viscosity");
        assert!(matches!(
            Configuration::from_run_file(&parameters),
            Err(FlowError::MissingParameter(name)) if name == "viscosity"
        ));
    }

    #[test]
    fn rejects_bad_values() {
        let mut parameters = HashMap::new();
        parameters.insert(String::from("swarm_num_x"), String::from("five"));
        assert!(matches!(
            Configuration::from_setup(&parameters),
            Err(FlowError::InvalidParameter { .. })
        ));

        let mut parameters = HashMap::new();
        parameters.insert(String::from("resolution"), String::from("(0, 10)"));
        assert!(matches!(
            Configuration::from_setup(&parameters),
            Err(FlowError::InvalidConfiguration(_))
        ));

        let mut parameters = HashMap::new();
        parameters.insert(String::from("resolution"), String::from("10 20 30"));
        assert!(Configuration::from_setup(&parameters).is_err());
    }

    #[test]
    fn rejects_values_that_are_not_finite() {
        let cases = [
            Configuration {
                viscosity: Float::NAN,
                ..Configuration::default()
            },
            Configuration {
                swarm_member_rad: Float::NAN,
                ..Configuration::default()
            },
            Configuration {
                dt: Float::INFINITY,
                ..Configuration::default()
            },
            Configuration {
                length_x: Float::INFINITY,
                ..Configuration::default()
            },
            Configuration {
                inflow_amplitude: Float::NAN,
                ..Configuration::default()
            },
        ];
        for configuration in cases {
            assert!(matches!(
                configuration.validate(),
                Err(FlowError::InvalidConfiguration(_))
            ));
        }
        assert!(Configuration::default().validate().is_ok());
    }
}
