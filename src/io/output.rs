//! About the output files.
use crate::common::error::{Result, SimulationError};
use crate::pes_exploration::state::State;
use ndarray::Array1;
use std::path::{Path, PathBuf};





const TRAJECTORY_HEADER: [&str; 8] =
[
    "index",
    "position",
    "temperature",
    "total_system_energy",
    "total_potential_energy",
    "total_kinetic_energy",
    "force",
    "velocity",
];



// Missing and non-finite values both become empty cells
fn format_value(value: Option<f64>) -> String
{
    match value
    {
        Some(x) if x.is_finite() => format!("{}", x),
        _ => String::new(),
    }
}

fn format_array(value: Option<&Array1<f64>>) -> String
{
    match value
    {
        None => String::new(),
        Some(x) if x.len() == 1 => format_value(Some(x[0])),
        Some(x) =>
        {
            let components: Vec<String> = x.iter().map(|v| format_value(Some(*v))).collect();
            format!("[{}]", components.join(", "))
        },
    }
}





/// Write the trajectory as a CSV table with a header row and one row per snapshot
///
/// # Parameters
/// ```text
/// trajectory: the snapshots in simulation order
/// out_path: the CSV file to create; its directory must already exist
/// ```
///
/// # Examples
/// ```text
/// let path: PathBuf = write_trajectory(system.trajectory(), "out/traj.csv")?;
/// ```
pub fn write_trajectory<T: AsRef<Path>>(trajectory: &[State], out_path: T) -> Result<PathBuf>
{
    let out_path: &Path = out_path.as_ref();
    let dir: &Path = match out_path.parent()
    {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if !dir.is_dir()
    {
        return Err(SimulationError::OutputDirectory(dir.to_path_buf()))
    }

    let mut writer = csv::Writer::from_path(out_path)?;
    writer.write_record(TRAJECTORY_HEADER)?;
    for (i, state) in trajectory.iter().enumerate()
    {
        writer.write_record(&[
            i.to_string(),
            format_array(Some(state.position())),
            format_value(Some(state.temperature())),
            format_value(Some(state.total_system_energy())),
            format_value(Some(state.total_potential_energy())),
            format_value(state.total_kinetic_energy()),
            format_array(state.force()),
            format_array(state.velocity()),
        ])?;
    }
    writer.flush()?;

    Ok(out_path.to_path_buf())
}
