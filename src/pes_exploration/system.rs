//! About the system: the owner of the live quantities, the trajectory, and the coupled conditions,
//! which drives a sampler over a potential energy surface.





use crate::common::constants::{DEFAULT_CONDITION_DT, GAS_CONSTANT, N_PARTICLES, RANDOM_POSITION_HIGH, RANDOM_POSITION_LOW};
use crate::common::error::{check_len, Result, SimulationError};
use crate::io::input::{SimulatePara, SystemPara};
use crate::io::output;
use crate::matrix;
use crate::pes_exploration::state::{LiveState, State};
use crate::pes_exploration::traits::{Condition, Coupling, Potential, Propagation, Sampler};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array1;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};





/// An entry of the condition list of a system.
///
/// `Potential` stands for the potential of the system acting in its condition role
/// (a bias potential), so the same object is both queried for energies and stepped as a condition.
pub enum ConditionSlot
{
    Coupled(Box<dyn Condition>),
    Potential,
}





fn couple_condition(condition: &mut dyn Condition, coupling: Coupling) -> Result<()>
{
    if let Some(n_dimensions) = condition.n_dimensions()
    {
        if n_dimensions != coupling.n_dimensions
        {
            return Err(SimulationError::ConditionType
            {
                name: condition.name().to_string(),
                reason: format!("it is defined on {} dimension(s), the system on {}", n_dimensions, coupling.n_dimensions),
            })
        }
    }
    condition.couple_system(coupling);

    Ok(())
}

fn check_temperature(temperature: f64) -> Result<()>
{
    if temperature.is_finite() && temperature >= 0.0
    {
        Ok(())
    }
    else
    {
        Err(SimulationError::Configuration(format!("temperature must be a non-negative number, got {}", temperature)))
    }
}

fn check_mass(mass: f64) -> Result<()>
{
    if mass.is_finite() && mass > 0.0
    {
        Ok(())
    }
    else
    {
        Err(SimulationError::Configuration(format!("mass must be a positive number, got {}", mass)))
    }
}





/// The system managing a single particle on a potential energy surface, the sampler exploring it,
/// the conditions applied after every step, and the resulting trajectory.
///
/// # Fields
/// ```text
/// potential: the potential energy surface to be explored
/// sampler: the method stepping the particle
/// conditions: the coupled conditions, applied in order after every sampler step
/// live: the current (mutable) quantities of the system
/// initial_position: the position the system was last initialised at
/// current_state: the snapshot of the live quantities at the last recompute
/// trajectory: the retained snapshots in simulation order
/// n_dimensions: the dimensionality declared by the potential
/// n_states: the number of discrete states declared by the potential (1 if none)
/// ```
pub struct System<P: Potential, S: Sampler>
{
    potential: P,
    sampler: S,
    conditions: Vec<ConditionSlot>,
    live: LiveState,
    initial_position: Array1<f64>,
    current_state: State,
    trajectory: Vec<State>,
    n_dimensions: usize,
    n_states: usize,
    verbose: bool,
    rng: StdRng,
}





impl<P: Potential, S: Sampler> System<P, S>
{
    /// Construct and initialise a system
    ///
    /// # Parameters
    /// ```text
    /// potential: the potential energy surface, declaring the dimensionality of the system
    /// sampler: the sampling method; Newtonian and Langevin samplers get random initial velocities
    /// conditions: the conditions to couple, applied in the given order
    /// para: temperature, mass, starting position, verbosity, and random seed
    /// ```
    ///
    /// # Examples
    /// ```text
    /// let s = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.01), Vec::new(), &SystemPara::default())?;
    /// ```
    pub fn new(potential: P, sampler: S, conditions: Vec<Box<dyn Condition>>, para: &SystemPara) -> Result<Self>
    {
        let n_dimensions: usize = potential.n_dimensions();
        if n_dimensions == 0
        {
            return Err(SimulationError::Configuration(String::from("the potential must declare a positive number of dimensions")))
        }
        let n_states: usize = match potential.n_states()
        {
            Some(0) => return Err(SimulationError::Configuration(String::from("the potential must declare a positive number of states"))),
            Some(n_states) => n_states,
            None => 1,
        };
        check_temperature(para.temperature)?;
        check_mass(para.mass)?;

        let rng: StdRng = match para.seed
        {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Placeholder quantities, all overwritten by the initialisation below
        let live: LiveState = LiveState
        {
            position: Array1::zeros(n_dimensions),
            velocity: None,
            force: None,
            temperature: para.temperature,
            target_temperature: para.temperature,
            mass: para.mass,
            total_potential_energy: 0.0,
            total_kinetic_energy: None,
            total_system_energy: 0.0,
            step: 0,
        };
        let current_state: State = live.snapshot();

        let mut s: System<P, S> = System
        {
            potential,
            sampler,
            conditions: conditions.into_iter().map(ConditionSlot::Coupled).collect(),
            live,
            initial_position: Array1::zeros(n_dimensions),
            current_state,
            trajectory: Vec::new(),
            n_dimensions,
            n_states,
            verbose: para.verbose,
            rng,
        };

        let init_velocity: bool = s.sampler.kind().seeds_velocity();
        let start_position: Option<Array1<f64>> = para.start_position.clone().map(Array1::from);
        s.initialise(true, true, init_velocity, start_position)?;

        s.couple_conditions()?;

        if s.verbose
        {
            info!(n_dimensions, n_states, sampler = ?s.sampler.kind(), n_conditions = s.conditions.len(), "System constructed.");
        }

        Ok(s)
    }

    /// Construct a system with the default parameters and no conditions
    pub fn with_defaults(potential: P, sampler: S) -> Result<Self>
    {
        Self::new(potential, sampler, Vec::new(), &SystemPara::default())
    }



    /// Register a bias potential as a condition (once), and couple every condition to the system.
    /// Each condition gets the step size of the sampler, or 1 if the sampler has none.
    /// Calling it again recouples without duplicating any entry.
    pub fn couple_conditions(&mut self) -> Result<()>
    {
        let coupling: Coupling = Coupling
        {
            n_dimensions: self.n_dimensions,
            dt: self.sampler.dt().unwrap_or(DEFAULT_CONDITION_DT),
        };

        let potential_registered: bool = self.conditions.iter().any(|slot| matches!(slot, ConditionSlot::Potential));
        if !potential_registered && self.potential.as_condition_mut().is_some()
        {
            self.conditions.push(ConditionSlot::Potential);
        }

        for slot in self.conditions.iter_mut()
        {
            match slot
            {
                ConditionSlot::Coupled(condition) => couple_condition(condition.as_mut(), coupling)?,
                ConditionSlot::Potential =>
                {
                    if let Some(condition) = self.potential.as_condition_mut()
                    {
                        couple_condition(condition, coupling)?;
                    }
                },
            }
        }

        Ok(())
    }

    /// Couple a further condition and append it to the condition list
    pub fn add_condition(&mut self, mut condition: Box<dyn Condition>) -> Result<()>
    {
        let coupling: Coupling = Coupling
        {
            n_dimensions: self.n_dimensions,
            dt: self.sampler.dt().unwrap_or(DEFAULT_CONDITION_DT),
        };
        couple_condition(condition.as_mut(), coupling)?;
        self.conditions.push(ConditionSlot::Coupled(condition));

        Ok(())
    }





    /// Initialise the system: optionally discard the trajectory, place the particle, seed the velocities,
    /// then recompute the energies and append the resulting snapshot to the trajectory.
    ///
    /// # Parameters
    /// ```text
    /// withdraw_traj: discard the trajectory first
    /// init_position: (re)place the particle
    /// init_velocity: (re)seed Maxwell-Boltzmann velocities
    /// set_initial_position: place the particle here instead of randomly (only with init_position)
    /// ```
    pub fn initialise(&mut self, withdraw_traj: bool, init_position: bool, init_velocity: bool, set_initial_position: Option<Array1<f64>>) -> Result<()>
    {
        if withdraw_traj
        {
            self.clear_trajectory();
        }

        if init_position
        {
            self.init_position(set_initial_position)?;
        }

        self.update_force();

        if init_velocity
        {
            self.init_velocities();
        }

        self.live.temperature = self.live.target_temperature;
        self.live.step = 0;
        self.update_system_properties();
        self.update_current_state();
        self.trajectory.push(self.current_state.clone());

        debug!(position = ?self.live.position, velocity = ?self.live.velocity, "System initialised.");

        Ok(())
    }

    fn init_position(&mut self, initial_position: Option<Array1<f64>>) -> Result<()>
    {
        let position: Array1<f64> = match initial_position
        {
            Some(position) =>
            {
                check_len("start_position", self.n_dimensions, position.len())?;
                position
            },
            None => self.random_position(),
        };
        self.initial_position = position.clone();
        self.live.position = position;

        Ok(())
    }

    // A potential without force still allows force-free samplers
    fn update_force(&mut self)
    {
        match self.potential.get_force(&self.live.position)
        {
            Ok(force) => self.live.force = Some(force),
            Err(err) =>
            {
                warn!(error = %err, "Could not compute the force of the potential, leaving it undefined.");
                self.live.force = None;
            },
        }
    }

    // One independent draw per degree of freedom, v = sqrt(R*T/m) * N(0, 1)
    fn init_velocities(&mut self)
    {
        let n_dof: usize = self.n_states * self.n_dimensions;
        let scale: f64 = (GAS_CONSTANT * self.live.target_temperature / self.live.mass).sqrt();
        self.live.velocity = Some(matrix::rand_normal(n_dof, &mut self.rng) * scale);
    }

    /// A position drawn uniformly from [-10, 10) in every dimension
    pub fn random_position(&mut self) -> Array1<f64>
    {
        matrix::rand_uniform(self.n_dimensions, RANDOM_POSITION_LOW, RANDOM_POSITION_HIGH, &mut self.rng)
    }





    /// Recompute the energies and the temperature from the live quantities
    pub fn update_system_properties(&mut self)
    {
        self.update_energies();
        self.update_temperature();
    }

    /// Rebuild the current snapshot from the live quantities
    pub fn update_current_state(&mut self)
    {
        self.current_state = self.live.snapshot();
    }

    // No estimator from the velocities: the temperature is the configured one
    fn update_temperature(&mut self)
    {
        self.live.temperature = self.live.target_temperature;
    }

    fn update_energies(&mut self)
    {
        self.live.total_potential_energy = self.potential.get_energy(&self.live.position);
        self.live.total_kinetic_energy = self.live.kinetic_energy();
        self.live.total_system_energy = match self.live.total_kinetic_energy
        {
            Some(kin) => self.live.total_potential_energy + kin,
            None => self.live.total_potential_energy,
        };
    }





    /// Run the simulation with the default parameters for the given number of steps
    pub fn simulate(&mut self, steps: usize) -> Result<State>
    {
        let para: SimulatePara = SimulatePara
        {
            verbosity: self.verbose,
            ..SimulatePara::with_steps(steps)
        };
        self.simulate_with(&para)
    }

    /// Run the simulation: for every step propagate, apply the conditions, recompute, and keep every
    /// `save_every_state`-th snapshot. The final snapshot is always appended once after the loop.
    /// If the sampler or a condition fails, the trajectory keeps the steps completed so far.
    ///
    /// # Parameters
    /// ```text
    /// para: the number of steps, the trajectory handling, and the progress bar settings
    /// ```
    ///
    /// # Examples
    /// ```text
    /// let last: State = s.simulate_with(&SimulatePara { steps: 1000, save_every_state: 10, ..Default::default() })?;
    /// ```
    pub fn simulate_with(&mut self, para: &SimulatePara) -> Result<State>
    {
        if para.save_every_state == 0
        {
            return Err(SimulationError::Configuration(String::from("save_every_state must be at least 1")))
        }

        if para.init_system
        {
            self.init_position(None)?;
            self.update_force();
            if self.sampler.kind().seeds_velocity()
            {
                self.init_velocities();
            }
            self.update_system_properties();
            self.update_current_state();
        }

        if para.withdraw_traj
        {
            self.trajectory.clear();
            self.trajectory.push(self.current_state.clone());
        }

        self.update_system_properties();
        self.update_current_state();

        let progress: ProgressBar = match para.verbosity
        {
            true =>
            {
                let progress: ProgressBar = ProgressBar::new(para.steps as u64).with_prefix(para.progress_prefix.clone());
                if let Ok(style) = ProgressStyle::with_template("{prefix}: {bar:40} {pos}/{len} [{elapsed_precise}<{eta_precise}]")
                {
                    progress.set_style(style);
                }
                progress
            },
            false => ProgressBar::hidden(),
        };
        if self.verbose
        {
            info!(steps = para.steps, save_every_state = para.save_every_state, "Simulation started.");
        }

        for step in 0..para.steps
        {
            self.live.step = step;

            // Do one simulation step
            self.propagate()?;

            // Apply restraints, constraints, and biases
            self.apply_conditions()?;

            // Calculate the new energies and build the new snapshot
            self.update_system_properties();
            self.update_current_state();

            if (step % para.save_every_state == 0) && (step != para.steps - 1)
            {
                self.trajectory.push(self.current_state.clone());
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        self.trajectory.push(self.current_state.clone());
        if self.verbose
        {
            info!(trajectory_len = self.trajectory.len(), total_system_energy = self.current_state.total_system_energy(), "Simulation finished.");
        }

        Ok(self.current_state.clone())
    }

    /// Do a single sampler step and overwrite position, velocity, and force with its result.
    /// Neither recomputes the energies nor touches the trajectory.
    pub fn propagate(&mut self) -> Result<Propagation>
    {
        let propagation: Propagation = self.sampler.step(&self.potential, &self.live)?;
        self.check_quantities(&propagation.position, propagation.velocity.as_ref(), propagation.force.as_ref())?;

        self.live.position = propagation.position.clone();
        self.live.velocity = propagation.velocity.clone();
        self.live.force = propagation.force.clone();

        Ok(propagation)
    }

    /// Apply every coupled condition once, in list order
    pub fn apply_conditions(&mut self) -> Result<()>
    {
        for slot in self.conditions.iter_mut()
        {
            match slot
            {
                ConditionSlot::Coupled(condition) => condition.apply_coupled(&mut self.live)?,
                ConditionSlot::Potential =>
                {
                    if let Some(condition) = self.potential.as_condition_mut()
                    {
                        condition.apply_coupled(&mut self.live)?;
                    }
                },
            }
        }

        Ok(())
    }

    /// Set the given position, velocity, and force without the sampler, and append the resulting snapshot
    pub fn append_state(&mut self, new_position: Array1<f64>, new_velocity: Option<Array1<f64>>, new_force: Option<Array1<f64>>) -> Result<()>
    {
        self.check_quantities(&new_position, new_velocity.as_ref(), new_force.as_ref())?;
        self.live.position = new_position;
        self.live.velocity = new_velocity;
        self.live.force = new_force;

        self.update_temperature();
        self.update_energies();
        self.update_current_state();
        self.trajectory.push(self.current_state.clone());

        Ok(())
    }

    /// Remove the last snapshot of the trajectory and restore the system to the one before.
    /// With fewer than two snapshots nothing is reverted; returns whether a step was reverted.
    pub fn revert_step(&mut self) -> bool
    {
        if self.trajectory.len() > 1
        {
            self.trajectory.pop();
            if let Some(last) = self.trajectory.last()
            {
                self.current_state = last.clone();
                self.live.restore(last);
            }
            true
        }
        else
        {
            warn!(trajectory_len = self.trajectory.len(), "Could not revert step, as fewer than 2 steps are in the trajectory.");
            false
        }
    }

    /// Delete all snapshots of the trajectory
    pub fn clear_trajectory(&mut self)
    {
        self.trajectory.clear();
    }

    /// Write the trajectory to a CSV file, whose directory must exist
    pub fn write_trajectory<T: AsRef<Path>>(&self, out_path: T) -> Result<PathBuf>
    {
        output::write_trajectory(&self.trajectory, out_path)
    }





    fn check_quantities(&self, position: &Array1<f64>, velocity: Option<&Array1<f64>>, force: Option<&Array1<f64>>) -> Result<()>
    {
        check_len("position", self.n_dimensions, position.len())?;
        if let Some(velocity) = velocity
        {
            check_len("velocity", self.n_states * self.n_dimensions, velocity.len())?;
        }
        if let Some(force) = force
        {
            check_len("force", self.n_dimensions, force.len())?;
        }

        Ok(())
    }

    pub fn set_position(&mut self, position: Array1<f64>) -> Result<()>
    {
        check_len("position", self.n_dimensions, position.len())?;
        if self.trajectory.is_empty()
        {
            self.initial_position = position.clone();
        }
        self.live.position = position;
        self.update_force();
        self.update_energies();
        self.update_current_state();

        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: Option<Array1<f64>>) -> Result<()>
    {
        if let Some(velocity) = &velocity
        {
            check_len("velocity", self.n_states * self.n_dimensions, velocity.len())?;
        }
        self.live.velocity = velocity;
        self.update_energies();
        self.update_current_state();

        Ok(())
    }

    /// Set the target temperature, which is also the instantaneous one
    pub fn set_temperature(&mut self, temperature: f64) -> Result<()>
    {
        check_temperature(temperature)?;
        self.live.target_temperature = temperature;
        self.live.temperature = temperature;
        self.update_energies();
        self.update_current_state();

        Ok(())
    }

    pub fn set_mass(&mut self, mass: f64) -> Result<()>
    {
        check_mass(mass)?;
        self.live.mass = mass;
        self.update_energies();
        self.update_current_state();

        Ok(())
    }

    /// Set all the live quantities at once
    pub fn set_current_state(&mut self, position: Array1<f64>, velocity: Option<Array1<f64>>, force: Option<Array1<f64>>, temperature: f64) -> Result<()>
    {
        self.check_quantities(&position, velocity.as_ref(), force.as_ref())?;
        check_temperature(temperature)?;
        self.live.position = position;
        self.live.velocity = velocity;
        self.live.force = force;
        self.live.temperature = temperature;
        self.update_energies();
        self.update_current_state();

        Ok(())
    }





    pub fn potential(&self) -> &P
    {
        &self.potential
    }

    pub fn sampler(&self) -> &S
    {
        &self.sampler
    }

    pub fn conditions(&self) -> &[ConditionSlot]
    {
        &self.conditions
    }

    pub fn live(&self) -> &LiveState
    {
        &self.live
    }

    pub fn position(&self) -> &Array1<f64>
    {
        &self.live.position
    }

    pub fn velocity(&self) -> Option<&Array1<f64>>
    {
        self.live.velocity.as_ref()
    }

    pub fn force(&self) -> Option<&Array1<f64>>
    {
        self.live.force.as_ref()
    }

    /// The target temperature of the system
    pub fn temperature(&self) -> f64
    {
        self.live.target_temperature
    }

    pub fn mass(&self) -> f64
    {
        self.live.mass
    }

    pub fn step(&self) -> usize
    {
        self.live.step
    }

    pub fn total_system_energy(&self) -> f64
    {
        self.live.total_system_energy
    }

    pub fn total_potential_energy(&self) -> f64
    {
        self.live.total_potential_energy
    }

    pub fn total_kinetic_energy(&self) -> Option<f64>
    {
        self.live.total_kinetic_energy
    }

    pub fn initial_position(&self) -> &Array1<f64>
    {
        &self.initial_position
    }

    pub fn current_state(&self) -> &State
    {
        &self.current_state
    }

    pub fn trajectory(&self) -> &[State]
    {
        &self.trajectory
    }

    pub fn n_particles(&self) -> usize
    {
        N_PARTICLES
    }

    pub fn n_dimensions(&self) -> usize
    {
        self.n_dimensions
    }

    pub fn n_states(&self) -> usize
    {
        self.n_states
    }
}
