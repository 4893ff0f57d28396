//! Spray passes and the program configuration

use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use spraykit_core::ConfigurationError;

/// Maximum number of passes the device stores
pub const MAX_PASSES: usize = 4;

/// Named, ordered list of trajectories executed in sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprayPass {
    pub name: String,
    #[serde(default)]
    trajectories: Vec<Trajectory>,
}

impl SprayPass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trajectories: Vec::new(),
        }
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Append a trajectory and return its index
    pub fn add_trajectory(&mut self, trajectory: Trajectory) -> usize {
        self.trajectories.push(trajectory);
        self.trajectories.len() - 1
    }

    /// Insert before `index`; `index == len()` appends.
    pub fn insert_trajectory(
        &mut self,
        index: usize,
        trajectory: Trajectory,
    ) -> Result<(), ConfigurationError> {
        if index > self.trajectories.len() {
            return Err(self.invalid_index(index));
        }
        self.trajectories.insert(index, trajectory);
        Ok(())
    }

    pub fn remove_trajectory(&mut self, index: usize) -> Result<Trajectory, ConfigurationError> {
        self.check_index(index)?;
        Ok(self.trajectories.remove(index))
    }

    /// Move the trajectory at `from` so it ends up at position `to`
    pub fn move_trajectory(&mut self, from: usize, to: usize) -> Result<(), ConfigurationError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let trajectory = self.trajectories.remove(from);
        self.trajectories.insert(to, trajectory);
        Ok(())
    }

    pub fn trajectory(&self, index: usize) -> Result<&Trajectory, ConfigurationError> {
        self.check_index(index)?;
        Ok(&self.trajectories[index])
    }

    pub fn trajectory_mut(&mut self, index: usize) -> Result<&mut Trajectory, ConfigurationError> {
        self.check_index(index)?;
        Ok(&mut self.trajectories[index])
    }

    /// Device primitives in this pass; polygons count one per edge
    pub fn primitive_count(&self) -> usize {
        self.trajectories.iter().map(Trajectory::primitive_count).sum()
    }

    /// Sum of trajectory runtimes in seconds
    pub fn total_runtime(&self) -> f64 {
        self.trajectories.iter().map(Trajectory::runtime).sum()
    }

    fn check_index(&self, index: usize) -> Result<(), ConfigurationError> {
        if index < self.trajectories.len() {
            Ok(())
        } else {
            Err(self.invalid_index(index))
        }
    }

    fn invalid_index(&self, index: usize) -> ConfigurationError {
        ConfigurationError::InvalidTrajectoryIndex {
            index,
            count: self.trajectories.len(),
        }
    }
}

/// The whole spray program: ordered passes plus the pass being edited
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    passes: Vec<SprayPass>,
    #[serde(default)]
    current_pass_index: usize,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passes(&self) -> &[SprayPass] {
        &self.passes
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Append an empty pass and return its index.
    ///
    /// The pass limit is only enforced by [`Configuration::validate_for_send`].
    pub fn add_pass(&mut self, name: impl Into<String>) -> usize {
        self.passes.push(SprayPass::new(name));
        self.passes.len() - 1
    }

    /// Append an existing pass and return its index
    pub fn push_pass(&mut self, pass: SprayPass) -> usize {
        self.passes.push(pass);
        self.passes.len() - 1
    }

    pub fn remove_pass(&mut self, index: usize) -> Result<SprayPass, ConfigurationError> {
        self.check_index(index)?;
        let removed = self.passes.remove(index);
        if self.current_pass_index > index || self.current_pass_index >= self.passes.len() {
            self.current_pass_index = self.current_pass_index.saturating_sub(1);
        }
        Ok(removed)
    }

    pub fn pass(&self, index: usize) -> Result<&SprayPass, ConfigurationError> {
        self.check_index(index)?;
        Ok(&self.passes[index])
    }

    pub fn pass_mut(&mut self, index: usize) -> Result<&mut SprayPass, ConfigurationError> {
        self.check_index(index)?;
        Ok(&mut self.passes[index])
    }

    pub fn select_pass(&mut self, index: usize) -> Result<(), ConfigurationError> {
        self.check_index(index)?;
        self.current_pass_index = index;
        Ok(())
    }

    pub fn current_pass_index(&self) -> usize {
        self.current_pass_index
    }

    pub fn current_pass(&self) -> Option<&SprayPass> {
        self.passes.get(self.current_pass_index)
    }

    pub fn current_pass_mut(&mut self) -> Option<&mut SprayPass> {
        self.passes.get_mut(self.current_pass_index)
    }

    /// Pull the selection back into range after passes were loaded or removed
    pub fn clamp_selection(&mut self) {
        if self.current_pass_index >= self.passes.len() {
            self.current_pass_index = self.passes.len().saturating_sub(1);
        }
    }

    /// Structural checks that must hold before anything is written to the device
    pub fn validate_for_send(&self) -> Result<(), ConfigurationError> {
        if self.passes.is_empty() {
            return Err(ConfigurationError::NoPasses);
        }
        if self.passes.len() > MAX_PASSES {
            return Err(ConfigurationError::TooManyPasses {
                count: self.passes.len(),
                max: MAX_PASSES,
            });
        }
        if let Some((index, pass)) = self
            .passes
            .iter()
            .enumerate()
            .find(|(_, pass)| pass.is_empty())
        {
            return Err(ConfigurationError::EmptyPass {
                index,
                name: pass.name.clone(),
            });
        }
        Ok(())
    }

    pub fn total_primitive_count(&self) -> usize {
        self.passes.iter().map(SprayPass::primitive_count).sum()
    }

    pub fn trajectory_count(&self) -> usize {
        self.passes.iter().map(SprayPass::len).sum()
    }

    fn check_index(&self, index: usize) -> Result<(), ConfigurationError> {
        if index < self.passes.len() {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidPassIndex {
                index,
                count: self.passes.len(),
            })
        }
    }
}
