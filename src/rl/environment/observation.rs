//! Observation tensors handed to the agent

use serde::{Deserialize, Serialize};

use super::window::ObservationWindow;

/// Window contents flattened row-major with an explicit shape
///
/// The shape is `[rows, features]`, or `[rows, features, 1]` when the
/// trailing channel axis is requested. The extra axis is a pure reshape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    values: Vec<f32>,
    shape: Vec<usize>,
}

impl Observation {
    pub fn from_window(window: &ObservationWindow, features: usize, format_3d: bool) -> Self {
        let mut values = Vec::with_capacity(window.len() * features);
        for row in window.iter() {
            values.extend_from_slice(row.as_slice());
        }
        Self {
            values,
            shape: observation_shape(window.len(), features, format_3d),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Number of window rows
    pub fn num_rows(&self) -> usize {
        self.shape[0]
    }

    /// Features per row
    pub fn num_features(&self) -> usize {
        self.shape[1]
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let features = self.num_features();
        if index >= self.num_rows() {
            return None;
        }
        Some(&self.values[index * features..(index + 1) * features])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks(self.num_features().max(1))
    }
}

/// Shape of an observation over `rows` window rows
pub fn observation_shape(rows: usize, features: usize, format_3d: bool) -> Vec<usize> {
    if format_3d {
        vec![rows, features, 1]
    } else {
        vec![rows, features]
    }
}
