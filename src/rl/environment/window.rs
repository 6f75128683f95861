//! Fixed-capacity sliding window of observation rows

use std::collections::VecDeque;

use crate::rl::core::FeatureVector;

/// Oldest-first FIFO of feature rows, never longer than its capacity
#[derive(Debug, Clone)]
pub struct ObservationWindow {
    capacity: usize,
    rows: VecDeque<FeatureVector>,
}

impl ObservationWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            rows: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a row, evicting the oldest on overflow
    pub fn push(&mut self, row: FeatureVector) {
        self.rows.push_back(row);
        while self.rows.len() > self.capacity {
            self.rows.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent row
    pub fn latest(&self) -> Option<&FeatureVector> {
        self.rows.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureVector> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::core::{ColumnBindings, FeatureSchema, PositionState};

    fn row(schema: &FeatureSchema, reward: f64) -> FeatureVector {
        FeatureVector::assemble(
            schema,
            &vec![0.0; schema.market_len()],
            [0.0, 0.0],
            &PositionState::default(),
            [1.0, 0.0, 0.0],
            reward,
            10.0,
        )
    }

    fn schema() -> FeatureSchema {
        let bindings = ColumnBindings::default();
        let cols = bindings.names().iter().map(|s| s.to_string()).collect();
        FeatureSchema::new(cols, &bindings).unwrap()
    }

    #[test]
    fn test_evicts_oldest() {
        let schema = schema();
        let mut window = ObservationWindow::new(3);
        for i in 0..5 {
            window.push(row(&schema, i as f64));
        }

        assert_eq!(window.len(), 3);
        assert!(window.is_full());
        let rewards: Vec<f32> = window
            .iter()
            .map(|r| r.get(&schema, "reward").unwrap())
            .collect();
        assert_eq!(rewards, vec![2.0, 3.0, 4.0]);
        assert_eq!(window.latest().unwrap().get(&schema, "reward"), Some(4.0));
    }

    #[test]
    fn test_clear() {
        let schema = schema();
        let mut window = ObservationWindow::new(2);
        window.push(row(&schema, 0.0));
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 2);
    }
}
