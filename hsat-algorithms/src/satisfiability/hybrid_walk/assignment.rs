use hsat_challenges::Solution;
use rand::Rng;

/// Current truth values, addressed by 1-indexed variable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    pub fn random<R: Rng>(num_variables: usize, rng: &mut R) -> Self {
        Self {
            values: (0..num_variables).map(|_| rng.gen::<bool>()).collect(),
        }
    }

    pub fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Redraws every value in place, one draw per variable in id order.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for value in self.values.iter_mut() {
            *value = rng.gen::<bool>();
        }
    }

    #[inline]
    pub fn value(&self, variable: usize) -> bool {
        self.values[variable - 1]
    }

    #[inline]
    pub fn flip(&mut self, variable: usize) {
        let value = &mut self.values[variable - 1];
        *value = !*value;
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_solution(&self) -> Solution {
        Solution {
            variables: self.values.clone(),
        }
    }
}
