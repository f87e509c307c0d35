/// Counts flips since the assignment was last drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    frequency: Option<usize>,
    since_restart: usize,
}

impl RestartPolicy {
    pub fn new(frequency: Option<usize>) -> Self {
        Self {
            frequency,
            since_restart: 0,
        }
    }

    /// Returns true when this flip completes a restart period. The counter is
    /// reset to zero before returning.
    pub fn record_flip(&mut self) -> bool {
        self.since_restart += 1;
        match self.frequency {
            Some(frequency) if self.since_restart >= frequency => {
                self.since_restart = 0;
                true
            }
            _ => false,
        }
    }

    pub fn flips_since_restart(&self) -> usize {
        self.since_restart
    }

    pub fn frequency(&self) -> Option<usize> {
        self.frequency
    }
}
