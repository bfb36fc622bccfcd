/// Quantum timer. Inactive until a quantum is configured (only the
/// Round-Robin policy does). It counts executed CPU steps since the last
/// reset; when the window is full, the next tick is spent on TIMEOUT
/// handling instead of an instruction.
pub struct Timer {
    quantum: Option<usize>,
    steps: usize,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            quantum: None,
            steps: 0,
        }
    }

    pub fn set_quantum(&mut self, quantum: usize) {
        self.quantum = Some(quantum);
    }

    pub fn quantum(&self) -> Option<usize> {
        self.quantum
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }

    /// Records one executed CPU step.
    pub fn on_cpu_step(&mut self) {
        self.steps += 1;
    }

    /// True when the quantum window is full and a process is on the CPU.
    pub fn expired(&self, cpu_busy: bool) -> bool {
        match self.quantum {
            Some(quantum) => cpu_busy && self.steps >= quantum,
            None => false,
        }
    }
}
