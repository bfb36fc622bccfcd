/// Tick counter driving the whole simulation. One tick is one CPU step or
/// one interrupt-handling pass.
pub struct Clock {
    ticks: usize,
}

impl Clock {
    pub fn new() -> Clock {
        Clock { ticks: 0 }
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn tick(&mut self) -> usize {
        self.ticks += 1;
        self.ticks
    }
}
