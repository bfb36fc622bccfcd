use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::hw::irq::Irq;
use crate::hw::{Hardware, HwError};
use crate::os::kernel::Kernel;
use crate::os::pcb::ProcSnapshot;
use crate::os::program::Program;
use crate::os::scheduler::Policy;
use crate::os::KernelError;

/// Everything needed to assemble one machine.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub policy: Policy,
    pub memory_size: usize,
    pub frame_size: usize,
    pub device_time: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    Hw(HwError),
    Kernel(KernelError),
    /// The simulation did not finish within the allowed ticks.
    TickLimit(usize),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::Hw(e) => write!(f, "{}", e),
            SimError::Kernel(e) => write!(f, "{}", e),
            SimError::TickLimit(ticks) => {
                write!(f, "not finished after {} ticks", ticks)
            }
        }
    }
}

impl std::error::Error for SimError {}

impl From<HwError> for SimError {
    fn from(e: HwError) -> SimError {
        SimError::Hw(e)
    }
}

impl From<KernelError> for SimError {
    fn from(e: KernelError) -> SimError {
        SimError::Kernel(e)
    }
}

/// Clock subscriber: receives one immutable process-table snapshot per
/// tick. Consumed by external visualizers only.
pub trait ClockObserver {
    fn tick(&mut self, tick: usize, procs: &[ProcSnapshot]);
}

impl<T: ClockObserver> ClockObserver for Rc<RefCell<T>> {
    fn tick(&mut self, tick: usize, procs: &[ProcSnapshot]) {
        self.borrow_mut().tick(tick, procs);
    }
}

/// One simulated computer: the hardware, the kernel wired to it, and the
/// clock loop driving both.
pub struct Machine {
    hw: Hardware,
    kernel: Kernel,
    observers: Vec<Box<dyn ClockObserver>>,
}

impl Machine {
    pub fn new(config: Config) -> Machine {
        let mut hw = Hardware::new(config.memory_size, config.frame_size, config.device_time);
        let kernel = Kernel::new(config.policy, &mut hw);
        Machine {
            hw,
            kernel,
            observers: Vec::new(),
        }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn hardware(&self) -> &Hardware {
        &self.hw
    }

    pub fn add_observer(&mut self, observer: Box<dyn ClockObserver>) {
        self.observers.push(observer);
    }

    /// Stores a program where the NEW handler will find it.
    pub fn write_program(&mut self, path: &str, program: Program) {
        self.kernel.file_system().write(path, program);
    }

    /// Submits the program at `path` for execution.
    pub fn run(&mut self, path: &str, priority: u8) -> Result<(), SimError> {
        self.kernel.run(&mut self.hw, path, priority)?;
        Ok(())
    }

    /// One clock tick: one CPU step or one interrupt-handling pass, then
    /// the I/O device advances, then observers see the new state.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let tick = self.hw.clock.tick();
        trace!("--------------- tick: {} ---------------", tick);
        if self.hw.timer.expired(self.hw.cpu.is_busy()) {
            self.kernel.handle_interrupt(&mut self.hw, Irq::Timeout)?;
        } else if self.hw.cpu.is_busy() {
            let irq = self.hw.cpu.step(&self.hw.mmu, &self.hw.ram)?;
            self.hw.timer.on_cpu_step();
            if let Some(irq) = irq {
                self.kernel.handle_interrupt(&mut self.hw, irq)?;
            }
        } else {
            trace!("cpu - NOOP");
        }
        if let Some(irq) = self.hw.io_device.tick() {
            self.kernel.handle_interrupt(&mut self.hw, irq)?;
        }
        let procs = self.kernel.snapshot();
        for observer in &mut self.observers {
            observer.tick(tick, &procs);
        }
        Ok(())
    }

    /// Runs the clock until every submitted program has finished.
    /// Returns the tick count on completion.
    pub fn start(&mut self, max_ticks: usize) -> Result<usize, SimError> {
        for _ in 0..max_ticks {
            if self.kernel.finished() {
                return Ok(self.hw.clock.ticks());
            }
            self.tick()?;
        }
        Err(SimError::TickLimit(max_ticks))
    }
}
