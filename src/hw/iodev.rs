use log::trace;

use super::inst::Instruction;
use super::irq::Irq;

/// The single I/O device. Executes one operation at a time; an operation
/// takes `device_time` ticks to complete and then raises IO_OUT.
pub struct IoDevice {
    device_time: usize,
    current: Option<InFlight>,
}

struct InFlight {
    operation: Instruction,
    elapsed: usize,
}

impl IoDevice {
    pub fn new(device_time: usize) -> IoDevice {
        IoDevice {
            device_time,
            current: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Starts an operation. The device controller only calls this when the
    /// device is idle.
    pub fn execute(&mut self, operation: Instruction) {
        trace!("io device - start: {}", operation);
        self.current = Some(InFlight {
            operation,
            elapsed: 0,
        });
    }

    pub fn tick(&mut self) -> Option<Irq> {
        let done = match &mut self.current {
            Some(in_flight) => {
                in_flight.elapsed += 1;
                in_flight.elapsed >= self.device_time
            }
            None => false,
        };
        if done {
            let in_flight = self.current.take();
            if let Some(in_flight) = in_flight {
                trace!("io device - done: {}", in_flight.operation);
            }
            Some(Irq::IoOut)
        } else {
            None
        }
    }
}
