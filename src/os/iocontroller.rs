use std::collections::VecDeque;
use std::fmt;

use crate::hw::inst::Instruction;
use crate::hw::iodev::IoDevice;

use super::pcb::Pid;

/// Serializes access to the single I/O device: one in-flight operation,
/// the rest queued in FIFO order.
pub struct IoDeviceController {
    waiting_queue: VecDeque<(Pid, Instruction)>,
    current: Option<Pid>,
}

impl IoDeviceController {
    pub fn new() -> IoDeviceController {
        IoDeviceController {
            waiting_queue: VecDeque::new(),
            current: None,
        }
    }

    /// Queues an operation and starts it right away if the device is idle.
    pub fn run_operation(&mut self, pid: Pid, operation: Instruction, device: &mut IoDevice) {
        self.waiting_queue.push_back((pid, operation));
        self.load_from_waiting_queue_if_apply(device);
    }

    /// The process whose operation just completed; the next queued
    /// operation (if any) is started on the now-idle device.
    pub fn finished_pid(&mut self, device: &mut IoDevice) -> Option<Pid> {
        let finished = self.current.take();
        self.load_from_waiting_queue_if_apply(device);
        finished
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting_queue.len()
    }

    fn load_from_waiting_queue_if_apply(&mut self, device: &mut IoDevice) {
        if self.current.is_none() && device.is_idle() {
            if let Some((pid, operation)) = self.waiting_queue.pop_front() {
                self.current = Some(pid);
                device.execute(operation);
            }
        }
    }
}

impl fmt::Display for IoDeviceController {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let waiting: Vec<Pid> = self.waiting_queue.iter().map(|&(pid, _)| pid).collect();
        write!(
            f,
            "IoDeviceController running: {:?} waiting: {:?}",
            self.current, waiting
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_are_serviced_in_issue_order() {
        let mut device = IoDevice::new(2);
        let mut controller = IoDeviceController::new();

        controller.run_operation(0, Instruction::Io, &mut device);
        controller.run_operation(1, Instruction::Io, &mut device);
        assert!(!device.is_idle());
        assert_eq!(1, controller.waiting_count());

        // first operation completes
        device.tick();
        device.tick();
        assert_eq!(Some(0), controller.finished_pid(&mut device));

        // second one was started immediately
        assert!(!device.is_idle());
        assert_eq!(0, controller.waiting_count());
        device.tick();
        device.tick();
        assert_eq!(Some(1), controller.finished_pid(&mut device));
        assert!(device.is_idle());
    }

    #[test]
    fn finished_without_in_flight_operation_is_none() {
        let mut device = IoDevice::new(2);
        let mut controller = IoDeviceController::new();
        assert_eq!(None, controller.finished_pid(&mut device));
    }
}
