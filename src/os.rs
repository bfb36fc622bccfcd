use std::fmt;

use crate::hw;

pub mod dispatcher;
pub mod fs;
pub mod gantt;
pub mod iocontroller;
pub mod kernel;
pub mod mem;
pub mod pcb;
pub mod program;
pub mod scheduler;

use self::pcb::Pid;

/// Kernel-level faults. None of these is recoverable behind the kernel's
/// back; they all propagate out of the interrupt handler that hit them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    UnknownPid(Pid),
    OutOfMemory { required: usize, available: usize },
    ProgramNotFound(String),
    /// A handler that needs a running process found the CPU idle.
    NoRunningProcess,
    /// IO_OUT arrived with no operation in flight.
    DeviceIdle,
    /// A released frame was not in the used pool.
    FrameNotAllocated(usize),
    /// A page table entry referenced a page logical memory does not hold.
    MissingPage(usize),
    /// The hardware faulted underneath a handler.
    Hardware(hw::HwError),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KernelError::UnknownPid(pid) => write!(f, "no process with pid {}", pid),
            KernelError::OutOfMemory {
                required,
                available,
            } => write!(
                f,
                "out of memory: {} frames required, {} free",
                required, available
            ),
            KernelError::ProgramNotFound(path) => write!(f, "no program at path {}", path),
            KernelError::NoRunningProcess => write!(f, "no running process"),
            KernelError::DeviceIdle => write!(f, "IO_OUT raised while the device is idle"),
            KernelError::FrameNotAllocated(frame) => {
                write!(f, "released frame {} was not allocated", frame)
            }
            KernelError::MissingPage(page) => {
                write!(f, "page {} is not in logical memory", page)
            }
            KernelError::Hardware(e) => write!(f, "hardware fault: {}", e),
        }
    }
}

impl std::error::Error for KernelError {}

impl From<hw::HwError> for KernelError {
    fn from(e: hw::HwError) -> KernelError {
        KernelError::Hardware(e)
    }
}
