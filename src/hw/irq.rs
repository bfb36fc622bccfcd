use super::inst::Instruction;

/// A tagged hardware event, consumed exactly once by the kernel's
/// dispatch table.
#[derive(Debug, Clone, PartialEq)]
pub enum Irq {
    /// A program was submitted for execution.
    New { path: String, priority: u8 },
    /// The running process executed its final instruction.
    Kill,
    /// The running process requested an I/O operation.
    IoIn(Instruction),
    /// The in-flight I/O operation completed.
    IoOut,
    /// The timer's quantum elapsed.
    Timeout,
}
