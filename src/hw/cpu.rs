use log::trace;

use super::inst::Instruction;
use super::irq::Irq;
use super::mmu::Mmu;
use super::ram::Ram;
use super::HwError;

/// Program counter value meaning "no process loaded".
pub const IDLE_PC: i64 = -1;

pub struct Cpu {
    pc: i64,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu { pc: IDLE_PC }
    }

    pub fn pc(&self) -> i64 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: i64) {
        self.pc = pc;
    }

    pub fn is_busy(&self) -> bool {
        self.pc > IDLE_PC
    }

    /// One fetch-execute step. The caller must only step a busy CPU.
    /// Returns the interrupt raised by the executed instruction, if any.
    pub fn step(&mut self, mmu: &Mmu, ram: &Ram) -> Result<Option<Irq>, HwError> {
        let physical = mmu.translate(self.pc as usize)?;
        let inst = ram.read(physical)?;
        self.pc += 1;
        trace!("cpu - Exec: {} pc={}", inst, self.pc);
        let irq = match inst {
            Instruction::Cpu => None,
            Instruction::Io => Some(Irq::IoIn(inst)),
            Instruction::Exit => Some(Irq::Kill),
        };
        Ok(irq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_hardware(insts: &[Instruction]) -> (Mmu, Ram) {
        let mut mmu = Mmu::new(8);
        let mut ram = Ram::new(8);
        mmu.set_page_frame(0, 0);
        for (i, inst) in insts.iter().enumerate() {
            ram.write(i, *inst).unwrap();
        }
        (mmu, ram)
    }

    #[test]
    fn cpu_instruction_raises_nothing() {
        let (mmu, ram) = loaded_hardware(&[Instruction::Cpu]);
        let mut cpu = Cpu::new();
        cpu.set_pc(0);
        assert_eq!(Ok(None), cpu.step(&mmu, &ram));
        assert_eq!(1, cpu.pc());
    }

    #[test]
    fn io_and_exit_raise_interrupts() {
        let (mmu, ram) = loaded_hardware(&[Instruction::Io, Instruction::Exit]);
        let mut cpu = Cpu::new();
        cpu.set_pc(0);
        assert_eq!(
            Ok(Some(Irq::IoIn(Instruction::Io))),
            cpu.step(&mmu, &ram)
        );
        assert_eq!(Ok(Some(Irq::Kill)), cpu.step(&mmu, &ram));
    }
}
