use log::debug;

use crate::hw::cpu::IDLE_PC;
use crate::hw::Hardware;

use super::pcb::Pcb;

/// Context switch mechanism: copies a PCB's execution state into the
/// hardware and back. Both operations are total.
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher
    }

    /// Loads a process's context: timer restarted, program counter set,
    /// MMU reprogrammed with the process's page-frame mapping.
    pub fn load(&self, pcb: &Pcb, hw: &mut Hardware) {
        hw.timer.reset();
        hw.cpu.set_pc(pcb.pc());
        hw.mmu.set_base_dir(pcb.base_dir());
        hw.mmu.reset_tlb();
        for &(page, frame) in pcb.page_table().entries() {
            hw.mmu.set_page_frame(page, frame);
        }
        debug!("loading pcb: {}", pcb);
    }

    /// Saves the CPU's program counter into the PCB and idles the CPU.
    pub fn save(&self, pcb: &mut Pcb, hw: &mut Hardware) {
        pcb.set_pc(hw.cpu.pc());
        hw.cpu.set_pc(IDLE_PC);
        debug!("saving pcb: {}", pcb);
    }
}
