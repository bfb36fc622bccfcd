use log::{debug, info};

use crate::hw::inst::Instruction;
use crate::hw::irq::Irq;
use crate::hw::Hardware;

use super::dispatcher::Dispatcher;
use super::fs::FileSystem;
use super::iocontroller::IoDeviceController;
use super::mem::{Loader, MemoryManager};
use super::pcb::{Pcb, PcbState, PcbTable, Pid, ProcSnapshot};
use super::scheduler::{Policy, Scheduler};
use super::KernelError;

/// The core of the emulated operating system. Owns every OS-side
/// component; hardware is passed in explicitly at each interrupt.
pub struct Kernel {
    scheduler: Scheduler,
    pcb_table: PcbTable,
    dispatcher: Dispatcher,
    memory_manager: MemoryManager,
    loader: Loader,
    io_controller: IoDeviceController,
    file_system: FileSystem,
    finished: bool,
}

impl Kernel {
    /// Wires up a kernel against the given hardware. A Round-Robin policy
    /// configures the hardware timer's quantum.
    pub fn new(policy: Policy, hw: &mut Hardware) -> Kernel {
        if let Policy::RoundRobin { quantum } = policy {
            hw.timer.set_quantum(quantum);
        }
        let frame_size = hw.mmu.frame_size();
        let frame_count = hw.ram.size() / frame_size;
        Kernel {
            scheduler: Scheduler::new(policy),
            pcb_table: PcbTable::new(),
            dispatcher: Dispatcher::new(),
            memory_manager: MemoryManager::new(frame_size, frame_count),
            loader: Loader::new(frame_size),
            io_controller: IoDeviceController::new(),
            file_system: FileSystem::new(),
            finished: false,
        }
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn memory_manager(&self) -> &MemoryManager {
        &self.memory_manager
    }

    pub fn pcb_table(&self) -> &PcbTable {
        &self.pcb_table
    }

    pub fn file_system(&mut self) -> &mut FileSystem {
        &mut self.file_system
    }

    pub fn snapshot(&self) -> Vec<ProcSnapshot> {
        self.pcb_table.snapshot()
    }

    /// System call: submit the program stored at `path` for execution.
    /// The process runs to completion via further interrupts, not via
    /// this call.
    pub fn run(&mut self, hw: &mut Hardware, path: &str, priority: u8) -> Result<(), KernelError> {
        self.finished = false;
        info!("executing program: {}", path);
        self.handle_interrupt(
            hw,
            Irq::New {
                path: path.to_string(),
                priority,
            },
        )
    }

    /// The interrupt dispatch table. Every interrupt type has exactly one
    /// handler; handlers run to completion before the hardware resumes.
    pub fn handle_interrupt(&mut self, hw: &mut Hardware, irq: Irq) -> Result<(), KernelError> {
        debug!("handling irq: {:?}", irq);
        match irq {
            Irq::New { path, priority } => self.handle_new(hw, &path, priority),
            Irq::Kill => self.handle_kill(hw),
            Irq::IoIn(operation) => self.handle_io_in(hw, operation),
            Irq::IoOut => self.handle_io_out(hw),
            Irq::Timeout => self.handle_timeout(hw),
        }
    }

    /// NEW: page the program into memory, build its PCB, and hand it to
    /// the scheduler.
    fn handle_new(&mut self, hw: &mut Hardware, path: &str, priority: u8) -> Result<(), KernelError> {
        let program = self.file_system.read(path)?.clone();
        let page_table = self.memory_manager.page_table_for(&program)?;
        for &(page_id, frame) in page_table.entries() {
            let page = self
                .memory_manager
                .logical_memory()
                .page_for_id(page_id)
                .ok_or(KernelError::MissingPage(page_id))?;
            self.loader.load(page, frame, &mut hw.ram)?;
        }
        let base_dir = match page_table.first_frame() {
            Some(frame) => self.memory_manager.base_dir_of_frame(frame),
            None => 0,
        };
        let pid = self.pcb_table.new_pid();
        let pcb = Pcb::new(pid, base_dir, program.name(), priority, page_table);
        info!("created {}", pcb);
        self.pcb_table.add(pcb);
        self.handler_in(hw, pid)
    }

    /// KILL: retire the running process, reclaim its frames, promote a
    /// ready one. When the last process dies the kernel signals
    /// completion.
    fn handle_kill(&mut self, hw: &mut Hardware) -> Result<(), KernelError> {
        let pid = self
            .pcb_table
            .running()
            .ok_or(KernelError::NoRunningProcess)?;
        {
            let pcb = self.pcb_table.get_mut(pid)?;
            self.dispatcher.save(pcb, hw);
            pcb.set_state(PcbState::Terminated);
        }
        let pcb = self.pcb_table.remove(pid)?;
        self.pcb_table.set_running(None);
        self.memory_manager.release(pcb.page_table())?;
        info!("program finished: {}", pcb);
        self.handler_out(hw)?;
        if self.pcb_table.all_terminated() {
            info!("all programs finished, switching off");
            self.finished = true;
        }
        Ok(())
    }

    /// IO_IN: park the running process on the device controller and
    /// promote a ready one.
    fn handle_io_in(&mut self, hw: &mut Hardware, operation: Instruction) -> Result<(), KernelError> {
        let pid = self
            .pcb_table
            .running()
            .ok_or(KernelError::NoRunningProcess)?;
        self.pcb_table.set_running(None);
        {
            let pcb = self.pcb_table.get_mut(pid)?;
            pcb.set_state(PcbState::Waiting);
            self.dispatcher.save(pcb, hw);
        }
        self.io_controller
            .run_operation(pid, operation, &mut hw.io_device);
        info!("{}", self.io_controller);
        self.handler_out(hw)
    }

    /// IO_OUT: the finished process re-enters the scheduler.
    fn handle_io_out(&mut self, hw: &mut Hardware) -> Result<(), KernelError> {
        let pid = self
            .io_controller
            .finished_pid(&mut hw.io_device)
            .ok_or(KernelError::DeviceIdle)?;
        info!("{}", self.io_controller);
        self.handler_in(hw, pid)
    }

    /// TIMEOUT: round-robin rotation. With nobody waiting the timer is
    /// simply restarted and the same process keeps the CPU.
    fn handle_timeout(&mut self, hw: &mut Hardware) -> Result<(), KernelError> {
        if self.scheduler.has_ready() {
            let pid = self
                .pcb_table
                .running()
                .ok_or(KernelError::NoRunningProcess)?;
            let priority = {
                let pcb = self.pcb_table.get_mut(pid)?;
                pcb.set_state(PcbState::Ready);
                self.dispatcher.save(pcb, hw);
                pcb.priority()
            };
            self.scheduler.add_ready(pid, priority);
            self.pcb_table.set_running(None);
            self.handler_out(hw)
        } else {
            hw.timer.reset();
            Ok(())
        }
    }

    /// Shared arrival path: give the CPU to `pid` if it is free or the
    /// policy evicts the running process; otherwise queue it as ready.
    fn handler_in(&mut self, hw: &mut Hardware, pid: Pid) -> Result<(), KernelError> {
        match self.pcb_table.running() {
            None => {
                let pcb = self.pcb_table.get_mut(pid)?;
                self.dispatcher.load(pcb, hw);
                pcb.set_state(PcbState::Running);
                self.pcb_table.set_running(Some(pid));
            }
            Some(running_pid) => {
                let arriving_priority = self.pcb_table.get(pid)?.priority();
                let running_priority = self.pcb_table.get(running_pid)?.priority();
                if self.scheduler.must_preempt(arriving_priority, running_priority) {
                    {
                        let evicted = self.pcb_table.get_mut(running_pid)?;
                        evicted.set_state(PcbState::Ready);
                        self.dispatcher.save(evicted, hw);
                    }
                    self.scheduler.add_ready(running_pid, running_priority);
                    let pcb = self.pcb_table.get_mut(pid)?;
                    self.dispatcher.load(pcb, hw);
                    pcb.set_state(PcbState::Running);
                    self.pcb_table.set_running(Some(pid));
                } else {
                    let pcb = self.pcb_table.get_mut(pid)?;
                    pcb.set_state(PcbState::Ready);
                    self.scheduler.add_ready(pid, arriving_priority);
                }
            }
        }
        Ok(())
    }

    /// Shared departure path: promote the next ready process, if any.
    fn handler_out(&mut self, hw: &mut Hardware) -> Result<(), KernelError> {
        if let Some(pid) = self.scheduler.next_pid() {
            let pcb = self.pcb_table.get_mut(pid)?;
            pcb.set_state(PcbState::Running);
            self.dispatcher.load(pcb, hw);
            self.pcb_table.set_running(Some(pid));
        }
        Ok(())
    }
}
