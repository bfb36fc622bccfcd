use std::fmt;

use super::mem::PageTable;
use super::KernelError;

pub type Pid = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcbState {
    New,
    Ready,
    Running,
    Waiting,
    Terminated,
}

impl fmt::Display for PcbState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PcbState::New => write!(f, "new"),
            PcbState::Ready => write!(f, "ready"),
            PcbState::Running => write!(f, "running"),
            PcbState::Waiting => write!(f, "waiting"),
            PcbState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Process control block: the kernel's record of one process.
pub struct Pcb {
    pid: Pid,
    base_dir: usize,
    pc: i64,
    state: PcbState,
    priority: u8,
    path: String,
    page_table: PageTable,
}

impl Pcb {
    pub fn new(pid: Pid, base_dir: usize, path: &str, priority: u8, page_table: PageTable) -> Pcb {
        Pcb {
            pid,
            base_dir,
            pc: 0,
            state: PcbState::New,
            priority,
            path: path.to_string(),
            page_table,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn base_dir(&self) -> usize {
        self.base_dir
    }

    pub fn pc(&self) -> i64 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: i64) {
        self.pc = pc;
    }

    pub fn state(&self) -> PcbState {
        self.state
    }

    pub fn set_state(&mut self, state: PcbState) {
        self.state = state;
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }
}

impl fmt::Display for Pcb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PCB(pid={}, baseDir={}, pc={}, state={}, path={}, priority={})",
            self.pid, self.base_dir, self.pc, self.state, self.path, self.priority
        )
    }
}

/// Read-only view of one PCB, handed to clock observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcSnapshot {
    pub pid: Pid,
    pub path: String,
    pub state: PcbState,
}

/// All live PCBs, the running one, and PID allocation.
pub struct PcbTable {
    table: Vec<Pcb>,
    next_pid: Pid,
    running: Option<Pid>,
}

impl PcbTable {
    pub fn new() -> PcbTable {
        PcbTable {
            table: Vec::new(),
            next_pid: 0,
            running: None,
        }
    }

    pub fn new_pid(&mut self) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    pub fn add(&mut self, pcb: Pcb) {
        self.table.push(pcb);
    }

    pub fn get(&self, pid: Pid) -> Result<&Pcb, KernelError> {
        self.table
            .iter()
            .find(|pcb| pcb.pid() == pid)
            .ok_or(KernelError::UnknownPid(pid))
    }

    pub fn get_mut(&mut self, pid: Pid) -> Result<&mut Pcb, KernelError> {
        self.table
            .iter_mut()
            .find(|pcb| pcb.pid() == pid)
            .ok_or(KernelError::UnknownPid(pid))
    }

    pub fn remove(&mut self, pid: Pid) -> Result<Pcb, KernelError> {
        match self.table.iter().position(|pcb| pcb.pid() == pid) {
            Some(index) => Ok(self.table.remove(index)),
            None => Err(KernelError::UnknownPid(pid)),
        }
    }

    pub fn running(&self) -> Option<Pid> {
        self.running
    }

    pub fn set_running(&mut self, pid: Option<Pid>) {
        self.running = pid;
    }

    pub fn all_terminated(&self) -> bool {
        self.table
            .iter()
            .all(|pcb| pcb.state() == PcbState::Terminated)
    }

    pub fn snapshot(&self) -> Vec<ProcSnapshot> {
        self.table
            .iter()
            .map(|pcb| ProcSnapshot {
                pid: pcb.pid(),
                path: pcb.path().to_string(),
                state: pcb.state(),
            })
            .collect()
    }
}
