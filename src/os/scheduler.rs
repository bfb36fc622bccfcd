use std::collections::VecDeque;

use super::pcb::Pid;

/// Preemption and selection policy. Priority comparisons use one
/// convention everywhere: a lower integer is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fcfs,
    RoundRobin { quantum: usize },
    PriorityNonPreemptive,
    PriorityPreemptive,
}

/// Ordered holding area for runnable processes. The scheduler decides
/// which entry leaves it next.
pub struct ReadyQueue {
    entries: VecDeque<ReadyEntry>,
}

struct ReadyEntry {
    pid: Pid,
    priority: u8,
}

impl ReadyQueue {
    pub fn new() -> ReadyQueue {
        ReadyQueue {
            entries: VecDeque::new(),
        }
    }

    pub fn add(&mut self, pid: Pid, priority: u8) {
        self.entries.push_back(ReadyEntry { pid, priority });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_fifo(&mut self) -> Option<Pid> {
        self.entries.pop_front().map(|entry| entry.pid)
    }

    /// Removes the entry with the most urgent priority; arrival order
    /// breaks ties.
    fn next_most_urgent(&mut self) -> Option<Pid> {
        let mut best = 0;
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.priority < self.entries[best].priority {
                best = index;
            }
        }
        self.entries.remove(best).map(|entry| entry.pid)
    }
}

pub struct Scheduler {
    policy: Policy,
    ready_queue: ReadyQueue,
}

impl Scheduler {
    pub fn new(policy: Policy) -> Scheduler {
        Scheduler {
            policy,
            ready_queue: ReadyQueue::new(),
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn add_ready(&mut self, pid: Pid, priority: u8) {
        self.ready_queue.add(pid, priority);
    }

    pub fn has_ready(&self) -> bool {
        !self.ready_queue.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.ready_queue.len()
    }

    /// Removes and returns the next process to run, by policy.
    pub fn next_pid(&mut self) -> Option<Pid> {
        match self.policy {
            Policy::Fcfs | Policy::RoundRobin { .. } => self.ready_queue.next_fifo(),
            Policy::PriorityNonPreemptive | Policy::PriorityPreemptive => {
                self.ready_queue.next_most_urgent()
            }
        }
    }

    /// Whether an arriving process must evict the running one.
    pub fn must_preempt(&self, arriving_priority: u8, running_priority: u8) -> bool {
        match self.policy {
            Policy::PriorityPreemptive => arriving_priority < running_priority,
            _ => false,
        }
    }
}
