use std::fmt;

use crate::machine::ClockObserver;

use super::pcb::{PcbState, Pid, ProcSnapshot};

/// Gantt-chart recorder: one row per process ever observed, one column
/// per tick, each cell the process state at that tick. A pure observer of
/// process-table snapshots; the kernel never sees it.
pub struct GanttChart {
    rows: Vec<GanttRow>,
    ticks: usize,
}

struct GanttRow {
    pid: Pid,
    path: String,
    states: Vec<Option<PcbState>>,
}

impl GanttChart {
    pub fn new() -> GanttChart {
        GanttChart {
            rows: Vec::new(),
            ticks: 0,
        }
    }

    pub fn tick_count(&self) -> usize {
        self.ticks
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// States recorded for a pid, in tick order. `None` marks ticks
    /// before the process existed.
    pub fn states_of(&self, pid: Pid) -> Option<&[Option<PcbState>]> {
        self.rows
            .iter()
            .find(|row| row.pid == pid)
            .map(|row| row.states.as_slice())
    }

    fn record(&mut self, procs: &[ProcSnapshot]) {
        self.ticks += 1;
        for proc in procs {
            if !self.rows.iter().any(|row| row.pid == proc.pid) {
                // late arrival: pad the ticks it missed
                self.rows.push(GanttRow {
                    pid: proc.pid,
                    path: proc.path.clone(),
                    states: vec![None; self.ticks - 1],
                });
            }
        }
        for row in &mut self.rows {
            let state = procs
                .iter()
                .find(|proc| proc.pid == row.pid)
                .map(|proc| proc.state)
                // removed from the table means it terminated
                .unwrap_or(PcbState::Terminated);
            row.states.push(Some(state));
        }
    }
}

impl ClockObserver for GanttChart {
    fn tick(&mut self, _tick: usize, procs: &[ProcSnapshot]) {
        self.record(procs);
    }
}

impl fmt::Display for GanttChart {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const CELL: usize = 10;
        write!(f, "{:<CELL$}", "process")?;
        for tick in 1..=self.ticks {
            write!(f, "|{:^CELL$}", tick)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:<CELL$}", row.path)?;
            for state in &row.states {
                match state {
                    Some(state) => write!(f, "|{:^CELL$}", state.to_string())?,
                    None => write!(f, "|{:^CELL$}", "")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
