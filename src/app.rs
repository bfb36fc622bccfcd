use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use crate::machine::{Config, Machine, SimError};
use crate::os::gantt::GanttChart;
use crate::os::program::{Program, Section};

const MAX_TICKS: usize = 10000;

/// Builds a machine, registers the demo program set, submits it, and runs
/// the clock until every program has finished. Returns the tick count.
pub fn run(config: Config, show_gantt: bool) -> Result<usize, SimError> {
    let mut machine = Machine::new(config);
    let gantt = Rc::new(RefCell::new(GanttChart::new()));
    machine.add_observer(Box::new(Rc::clone(&gantt)));

    let prg1 = Program::new(
        "prg1.exe",
        &[
            Section::Cpu(10),
            Section::Io,
            Section::Cpu(3),
            Section::Io,
            Section::Cpu(2),
        ],
    );
    let prg2 = Program::new("prg2.exe", &[Section::Cpu(4), Section::Io, Section::Cpu(1)]);
    let prg3 = Program::new("prg3.exe", &[Section::Cpu(3)]);

    machine.write_program("c:/prg1.exe", prg1);
    machine.write_program("c:/prg2.exe", prg2);
    machine.write_program("c:/prg3.exe", prg3);

    machine.run("c:/prg1.exe", 0)?;
    machine.run("c:/prg2.exe", 2)?;
    machine.run("c:/prg3.exe", 1)?;

    let ticks = machine.start(MAX_TICKS)?;
    info!("halted. ticks: {}", ticks);
    if show_gantt {
        println!("{}", *gantt.borrow());
    }
    Ok(ticks)
}
