use std::cell::RefCell;
use std::rc::Rc;

use sosim::machine::{Config, Machine, SimError};
use sosim::os::gantt::GanttChart;
use sosim::os::pcb::{PcbState, Pid};
use sosim::os::program::{Program, Section};
use sosim::os::scheduler::Policy;
use sosim::os::KernelError;

const MAX_TICKS: usize = 1000;

fn make_machine(policy: Policy) -> (Machine, Rc<RefCell<GanttChart>>) {
    let mut machine = Machine::new(Config {
        policy,
        memory_size: 64,
        frame_size: 4,
        device_time: 2,
    });
    let gantt = Rc::new(RefCell::new(GanttChart::new()));
    machine.add_observer(Box::new(Rc::clone(&gantt)));
    (machine, gantt)
}

fn submit(machine: &mut Machine, path: &str, sections: &[Section], priority: u8) {
    machine.write_program(path, Program::new(path, sections));
    machine.run(path, priority).unwrap();
}

/// Tick index (0-based) at which the process was first seen terminated.
fn completion_tick(gantt: &GanttChart, pid: Pid) -> usize {
    gantt
        .states_of(pid)
        .unwrap()
        .iter()
        .position(|state| *state == Some(PcbState::Terminated))
        .unwrap()
}

/// Times the process was forced from running back to ready.
fn preemptions(gantt: &GanttChart, pid: Pid) -> usize {
    gantt
        .states_of(pid)
        .unwrap()
        .windows(2)
        .filter(|w| w[0] == Some(PcbState::Running) && w[1] == Some(PcbState::Ready))
        .count()
}

fn assert_single_runner(gantt: &GanttChart, pids: &[Pid]) {
    for tick in 0..gantt.tick_count() {
        let running = pids
            .iter()
            .filter(|&&pid| {
                gantt.states_of(pid).unwrap()[tick] == Some(PcbState::Running)
            })
            .count();
        assert!(running <= 1, "{} processes running at tick {}", running, tick);
    }
}

#[test]
fn fcfs_completes_in_submission_order() {
    let (mut machine, gantt) = make_machine(Policy::Fcfs);
    submit(&mut machine, "c:/a.exe", &[Section::Cpu(2)], 0);
    submit(&mut machine, "c:/b.exe", &[Section::Cpu(1)], 0);
    submit(&mut machine, "c:/c.exe", &[Section::Cpu(1)], 0);

    // 3 + 2 + 2 instruction cells, one per tick, no idle ticks
    let ticks = machine.start(MAX_TICKS).unwrap();
    assert_eq!(7, ticks);
    assert_eq!(Policy::Fcfs, machine.kernel().scheduler().policy());
    assert!(!machine.kernel().scheduler().has_ready());

    let gantt = gantt.borrow();
    let a = completion_tick(&gantt, 0);
    let b = completion_tick(&gantt, 1);
    let c = completion_tick(&gantt, 2);
    assert!(a < b && b < c);
    assert_single_runner(&gantt, &[0, 1, 2]);
}

#[test]
fn round_robin_rotates_on_quantum_expiry() {
    let (mut machine, gantt) = make_machine(Policy::RoundRobin { quantum: 2 });
    submit(&mut machine, "c:/a.exe", &[Section::Cpu(4)], 0);
    submit(&mut machine, "c:/b.exe", &[Section::Cpu(4)], 0);

    // 10 instruction ticks plus 4 timeout passes
    let ticks = machine.start(MAX_TICKS).unwrap();
    assert_eq!(14, ticks);

    let gantt = gantt.borrow();
    // each 4-step burst over quantum 2 is forced out twice
    assert_eq!(2, preemptions(&gantt, 0));
    assert_eq!(2, preemptions(&gantt, 1));
    assert_single_runner(&gantt, &[0, 1]);
}

#[test]
fn round_robin_alone_is_never_preempted() {
    let (mut machine, gantt) = make_machine(Policy::RoundRobin { quantum: 2 });
    submit(&mut machine, "c:/a.exe", &[Section::Cpu(4)], 0);

    // 5 instruction ticks plus 2 timeout passes that only reset the timer
    let ticks = machine.start(MAX_TICKS).unwrap();
    assert_eq!(7, ticks);

    let gantt = gantt.borrow();
    assert_eq!(0, preemptions(&gantt, 0));
    assert!(gantt
        .states_of(0)
        .unwrap()
        .iter()
        .all(|state| *state != Some(PcbState::Ready)));
}

#[test]
fn better_priority_arrival_preempts_immediately() {
    let (mut machine, _) = make_machine(Policy::PriorityPreemptive);
    submit(&mut machine, "c:/worse.exe", &[Section::Cpu(5)], 2);
    submit(&mut machine, "c:/better.exe", &[Section::Cpu(2)], 1);

    // the switch happened during NEW handling, before any CPU step
    let procs = machine.kernel().snapshot();
    assert_eq!(PcbState::Ready, procs[0].state);
    assert_eq!(PcbState::Running, procs[1].state);

    let ticks = machine.start(MAX_TICKS).unwrap();
    assert_eq!(9, ticks);
}

#[test]
fn non_preemptive_priority_waits_for_the_running_process() {
    let (mut machine, gantt) = make_machine(Policy::PriorityNonPreemptive);
    submit(&mut machine, "c:/y.exe", &[Section::Cpu(5)], 2);
    submit(&mut machine, "c:/x.exe", &[Section::Cpu(2)], 1);
    submit(&mut machine, "c:/z.exe", &[Section::Cpu(1)], 3);

    let procs = machine.kernel().snapshot();
    assert_eq!(PcbState::Running, procs[0].state);

    machine.start(MAX_TICKS).unwrap();
    let gantt = gantt.borrow();
    // y keeps the CPU; then x (priority 1) beats z (priority 3)
    let y = completion_tick(&gantt, 0);
    let x = completion_tick(&gantt, 1);
    let z = completion_tick(&gantt, 2);
    assert!(y < x && x < z);
}

#[test]
fn io_requests_are_serviced_in_issue_order() {
    let (mut machine, gantt) = make_machine(Policy::Fcfs);
    submit(&mut machine, "c:/a.exe", &[Section::Io], 0);
    submit(&mut machine, "c:/b.exe", &[Section::Io], 0);

    let ticks = machine.start(MAX_TICKS).unwrap();
    assert_eq!(5, ticks);

    let gantt = gantt.borrow();
    assert!(completion_tick(&gantt, 0) < completion_tick(&gantt, 1));
    assert_single_runner(&gantt, &[0, 1]);
}

#[test]
fn blocked_process_resumes_after_its_operation() {
    let (mut machine, gantt) = make_machine(Policy::Fcfs);
    submit(
        &mut machine,
        "c:/a.exe",
        &[Section::Cpu(1), Section::Io, Section::Cpu(1)],
        0,
    );
    submit(&mut machine, "c:/b.exe", &[Section::Cpu(3)], 0);

    let ticks = machine.start(MAX_TICKS).unwrap();
    assert_eq!(8, ticks);

    let gantt = gantt.borrow();
    // a waits on the device while b runs, then finishes last
    assert!(gantt
        .states_of(0)
        .unwrap()
        .contains(&Some(PcbState::Waiting)));
    assert!(completion_tick(&gantt, 1) < completion_tick(&gantt, 0));
    assert_single_runner(&gantt, &[0, 1]);
}

#[test]
fn paging_splits_the_program_and_reassembles_it() {
    let (mut machine, _) = make_machine(Policy::Fcfs);
    // 6 cells (5 CPU + Exit) with frame size 4 -> 2 pages
    let program = Program::new("c:/prg.exe", &[Section::Cpu(5)]);
    machine.write_program("c:/prg.exe", program.clone());
    machine.run("c:/prg.exe", 0).unwrap();

    let pcb = machine.kernel().pcb_table().get(0).unwrap();
    assert_eq!(2, pcb.page_table().entries().len());

    let mut reassembled = Vec::new();
    for &(_, frame) in pcb.page_table().entries() {
        for offset in 0..4 {
            if let Ok(inst) = machine.hardware().ram.read(frame * 4 + offset) {
                reassembled.push(inst);
            }
        }
    }
    assert_eq!(program.instructions(), reassembled.as_slice());
}

#[test]
fn frames_are_reclaimed_when_processes_terminate() {
    let (mut machine, _) = make_machine(Policy::Fcfs);
    submit(&mut machine, "c:/a.exe", &[Section::Cpu(6)], 0);
    submit(&mut machine, "c:/b.exe", &[Section::Cpu(6)], 0);

    let mm = machine.kernel().memory_manager();
    assert_eq!(16, mm.free_frame_count() + mm.used_frame_count());
    assert_eq!(4, mm.used_frame_count());

    machine.start(MAX_TICKS).unwrap();
    let mm = machine.kernel().memory_manager();
    assert_eq!(16, mm.free_frame_count());
    assert_eq!(0, mm.used_frame_count());
}

#[test]
fn submitting_an_oversized_program_fails_without_taking_frames() {
    let mut machine = Machine::new(Config {
        policy: Policy::Fcfs,
        memory_size: 8,
        frame_size: 4,
        device_time: 2,
    });
    machine.write_program("c:/big.exe", Program::new("c:/big.exe", &[Section::Cpu(10)]));

    let err = machine.run("c:/big.exe", 0).unwrap_err();
    assert_eq!(
        SimError::Kernel(KernelError::OutOfMemory {
            required: 3,
            available: 2
        }),
        err
    );
    assert_eq!(2, machine.kernel().memory_manager().free_frame_count());
}

#[test]
fn running_an_unknown_path_fails() {
    let (mut machine, _) = make_machine(Policy::Fcfs);
    let err = machine.run("c:/nope.exe", 0).unwrap_err();
    assert_eq!(
        SimError::Kernel(KernelError::ProgramNotFound("c:/nope.exe".to_string())),
        err
    );
}

#[test]
fn gantt_chart_covers_every_process_and_tick() {
    let (mut machine, gantt) = make_machine(Policy::Fcfs);
    submit(&mut machine, "c:/a.exe", &[Section::Cpu(2)], 0);
    submit(&mut machine, "c:/b.exe", &[Section::Cpu(2)], 0);

    let ticks = machine.start(MAX_TICKS).unwrap();
    let gantt = gantt.borrow();
    assert_eq!(2, gantt.row_count());
    assert_eq!(ticks, gantt.tick_count());
    assert_eq!(ticks, gantt.states_of(0).unwrap().len());
}
