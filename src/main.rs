use std::{env, io};

use sosim::app;
use sosim::machine::Config;
use sosim::os::scheduler::Policy;

fn usage() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "usage: sosim <fcfs|rr|priority|priority-np> [quantum]",
    )
}

fn main() -> io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }
    let policy = match args[1].as_str() {
        "fcfs" => Policy::Fcfs,
        "rr" => {
            let quantum: usize = args
                .get(2)
                .and_then(|s| s.parse().ok())
                .filter(|&q| q > 0)
                .ok_or_else(usage)?;
            Policy::RoundRobin { quantum }
        }
        "priority" => Policy::PriorityPreemptive,
        "priority-np" => Policy::PriorityNonPreemptive,
        _ => return Err(usage()),
    };

    let config = Config {
        policy,
        memory_size: 64,
        frame_size: 4,
        device_time: 3,
    };
    match app::run(config, true) {
        Ok(ticks) => {
            println!("halted. ticks: {}", ticks);
            Ok(())
        }
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
    }
}
