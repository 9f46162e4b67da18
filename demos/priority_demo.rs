//! Five tasks, four workers, highest priority first

use prio_pool::prelude::*;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let pool = PriorityPool::new(4).expect("Failed to start pool");

    let tasks = [(2, "Task 1"), (1, "Task 2"), (3, "Task 3"), (5, "Task 4"), (4, "Task 5")];
    for (priority, name) in tasks {
        pool.submit(priority, move || {
            println!("{} (Priority {})", name, priority);
        })
        .expect("pool is running");
    }

    let report = pool.shutdown();
    println!(
        "\nexecuted {} tasks ({} panicked)",
        report.executed, report.panicked
    );
}
