use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";
const HIDE_CURSOR: &str = "\x1B[?25l";
const SHOW_CURSOR: &str = "\x1B[?25h";

/// Cycles through rendered frames until interrupted with Ctrl+C. The
/// receiver scans at its own pace; frames simply repeat until it is done.
pub fn display_carousel(label: &str, frames: &[String], interval_ms: u64) {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let total = frames.len();

    if total == 1 {
        display_single(&frames[0], label, 1, 1);
        println!("\nPress Ctrl+C to exit...");

        while running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
        }
    } else {
        print!("{}", HIDE_CURSOR);
        io::stdout().flush().unwrap();

        let mut current = 0;

        while running.load(Ordering::SeqCst) {
            display_single(&frames[current], label, current + 1, total);
            println!("\nAuto-switching in {}ms | Press Ctrl+C to exit...", interval_ms);

            let start = std::time::Instant::now();
            let duration = Duration::from_millis(interval_ms);

            while start.elapsed() < duration {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                thread::sleep(Duration::from_millis(std::cmp::min(50, interval_ms)));
            }

            current = (current + 1) % total;
        }

        print!("{}", SHOW_CURSOR);
        io::stdout().flush().unwrap();
    }

    print!("{}", CLEAR_SCREEN);
    println!("Exited.");
}

fn display_single(frame: &str, label: &str, current: usize, total: usize) {
    print!("{}", CLEAR_SCREEN);

    println!("{}  |  Frame {}/{}", label, current, total);
    println!("{}", "=".repeat(50));
    println!();
    println!("{}", frame);
}

/// Prints every frame once, top to bottom, without the carousel loop.
pub fn display_once(label: &str, frames: &[String]) {
    let total = frames.len();

    for (i, frame) in frames.iter().enumerate() {
        println!("{}  |  Frame {}/{}", label, i + 1, total);
        println!("{}", "=".repeat(50));
        println!();
        println!("{}", frame);

        if i < total - 1 {
            println!();
            println!("{}", "-".repeat(50));
            println!();
        }
    }
}
