/// Result structs for command output. Commands return these instead of printing
/// directly; main.rs formats them as human-readable or JSON based on --json.
mod check;
mod config;
mod fix;

pub use check::*;
pub use config::*;
pub use fix::*;

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
