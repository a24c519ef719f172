//! User-facing console output.
//! Consistent colored prefixes for stdout/stderr messages; colors are only
//! emitted when the corresponding stream is a TTY.

use owo_colors::OwoColorize;

pub fn print_info(msg: &str) {
    if atty::is(atty::Stream::Stdout) {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if atty::is(atty::Stream::Stdout) {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

/// Plain user-facing line (no prefix). Primary outputs such as
/// "Moved 'a.jpg' -> 'a (1).jpg'" go through here so scripts can parse them.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
