//! Panic handler
//!
//! Routes panics through tracing so they end up next to the request logs,
//! and appends a crash report with a backtrace to `crash.log`.

use std::fs::OpenOptions;
use std::io::Write;
use std::panic;

use chrono::Utc;

const CRASH_LOG: &str = "crash.log";

/// Install custom panic hook
///
/// `verbose` 为 true 时在 stderr 打印彩色的堆栈（serve 模式），
/// 否则只打印一行提示（CLI 子命令）。
pub fn install_panic_hook(verbose: bool) {
    panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!(%location, "panic: {}", message);

        if let Err(e) = write_crash_log(&message, &location, &backtrace) {
            eprintln!("Failed to write crash log: {}", e);
        }

        if verbose {
            display_verbose_panic(&message, &location, &backtrace);
        } else {
            eprintln!("Program panicked: {}", message);
            eprintln!("Details saved to {}", CRASH_LOG);
        }
    }));
}

fn display_verbose_panic(message: &str, location: &str, backtrace: &std::backtrace::Backtrace) {
    use colored::Colorize;

    let rule = "═══════════════════════════════════════════════════".red().bold();
    eprintln!();
    eprintln!("{}", rule);
    eprintln!("{}", "PANIC".red().bold());
    eprintln!("{}", rule);
    eprintln!("{} {}", "Reason:".yellow().bold(), message.white());
    eprintln!("{} {}", "Location:".yellow().bold(), location.white());
    eprintln!();
    eprintln!("{}", "Backtrace:".yellow().bold());
    eprintln!("{}", format!("{:?}", backtrace).dimmed());
    eprintln!("{}", format!("Details saved to {}", CRASH_LOG).cyan());
    eprintln!("{}", rule);
}

fn write_crash_log(
    message: &str,
    location: &str,
    backtrace: &std::backtrace::Backtrace,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(CRASH_LOG)?;

    writeln!(file, "==========================================")?;
    writeln!(
        file,
        "Crash Report - {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "Message: {}", message)?;
    writeln!(file, "Location: {}", location)?;
    writeln!(file, "\nBacktrace:\n{:?}", backtrace)?;
    writeln!(file, "==========================================\n")?;
    Ok(())
}
