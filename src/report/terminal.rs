use std::io::Write;
use std::sync::Mutex;

use console::style;

use super::{Event, Reporter};

/// Human-readable terminal output. Write errors (a closed pipe, say) are
/// dropped so that the run carries on.
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn report(&self, event: Event) {
        let text = render(&event);
        if let Ok(mut out) = self.out.lock() {
            if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
                tracing::debug!("Failed to write to terminal: {}", e);
            }
        }
    }
}

/// Render an event as one or more terminal lines.
fn render(event: &Event) -> String {
    match event {
        Event::RunHeader {
            version,
            os,
            arch,
            package_manager,
            profile,
        } => {
            let mut out = format!(
                "{}\n{}\nOS: {} | Arch: {} | Package Manager: {}",
                style(format!("StackUp v{}", version)).cyan().bold(),
                style("============================").dim(),
                os,
                arch,
                package_manager.as_deref().unwrap_or("None")
            );
            if let Some(profile) = profile {
                out.push_str(&format!("\nProfile: {}", style(profile).white()));
            }
            out.push('\n');
            out
        }
        Event::ToolStarted {
            index,
            total,
            name,
            description,
        } => {
            let mut out = format!(
                "{} Installing {}...",
                style(format!("[{}/{}]", index, total)).dim(),
                style(name).bold()
            );
            if let Some(desc) = description {
                out.push_str(&format!("\n    {}", style(desc).dim()));
            }
            out
        }
        Event::Success { subject, message } => match subject {
            Some(name) => format!("{} {} {}\n", style("✓").green().bold(), name, message),
            None => format!("{} {}\n", style("✓").green().bold(), message),
        },
        Event::Warning { subject, message } => match subject {
            Some(name) => format!("{} {}: {}", style("!").yellow().bold(), name, message),
            None => format!("{} {}", style("!").yellow().bold(), message),
        },
        Event::Error { subject, message } => format!(
            "{} Failed to install {}: {}\n",
            style("✗").red().bold(),
            subject,
            style(message).red()
        ),
        Event::Info { message } => format!("   {}", message),
        Event::RunComplete {
            installed,
            failed,
            needs_reboot,
        } => {
            let mut out = format!(
                "{} ({} installed, {} failed)",
                style("Installation complete!").green().bold(),
                installed,
                failed
            );
            if *needs_reboot {
                out.push_str(&format!(
                    "\n\n{} Some tools require a system reboot to complete installation.\n   Please restart your computer when convenient.",
                    style("!").yellow().bold()
                ));
            }
            out
        }
    }
}
