//! Console delivery for deadline alerts.

use std::io::{self, Write};

use anyhow::Result;
use taskcache_core::notify::NotificationSink;

/// Prints banners and notifications to the terminal; the audible alert is
/// the terminal bell. The console needs no permission grant.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn banner(&self, message: &str) -> Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "▌ {}", message)?;
        Ok(())
    }

    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "[{}] {}", title, body)?;
        Ok(())
    }

    fn alert_sound(&self) -> Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "\x07")?;
        stdout.flush()?;
        Ok(())
    }

    fn permission_granted(&self) -> bool {
        true
    }
}
