//! Run summary reporting.

use std::path::PathBuf;
use std::time::Duration;

use birdbath_core::fmt_num;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// Final tallies for one hydration run.
#[derive(Debug)]
pub struct RunSummary {
    pub success: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub output: PathBuf,
}

impl RunSummary {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }

    /// Format summary table as a string (TTY mode).
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Hydration Run")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("Hydrated").fg(Color::Green),
            Cell::new(fmt_num(self.success)).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("Failed"),
            Cell::new(fmt_num(self.failed)),
        ]);
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.2} min", self.elapsed_minutes())),
        ]);
        table.add_row(vec![
            Cell::new("Output"),
            Cell::new(self.output.display().to_string()),
        ]);

        format!("\n{table}")
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "Done: {} succeeded, {} failed",
            fmt_num(self.success),
            fmt_num(self.failed)
        );
        log::info!("Time elapsed: {:.2} minutes", self.elapsed_minutes());
        log::info!("Results saved in: {}", self.output.display());
    }
}
