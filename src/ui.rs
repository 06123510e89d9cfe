// UI layer: terminal prompts, progress bars and the machine table.
// Everything here writes to the terminal only; no business logic.

use crate::catalog::MachineRecord;
use crate::error::Result;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};

const TABLE_HEADERS: [&str; 3] = ["Creation Date", "Machine Name", "Level"];

/// Ask for a password with hidden input.
pub fn prompt_password() -> Result<String> {
    let password = Password::new().with_prompt("Password").interact()?;
    Ok(password)
}

/// Progress bar for a download. Falls back to a spinner when the server
/// does not announce a length.
pub fn download_progress(len: Option<u64>, name: &str) -> ProgressBar {
    let (bar, template) = match len {
        Some(len) => (
            ProgressBar::new(len),
            "{msg} [{bar:30}] {bytes}/{total_bytes} ({eta})",
        ),
        None => (ProgressBar::new_spinner(), "{spinner} {msg} {bytes}"),
    };
    if let Ok(style) = ProgressStyle::with_template(template) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(name.to_string());
    bar
}

/// Plain-text table with the creation date, name and level of each row.
pub fn render_table(rows: &[&MachineRecord]) -> String {
    let cells: Vec<[&str; 3]> = rows
        .iter()
        .map(|row| {
            [
                row.creation_date().unwrap_or(""),
                row.name().unwrap_or(""),
                row.status().unwrap_or(""),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{separator}+");

    let mut out = String::new();
    out.push_str(&separator);
    out.push('\n');
    out.push_str(&format_line(&TABLE_HEADERS, &widths));
    out.push_str(&separator);
    out.push('\n');
    for line in &cells {
        out.push_str(&format_line(line, &widths));
    }
    out.push_str(&separator);
    out
}

fn format_line(cells: &[&str; 3], widths: &[usize; 3]) -> String {
    let inner = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!(" {cell:<width$} "))
        .collect::<Vec<_>>()
        .join("|");
    format!("|{inner}|\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let a = MachineRecord::new(["2022-01-01", "10:00", "alpha", "easy", "u"]);
        let b = MachineRecord::new(["2022-01-02", "11:00", "averylongname", "hard", "u"]);
        let table = render_table(&[&a, &b]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("Creation Date"));
        assert!(lines[3].contains("| alpha         |"));
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn empty_table_still_has_headers() {
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 4);
    }
}
