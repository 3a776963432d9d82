//! # Terminal Rendering
//!
//! Draws the verification view as plain text.

use std::fmt::Write;

use anyhow::Result;
use credibil_verify::ViewModel;
use credibil_verify::channel::to_terminal;

/// Render `view` for a terminal.
///
/// # Errors
///
/// Returns an error if the QR code cannot be drawn.
pub fn render(view: &ViewModel) -> Result<String> {
    let mut out = String::new();

    match view {
        ViewModel::Loading => writeln!(out, "Loading...")?,
        ViewModel::Error { message } => writeln!(out, "Error: {message}")?,
        ViewModel::Ready {
            title,
            options,
            selection,
            error,
        } => {
            writeln!(out, "{title}\n")?;
            for (i, option) in options.iter().enumerate() {
                let marker = if option.selected { '*' } else { ' ' };
                writeln!(out, "{marker} [{}] {}", i + 1, option.label)?;
            }
            writeln!(out, "  [e] Use browser extension\n  [q] Quit")?;

            if let Some(error) = error {
                writeln!(out, "\nError: {error}")?;
            }

            if let Some(selection) = selection {
                writeln!(out, "\nScan with your wallet:\n")?;
                writeln!(out, "{}", to_terminal(&selection.qr_payload, &selection.qr)?)?;
                writeln!(out, "or open on a mobile device:\n{}", selection.wallet_link)?;
                if selection.connected {
                    writeln!(out, "\n\u{2705} Successfully connected!")?;
                } else {
                    writeln!(out, "\nWaiting for wallet (selection {})", selection.selection_id)?;
                }
            }
        }
    }

    Ok(out)
}
