//! Terminal interface helpers for the DocQ chat binary

mod ui;

pub use ui::{display_banner, handle_input_with_history, print_help, render_transcript};
