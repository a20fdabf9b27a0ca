use indicatif::ProgressStyle;

/// Style shared by the progress bars of the long-running stages.
pub fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {human_pos:>7}/{human_len:7} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}
