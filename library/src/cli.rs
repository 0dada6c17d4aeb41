//! `timing-cli`: inspect timing files and do conversions from a terminal.

use std::path::Path;

use crate::core::frame;
use crate::error::TimingError;
use crate::model::TimingDocument;

const USAGE: &str = "usage:
  timing-cli show <file.timing> [default-fps]
  timing-cli frames <elapsed-ms> <fps>
  timing-cli time <frame> <fps>
  timing-cli interval <fps>";

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, TimingError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| TimingError::InvalidArgument(format!("missing <{}>\n{}", name, USAGE)))
}

fn number<T: std::str::FromStr>(args: &[String], index: usize, name: &str) -> Result<T, TimingError> {
    let text = arg(args, index, name)?;
    text.trim()
        .parse()
        .map_err(|_| TimingError::InvalidArgument(format!("<{}> must be a number, got '{}'", name, text)))
}

pub fn run(args: Vec<String>) -> Result<(), TimingError> {
    let command = arg(&args, 1, "command")?;
    match command {
        "show" => {
            let path = arg(&args, 2, "file")?;
            let default_fps = match args.get(3) {
                Some(_) => number(&args, 3, "default-fps")?,
                None => frame::DEFAULT_FPS,
            };
            for line in show(Path::new(path), default_fps)? {
                println!("{}", line);
            }
        }
        "frames" => {
            let elapsed: i64 = number(&args, 2, "elapsed-ms")?;
            let fps: u32 = number(&args, 3, "fps")?;
            println!("{}", frame::frames_for(elapsed, fps)?);
        }
        "time" => {
            let frame_number: i64 = number(&args, 2, "frame")?;
            let fps: u32 = number(&args, 3, "fps")?;
            let ms = frame::time_ms_for(frame_number, fps)?;
            println!("{} ({} ms)", frame::format_time(ms as i64)?, ms);
        }
        "interval" => {
            let fps: u32 = number(&args, 2, "fps")?;
            println!("{} ms", frame::tick_interval_ms(fps)?);
        }
        other => {
            return Err(TimingError::InvalidArgument(format!(
                "unknown command '{}'\n{}",
                other, USAGE
            )));
        }
    }
    Ok(())
}

/// Loads a timing file and renders it as text lines.
pub fn show(path: &Path, default_fps: u32) -> Result<Vec<String>, TimingError> {
    let mut document = TimingDocument::new();
    let report = document.load(path, default_fps)?;

    let header = document.header();
    let mut lines = vec![
        format!("{} {}", header.plugin_name, header.plugin_version),
        format!("saved: {}", header.created_at.as_deref().unwrap_or("-")),
        format!(
            "fps: {}  offset: {} / frame {}",
            document.fps(),
            frame::format_time(document.offset_time_ms() as i64)?,
            document.offset_frame()
        ),
    ];
    for warning in &report.warnings {
        lines.push(format!("warning: {}", warning));
    }

    lines.push(format!("{:>4}  {:<9}  {:>6}  {:>8}  note", "#", "time", "frame", "interval"));
    for (i, row) in document.rows().iter().enumerate() {
        lines.push(format!(
            "{:>4}  {:<9}  {:>6}  {:>8}  {}",
            i + 1,
            row.time(),
            row.frame,
            row.interval.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            row.note
        ));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn conversions_run() {
        assert!(run(args(&["timing-cli", "frames", "1000", "24"])).is_ok());
        assert!(run(args(&["timing-cli", "time", "12", "24"])).is_ok());
        assert!(run(args(&["timing-cli", "interval", "30"])).is_ok());
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(
            run(args(&["timing-cli", "frames", "abc", "24"])),
            Err(TimingError::InvalidArgument(_))
        ));
        assert!(matches!(
            run(args(&["timing-cli", "interval", "0"])),
            Err(TimingError::InvalidFps(0))
        ));
        assert!(run(args(&["timing-cli", "bogus"])).is_err());
        assert!(run(args(&["timing-cli"])).is_err());
    }

    #[test]
    fn show_missing_file() {
        assert!(matches!(
            show(Path::new("/definitely/not/here.timing"), 24),
            Err(TimingError::FileNotFound(_))
        ));
    }
}
