use flexi_logger::DeferredNow;
use log::{Level, Record};

/// One line per record; `info` prints the bare message.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    match record.level() {
        Level::Info => write!(w, "{}", record.args()),
        level => write!(
            w,
            "{}: {}",
            level.as_str().to_ascii_lowercase(),
            record.args()
        ),
    }
}
