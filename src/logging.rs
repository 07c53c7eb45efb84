//! Log dispatcher setup for embedding binaries.

use log::LevelFilter;

/// Installs the global logger: timestamped, leveled, written to stdout.
///
/// Call once at startup. Returns an error if a logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}
