//! Shared setup for the `kvstore` binaries.

/// Installs a global logger. Each `-v` raises the level by one, starting
/// from warnings.
pub fn logger(verbosity: u8) -> Result<(), fern::InitError> {
    let level = match verbosity {
    | 0 => log::LevelFilter::Warn,
    | 1 => log::LevelFilter::Info,
    | 2 => log::LevelFilter::Debug,
    | _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message,
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

/// Splits a comma-separated replica list, ignoring blanks.
pub fn replicas(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|replica| !replica.is_empty())
        .map(String::from)
        .collect()
}
