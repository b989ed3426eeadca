use std::env;
use std::sync::LazyLock;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
}

impl Level {
    fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "info" | "debug" | "trace" => Self::Info,
            "warn" | "warning" => Self::Warn,
            _ => Self::Error,
        }
    }
}

static PGN_PRINT_LOG: LazyLock<Level> = LazyLock::new(|| {
    env::var("PGN_PRINT_LOG")
        .map(|s| Level::from_str(&s))
        .unwrap_or(Level::Error)
});

macro_rules! log {
    ($level:expr, $prefix:expr, $msg:expr) => {
        if *PGN_PRINT_LOG >= $level {
            eprintln!(concat!($prefix, ": {}"), $msg.as_ref());
        }
    };
}

pub fn error(msg: impl AsRef<str>) {
    log!(Level::Error, "ERROR", msg);
}

pub fn warn(msg: impl AsRef<str>) {
    log!(Level::Warn, "WARN", msg);
}

pub fn info(msg: impl AsRef<str>) {
    log!(Level::Info, "INFO", msg);
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn test_level_from_str_accepts_aliases() {
        assert_eq!(Level::from_str("warning"), Level::Warn);
        assert_eq!(Level::from_str(" WARN "), Level::Warn);
        assert_eq!(Level::from_str("debug"), Level::Info);
        assert_eq!(Level::from_str("err"), Level::Error);
    }

    #[test]
    fn test_unknown_level_falls_back_to_error() {
        assert_eq!(Level::from_str("verbose"), Level::Error);
        assert!(Level::Error < Level::Warn && Level::Warn < Level::Info);
    }
}
