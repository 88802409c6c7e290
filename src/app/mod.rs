mod daemon;

pub use daemon::{Daemon, DaemonReport, run_daemon};
