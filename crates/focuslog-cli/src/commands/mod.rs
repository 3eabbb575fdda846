pub mod config;
pub mod log;
pub mod mentor;
pub mod stats;
pub mod timer;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
