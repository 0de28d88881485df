pub mod app_state;
pub mod commands;
pub mod render;

use std::io::Write;

/// Prompt for one line of input. EOF reads as `exit` so piped input
/// terminates cleanly.
pub fn readline() -> Result<String, String> {
    write!(std::io::stdout(), "keywatch> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;

    let mut buffer = String::new();
    let read = std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    if read == 0 {
        return Ok("exit".to_string());
    }
    Ok(buffer)
}
