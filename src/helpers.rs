use crate::core_network::ControlWriter;
use log::debug;
use tokio::io::AsyncWriteExt;

/// Sends a single-line FTP reply (`<code> <message>\r\n`) to the client.
pub async fn send_reply(
    writer: &ControlWriter,
    code: u16,
    message: &str,
) -> Result<(), std::io::Error> {
    let reply = format!("{} {}\r\n", code, message);
    debug!("Reply: {}", reply.trim_end());

    let mut writer = writer.lock().await;
    writer.write_all(reply.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Lexically normalises an absolute, `/`-separated path: collapses duplicate
/// separators, drops `.` and resolves `..` against the preceding segment.
/// `..` above the root stays at the root.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Turns a command operand into an absolute path.
///
/// No operand means the current directory. An operand starting with `/` is
/// taken as is, anything else is joined onto `cwd`. Either way the result is
/// normalised so access control always sees a canonical path.
pub fn resolve_path(cwd: &str, arg: &str) -> String {
    let arg = arg.trim();
    if arg.is_empty() {
        return cwd.to_string();
    }
    if arg.starts_with('/') {
        clean_path(arg)
    } else {
        clean_path(&format!("{}/{}", cwd, arg))
    }
}
