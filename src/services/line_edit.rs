use std::fs;
use std::io;
use std::path::Path;

use regex::{NoExpand, Regex};

/// Replaces every line starting with `key` by `line`.
/// Returns the new content and how many lines were replaced.
pub fn replace_keyed_line(content: &str, key: &str, line: &str) -> io::Result<(String, usize)> {
    let pattern = format!(r"(?m)^{}[^\r\n]*", regex::escape(key));
    let re = Regex::new(&pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let count = re.find_iter(content).count();
    if count == 0 {
        return Ok((content.to_string(), 0));
    }
    Ok((re.replace_all(content, NoExpand(line)).into_owned(), count))
}

/// Keyed-line replacement on a file. The file is only rewritten when its content changes.
pub fn edit_file(path: &Path, key: &str, line: &str) -> io::Result<usize> {
    let content = fs::read_to_string(path)?;
    let (updated, count) = replace_keyed_line(&content, key, line)?;
    if count == 0 {
        log::debug!("{}: no line starting with {:?}", path.display(), key);
        return Ok(0);
    }
    if updated != content {
        fs::write(path, &updated)?;
    }
    log::info!("{}: replaced {} line(s) for {:?}", path.display(), count, key);
    Ok(count)
}
