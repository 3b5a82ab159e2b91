//! Live reload script injection.

use crate::embed::serve::script_tag;

/// Inject the reload script into HTML responses.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str) -> Vec<u8> {
    if content_type.starts_with("text/html") {
        inject_hotreload_script(&body)
    } else {
        body
    }
}

/// Inject the reload script before the last `</body>`, or append it.
fn inject_hotreload_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = script_tag();
    let script = script.as_bytes();
    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    #[test]
    fn test_injects_before_body_close() {
        let out = maybe_inject_hotreload(b"<html><body><p>x</p></BODY></html>".to_vec(), HTML);
        let out = String::from_utf8(out).unwrap();
        let script = out.find("<script").unwrap();
        assert!(script < out.find("</BODY>").unwrap());
    }

    #[test]
    fn test_appends_without_body() {
        let out = maybe_inject_hotreload(b"<p>fragment</p>".to_vec(), HTML);
        assert!(String::from_utf8(out).unwrap().ends_with("</script>"));
    }

    #[test]
    fn test_non_html_untouched() {
        let css = b"body{color:red}</body>".to_vec();
        assert_eq!(maybe_inject_hotreload(css.clone(), CSS), css);
    }
}
