/// URLs from free text: one per line, blank lines and `#` comments are
/// skipped, and only lines starting with `http` are kept.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && line.starts_with("http"))
        .map(str::to_string)
        .collect()
}

/// Warns about entries that do not parse as URLs. They are still
/// attempted; yt-dlp has the final word.
pub fn malformed_urls(urls: &[String]) -> Vec<&str> {
    urls.iter()
        .map(String::as_str)
        .filter(|u| url::Url::parse(u).is_err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_list() {
        let text = "# Paste video URLs here, one per line\n\
                    # https://www.youtube.com/watch?v=commented\n\
                    \n\
                    https://x.test/a.mp4\n\
                    \t  https://x.test/b.mp4   \n\
                    ftp://x.test/c.mp4\n\
                    not a url\n\
                    https://x.test/a.mp4\n";
        assert_eq!(
            parse_url_list(text),
            vec![
                "https://x.test/a.mp4",
                "https://x.test/b.mp4",
                // duplicates are kept
                "https://x.test/a.mp4",
            ]
        );
    }

    #[test]
    fn test_parse_url_list_empty() {
        assert!(parse_url_list("").is_empty());
        assert!(parse_url_list("# only comments\n\n").is_empty());
    }

    #[test]
    fn test_malformed_urls() {
        let urls = vec!["https://x.test/a.mp4".to_string(), "x.test/b".to_string()];
        assert_eq!(malformed_urls(&urls), vec!["x.test/b"]);
    }
}
