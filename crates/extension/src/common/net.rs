/// Constructs an absolute URL from a possibly relative one.
///
/// Protocol-relative urls (`//host/path`) are resolved against https.
///
/// # Examples
///
/// ```
/// use novelscout_extension::make_absolute_url;
///
/// let abs = make_absolute_url("/foo/bar", "https://example.com/base");
/// assert_eq!(abs, "https://example.com/foo/bar");
/// ```
pub fn make_absolute_url(relative_url: &str, base_url: &str) -> String {
    let relative_url = relative_url.trim();
    if relative_url.starts_with("http://") || relative_url.starts_with("https://") {
        return relative_url.to_string();
    }
    if relative_url.starts_with("//") {
        return format!("https:{relative_url}");
    }

    match url::Url::parse(base_url).and_then(|base| base.join(relative_url)) {
        Ok(url) => url.into(),
        Err(_) => relative_url.to_string(),
    }
}
