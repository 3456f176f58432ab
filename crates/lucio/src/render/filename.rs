use chrono::NaiveDate;

const MAX_KEYWORD_CHARS: usize = 20;
const MAX_TITLE_CHARS: usize = 30;

/// `{keyword}_{title}_{domain}_{YYYYMMDD}.pdf`, lowercase, with every part
/// reduced to alphanumerics, `-` and `_`. Empty parts are left out.
pub fn meaningful_filename(
    title: &str,
    keyword: Option<&str>,
    url: Option<&str>,
    date: NaiveDate,
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);

    if let Some(keyword) = keyword {
        parts.push(slug(keyword, MAX_KEYWORD_CHARS));
    }
    parts.push(slug(title, MAX_TITLE_CHARS));
    if let Some(url) = url {
        parts.push(domain_label(url).unwrap_or_default());
    }
    parts.push(date.format("%Y%m%d").to_string());

    parts.retain(|p| !p.is_empty());
    format!("{}.pdf", parts.join("_"))
}

fn slug(text: &str, max_chars: usize) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .flat_map(char::to_lowercase)
        .take(max_chars)
        .collect()
}

/// First label of the host without `www.`: `https://www.bbc.co.uk/x` → `bbc`.
fn domain_label(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw)
        .or_else(|_| url::Url::parse(&format!("https://{}", raw)))
        .ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next()?;
    Some(slug(label, usize::MAX))
}
