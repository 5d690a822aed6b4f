//! Format-specific parsing of property files.

use crate::PropertyMap;

/// Parses `.properties` content. Later duplicates win.
pub(super) fn parse_properties(data: &str) -> PropertyMap {
    logical_lines(data)
        .iter()
        .map(|line| {
            let (key, value) = split_entry(line);
            (unescape(key), unescape(value))
        })
        .collect()
}

/// Joins backslash-continued lines and drops blanks and comments.
fn logical_lines(data: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continuing = false;
    for raw in data.lines() {
        let line = raw.trim_start();
        if !continuing && (line.is_empty() || line.starts_with(['#', '!'])) {
            continue;
        }
        if ends_with_continuation(line) {
            current.push_str(line.strip_suffix('\\').unwrap_or(line));
            continuing = true;
        } else {
            current.push_str(line);
            lines.push(std::mem::take(&mut current));
            continuing = false;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// An odd run of trailing backslashes escapes the newline.
fn ends_with_continuation(line: &str) -> bool {
    !line
        .chars()
        .rev()
        .take_while(|c| *c == '\\')
        .count()
        .is_multiple_of(2)
}

/// Splits at the first unescaped `=`, `:` or whitespace.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                let (key, rest) = line.split_at(idx);
                let mut chars = rest.chars();
                chars.next();
                return (key, chars.as_str().trim_start());
            }
            c if c.is_whitespace() => {
                let (key, rest) = line.split_at(idx);
                let rest = rest.trim_start();
                let value = rest.strip_prefix(['=', ':']).map_or(rest, str::trim_start);
                return (key, value);
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Parses TOML content, flattening nested tables into dotted keys.
#[cfg(feature = "toml")]
pub(super) fn parse_toml(data: &str) -> Result<PropertyMap, toml::de::Error> {
    let table: toml::Table = toml::from_str(data)?;
    let mut properties = PropertyMap::new();
    flatten_table("", &table, &mut properties);
    Ok(properties)
}

#[cfg(feature = "toml")]
fn flatten_table(prefix: &str, table: &toml::Table, out: &mut PropertyMap) {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let toml::Value::Table(inner) = value {
            flatten_table(&name, inner, out);
        } else {
            out.insert(name, scalar_text(value));
        }
    }
}

#[cfg(feature = "toml")]
fn scalar_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a=1", "a", "1")]
    #[case("a = 1", "a", "1")]
    #[case("a:1", "a", "1")]
    #[case("a 1", "a", "1")]
    #[case("a  =  spaced value ", "a", "spaced value ")]
    #[case("key\\=with\\:seps=v", "key=with:seps", "v")]
    #[case("tab=\\tx", "tab", "\tx")]
    #[case("uni=\\u0041\\u00e9", "uni", "Aé")]
    #[case("empty", "empty", "")]
    fn parses_single_entries(#[case] input: &str, #[case] key: &str, #[case] value: &str) {
        let props = parse_properties(input);
        assert_eq!(props.get(key).map(String::as_str), Some(value), "input: {input}");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let props = parse_properties("# comment\n! also\n\n   \nx=1\n");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("x").map(String::as_str), Some("1"));
    }

    #[test]
    fn joins_continuation_lines() {
        let props = parse_properties("list=a,\\\n    b,\\\n    # not a comment\nnext=2");
        assert_eq!(
            props.get("list").map(String::as_str),
            Some("a,b,# not a comment")
        );
        assert_eq!(props.get("next").map(String::as_str), Some("2"));
    }

    #[test]
    fn escaped_trailing_backslash_is_literal() {
        let props = parse_properties("path=C:\\\\\nother=1");
        assert_eq!(props.get("path").map(String::as_str), Some("C:\\"));
        assert_eq!(props.get("other").map(String::as_str), Some("1"));
    }

    #[test]
    fn later_duplicates_win() {
        let props = parse_properties("a=1\na=2");
        assert_eq!(props.get("a").map(String::as_str), Some("2"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn flattens_toml_tables() {
        let props = parse_toml(
            "name = \"svc\"\n[http]\nport = 8080\nhosts = [\"a\", \"b\"]\n[http.tls]\nenabled = true\n",
        )
        .expect("valid toml");
        assert_eq!(props.get("name").map(String::as_str), Some("svc"));
        assert_eq!(props.get("http.port").map(String::as_str), Some("8080"));
        assert_eq!(props.get("http.hosts").map(String::as_str), Some("a,b"));
        assert_eq!(props.get("http.tls.enabled").map(String::as_str), Some("true"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn rejects_invalid_toml() {
        assert!(parse_toml("port = ").is_err());
    }
}
