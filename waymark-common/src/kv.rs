//! Parsing for the line-oriented `key=value` marker formats.
//!
//! Every text input in a pack (POI files, barrier/path/waypoint definitions,
//! map info) is a sequence of lines, each line a space-separated list of
//! `key=value` tokens. Values may be double-quoted to carry spaces. Values
//! are stored raw; [`trim`] strips surrounding whitespace and one layer of
//! quotes.

use std::collections::BTreeMap;

use crate::Error;

/// Strip surrounding whitespace and at most one pair of double quotes.
pub fn trim(s: &str) -> &str {
    let s = s.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

/// Parse one marker line into a key/value map.
///
/// Spaces inside quoted values do not split tokens; a repeated key keeps the
/// last occurrence. Tokens without `=` are ignored.
pub fn parse_line(line: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let mut need_equal = true;
    let mut quoted = false;
    let mut key = String::new();
    let mut tmp = String::new();

    for c in line.chars() {
        if need_equal {
            if c == '=' {
                if tmp.is_empty() {
                    continue;
                }
                key = std::mem::take(&mut tmp);
                need_equal = false;
            } else {
                tmp.push(c);
            }
        } else {
            if !quoted && c == ' ' {
                need_equal = true;
                out.insert(std::mem::take(&mut key), std::mem::take(&mut tmp));
                continue;
            }
            tmp.push(c);
            if c == '"' {
                quoted = !quoted;
            }
        }
    }
    if !key.is_empty() {
        out.insert(key, tmp);
    }
    out
}

/// Fetch a key and return its quote-trimmed value.
pub fn get<'a>(map: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(|v| trim(v))
}

fn coord(map: &BTreeMap<String, String>, field: &'static str) -> Result<f64, Error> {
    let raw = get(map, field).ok_or(Error::MissingField { field })?;
    raw.parse::<f64>().map_err(|_| Error::InvalidField {
        field,
        value: raw.to_string(),
    })
}

/// Extract the required `xpos`/`ypos`/`zpos` triple from a parsed line.
pub fn position(map: &BTreeMap<String, String>) -> Result<(f64, f64, f64), Error> {
    Ok((coord(map, "xpos")?, coord(map, "ypos")?, coord(map, "zpos")?))
}

/// True when the value spells one of the accepted truthy literals.
pub fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_line() {
        let m = parse_line("xpos=1.5 ypos=2 zpos=-3.25 name=alpha");
        assert_eq!(get(&m, "xpos"), Some("1.5"));
        assert_eq!(get(&m, "name"), Some("alpha"));
        assert_eq!(position(&m).unwrap(), (1.5, 2.0, -3.25));
    }

    #[test]
    fn test_quoted_value_keeps_spaces() {
        let m = parse_line(r#"name="south gate" xpos=1 ypos=1 zpos=1"#);
        assert_eq!(m.get("name").map(String::as_str), Some("\"south gate\""));
        assert_eq!(get(&m, "name"), Some("south gate"));
    }

    #[test]
    fn test_missing_position_field() {
        let m = parse_line("xpos=1 zpos=2");
        match position(&m) {
            Err(Error::MissingField { field }) => assert_eq!(field, "ypos"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_position_value() {
        let m = parse_line("xpos=1 ypos=abc zpos=2");
        assert!(matches!(
            position(&m),
            Err(Error::InvalidField { field: "ypos", .. })
        ));
    }

    #[test]
    fn test_repeated_key_keeps_last() {
        let m = parse_line("type=wall type=mushroom");
        assert_eq!(get(&m, "type"), Some("mushroom"));
    }

    #[test]
    fn test_trailing_token_without_equal_is_ignored() {
        let m = parse_line("xpos=4 ypos=5 zpos=6 End");
        assert_eq!(m.len(), 3);
        assert_eq!(position(&m).unwrap(), (4.0, 5.0, 6.0));
    }
}
