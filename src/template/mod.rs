//! Placeholder substitution for bootloader config templates.
//!
//! Templates use `$name` or `${name}` placeholders; `$$` produces a literal
//! dollar sign. Substitution is all-or-nothing: either every placeholder
//! resolves or an error is returned and no text is produced.

pub mod isolinux;

use std::collections::BTreeMap;
use thiserror::Error;

/// Placeholder name to value.
pub type Parameters = BTreeMap<String, String>;

/// Substitution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstituteError {
    /// Placeholder has no value in the parameter map
    #[error("no value for placeholder '{0}'")]
    MissingKey(String),

    /// `$` not followed by a name, a braced name or another `$`
    #[error("invalid placeholder in string: line {line}, col {column}")]
    InvalidPlaceholder { line: usize, column: usize },
}

impl SubstituteError {
    /// Name of the failure kind, carried into the caller's error.
    pub fn kind(&self) -> &'static str {
        match self {
            SubstituteError::MissingKey(_) => "MissingKey",
            SubstituteError::InvalidPlaceholder { .. } => "InvalidPlaceholder",
        }
    }
}

/// A config template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace every placeholder with its value from `params`.
    pub fn substitute(&self, params: &Parameters) -> Result<String, SubstituteError> {
        let text = &self.text;
        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
                continue;
            }

            let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
                match braced.find('}') {
                    Some(end) if is_identifier(&braced[..end]) => (&braced[..end], end + 2),
                    _ => return Err(self.invalid_at(text.len() - after.len() - 1)),
                }
            } else {
                let len = identifier_len(after);
                if len == 0 {
                    return Err(self.invalid_at(text.len() - after.len() - 1));
                }
                (&after[..len], len)
            };

            let value = params
                .get(name)
                .ok_or_else(|| SubstituteError::MissingKey(name.to_string()))?;
            out.push_str(value);
            rest = &after[consumed..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn invalid_at(&self, offset: usize) -> SubstituteError {
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let column = offset - before.rfind('\n').map_or(0, |nl| nl + 1) + 1;
        SubstituteError::InvalidPlaceholder { line, column }
    }
}

fn identifier_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let ok = if i == 0 {
            c == '_' || c.is_ascii_alphabetic()
        } else {
            c == '_' || c.is_ascii_alphanumeric()
        };
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && identifier_len(s) == s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_and_braced() {
        let template = Template::new("kernel $kernel_file\nappend initrd=${initrd_file}x");
        let out = template
            .substitute(&params(&[("kernel_file", "linux"), ("initrd_file", "initrd")]))
            .unwrap();
        assert_eq!(out, "kernel linux\nappend initrd=initrdx");
    }

    #[test]
    fn test_dollar_escape() {
        let template = Template::new("cost $$5 for $item");
        let out = template.substitute(&params(&[("item", "boot")])).unwrap();
        assert_eq!(out, "cost $5 for boot");
    }

    #[test]
    fn test_name_stops_at_punctuation() {
        let template = Template::new("$title-install.");
        let out = template.substitute(&params(&[("title", "Leap")])).unwrap();
        assert_eq!(out, "Leap-install.");
    }

    #[test]
    fn test_missing_key() {
        let err = Template::new("timeout ${boot_timeout}")
            .substitute(&Parameters::new())
            .unwrap_err();
        assert_eq!(err, SubstituteError::MissingKey("boot_timeout".to_string()));
        assert_eq!(err.kind(), "MissingKey");
    }

    #[test]
    fn test_invalid_placeholder_position() {
        let err = Template::new("label a\n  append $ 1")
            .substitute(&Parameters::new())
            .unwrap_err();
        assert_eq!(err, SubstituteError::InvalidPlaceholder { line: 2, column: 10 });
        assert_eq!(err.kind(), "InvalidPlaceholder");
    }

    #[test]
    fn test_unterminated_brace() {
        let err = Template::new("${title").substitute(&params(&[("title", "x")])).unwrap_err();
        assert!(matches!(err, SubstituteError::InvalidPlaceholder { line: 1, column: 1 }));
    }

    #[test]
    fn test_no_placeholders() {
        let template = Template::new("");
        assert_eq!(template.substitute(&Parameters::new()).unwrap(), "");
    }
}
