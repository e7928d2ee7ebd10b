// {name}-style placeholder substitution for stored message templates

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template references unknown placeholder {{{0}}}")]
    MissingKey(String),
}

/// Substitute `{name}` placeholders from `vars`.
///
/// `{{` and `}}` escape to literal braces. A `{` with no closing `}` passes
/// through verbatim. A placeholder with no matching variable fails with
/// [`TemplateError::MissingKey`] so the caller can pick a fallback reply
/// instead of sending a broken message.
pub fn render(template: &str, vars: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);

        if rest[pos..].starts_with('{') {
            if rest[pos + 1..].starts_with('{') {
                out.push('{');
                rest = &rest[pos + 2..];
            } else if let Some(end) = rest[pos + 1..].find('}') {
                let key = &rest[pos + 1..pos + 1 + end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::MissingKey(key.to_string())),
                }
                rest = &rest[pos + 2 + end..];
            } else {
                // unclosed brace, keep the tail as-is
                out.push_str(&rest[pos..]);
                rest = "";
            }
        } else {
            out.push('}');
            if rest[pos + 1..].starts_with('}') {
                rest = &rest[pos + 2..];
            } else {
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_placeholders() {
        let vars = HashMap::from([("member", "Alice"), ("server", "Guild")]);
        assert_eq!(
            render("{member} joined {server}", &vars).unwrap(),
            "Alice joined Guild"
        );
    }

    #[test]
    fn missing_variable_is_an_error() {
        let vars = HashMap::new();
        assert_eq!(
            render("hello {member}", &vars),
            Err(TemplateError::MissingKey("member".to_string()))
        );
    }

    #[test]
    fn doubled_braces_escape() {
        let vars = HashMap::from([("member", "Alice")]);
        assert_eq!(
            render("{{literal}} {member}", &vars).unwrap(),
            "{literal} Alice"
        );
    }

    #[test]
    fn unclosed_brace_passes_through() {
        let vars = HashMap::new();
        assert_eq!(render("oops {member", &vars).unwrap(), "oops {member");
    }

    #[test]
    fn closing_brace_alone_passes_through() {
        let vars = HashMap::new();
        assert_eq!(render("a } b }} c", &vars).unwrap(), "a } b } c");
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let vars = HashMap::new();
        assert_eq!(render("plain text", &vars).unwrap(), "plain text");
    }

    #[test]
    fn multibyte_text_around_placeholders() {
        let vars = HashMap::from([("member", "Alice")]);
        assert_eq!(
            render("🎉 {member} a rejoint ! 🎉", &vars).unwrap(),
            "🎉 Alice a rejoint ! 🎉"
        );
    }
}
