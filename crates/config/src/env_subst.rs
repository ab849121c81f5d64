/// Replace `${ENV_VAR}` and `${ENV_VAR:-default}` placeholders.
///
/// Unresolvable variables without a default are left as-is. A default is
/// used when the variable is unset or empty.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// [`substitute_env`] with a custom lookup, so tests need not touch the
/// process environment.
pub fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut placeholder = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                placeholder.push(c);
            }
            if !closed || placeholder.is_empty() {
                // Malformed, emit literal.
                result.push_str("${");
                result.push_str(&placeholder);
                if closed {
                    result.push('}');
                }
                continue;
            }

            let (name, default) = match placeholder.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (placeholder.as_str(), None),
            };
            match (lookup(name), default) {
                (Some(val), Some(default)) if val.is_empty() => result.push_str(default),
                (Some(val), _) => result.push_str(&val),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    result.push_str("${");
                    result.push_str(&placeholder);
                    result.push('}');
                },
            }
        } else {
            result.push(ch);
        }
    }

    result
}
