//! Prompt templates from the model catalog.
//!
//! Templates use brace placeholders: `{prompt}` is the only replacement field,
//! and `{{` / `}}` produce literal braces.

use together_models::ModelError;

const FIELD: &str = "prompt";

/// Substitutes `prompt` into `template`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidConfig`] if the template has no `{prompt}`
/// field, names any other field, or has an unmatched brace.
pub fn render(template: &str, prompt: &str) -> Result<String, ModelError> {
    let mut out = String::with_capacity(template.len() + prompt.len());
    let mut substituted = false;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(invalid(template, "unmatched '{'")),
                        Some(c) => field.push(c),
                    }
                }
                if field != FIELD {
                    return Err(invalid(
                        template,
                        &format!("unknown field '{{{field}}}'"),
                    ));
                }
                out.push_str(prompt);
                substituted = true;
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid(template, "single '}'")),
            c => out.push(c),
        }
    }

    if !substituted {
        return Err(invalid(template, "missing '{prompt}'"));
    }
    Ok(out)
}

fn invalid(template: &str, reason: &str) -> ModelError {
    ModelError::InvalidConfig(format!("prompt_format {template:?}: {reason}"))
}
