//! `{placeholder}` interpolation for structured log calls.

use crate::model::Context;

/// Replace every `{key}` in `message` whose context value can be stringified.
///
/// Unknown keys and values without a safe string form (lists, maps, objects
/// without a display conversion) leave the placeholder as written. Substituted
/// text is never scanned again.
pub fn interpolate(message: &str, context: &Context) -> String {
    if context.is_empty() || !message.contains('{') {
        return message.to_string();
    }

    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let replacement = after_open.find('}').and_then(|close| {
            let key = &after_open[..close];
            context
                .get(key)
                .and_then(|value| value.to_interpolation())
                .map(|text| (text, close))
        });

        match replacement {
            Some((text, close)) => {
                out.push_str(&text);
                rest = &after_open[close + 1..];
            }
            None => {
                out.push('{');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}
