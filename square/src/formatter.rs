use colored::*;
use square_core::{CallError, ClientConnectError, CorrelationId, ServerError};
use std::fmt::Display;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

/// The result of a unary call.
pub struct Squared(pub f64);

/// One response of a streaming session.
pub struct StreamItem<'a>(pub &'a CorrelationId, pub f64);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.0)
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

// JSON has no infinity or NaN, so those are rendered as strings ("inf", "-inf", "NaN").
fn number_value(number: f64) -> serde_json::Value {
    if number.is_finite() {
        serde_json::json!(number)
    } else {
        serde_json::Value::String(number.to_string())
    }
}

impl From<Squared> for FormattedString {
    fn from(Squared(number): Squared) -> Self {
        FormattedString::from(serde_json::json!({ "number": number_value(number) }))
    }
}

impl From<StreamItem<'_>> for FormattedString {
    fn from(StreamItem(uid, number): StreamItem<'_>) -> Self {
        // One line per response so a stream reads as JSON lines.
        let value = serde_json::json!({ "uid": uid.as_str(), "number": number_value(number) });
        FormattedString(value.to_string())
    }
}

impl From<CallError> for FormattedString {
    fn from(err: CallError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err))
    }
}

impl From<ClientConnectError> for FormattedString {
    fn from(err: ClientConnectError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
    }
}

impl From<ServerError> for FormattedString {
    fn from(err: ServerError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Server Error:".red().bold(), err))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_number_keeps_full_precision() {
        let FormattedString(out) = Squared(104.04000000000001).into();
        assert!(out.contains("104.04000000000001"), "{out}");
    }

    #[test]
    fn stream_items_render_on_one_line() {
        let uid = CorrelationId::from("abc");
        let FormattedString(out) = StreamItem(&uid, 16.0).into();
        assert_eq!(out, r#"{"number":16.0,"uid":"abc"}"#);
    }

    #[test]
    fn infinity_and_nan_render_distinctly() {
        let FormattedString(infinity) = Squared(f64::INFINITY).into();
        let FormattedString(nan) = Squared(f64::NAN).into();

        assert!(infinity.contains(r#""inf""#), "{infinity}");
        assert!(nan.contains(r#""NaN""#), "{nan}");
        assert!(!infinity.contains("null") && !nan.contains("null"));
    }

    #[test]
    fn non_finite_stream_items_keep_their_value() {
        let uid = CorrelationId::from("abc");
        let FormattedString(out) = StreamItem(&uid, f64::NAN).into();
        assert_eq!(out, r#"{"number":"NaN","uid":"abc"}"#);
    }
}
