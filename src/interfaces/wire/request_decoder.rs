use crate::domain::request::{OpKind, Request};
use crate::error::ParseError;

/// Largest accepted message, in bytes, including any trailing NUL.
pub const MAX_MESSAGE_SIZE: usize = 256;

/// Payload that asks the server to stop taking requests.
pub const SHUTDOWN_SENTINEL: &str = "exit";

/// Bounds-checks the payload and strips the trailing NULs and whitespace that
/// C producers leave behind.
fn message_text(payload: &[u8]) -> Result<&str, ParseError> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ParseError::TooLarge {
            max: MAX_MESSAGE_SIZE,
        });
    }
    let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;
    Ok(text.trim_end_matches('\0').trim())
}

/// Whether the payload is the administrative shutdown command.
pub fn is_shutdown(payload: &[u8]) -> bool {
    matches!(message_text(payload), Ok(text) if text == SHUTDOWN_SENTINEL)
}

/// Decodes one message of the form `<index> <op> <amount> [<target>]`.
pub fn decode_request(payload: &[u8]) -> Result<Request, ParseError> {
    let text = message_text(payload)?;
    let fields: Vec<&str> = text.split_ascii_whitespace().collect();

    let [source, op, rest @ ..] = fields.as_slice() else {
        return Err(if fields.is_empty() {
            ParseError::Empty
        } else {
            ParseError::FieldCount {
                op: "request",
                expected: "at least 2",
                got: fields.len(),
            }
        });
    };

    let op = parse_op(op)?;
    let source = parse_int("account index", source)?;

    match (op, rest) {
        (OpKind::Deposit, [amount]) => {
            Ok(Request::deposit(source, parse_int("amount", amount)?))
        }
        (OpKind::Withdraw, [amount]) => {
            Ok(Request::withdraw(source, parse_int("amount", amount)?))
        }
        // The amount slot of a view is a placeholder and is never read.
        (OpKind::View, [] | [_]) => Ok(Request::view(source)),
        (OpKind::Transfer, [amount, target]) => Ok(Request::transfer(
            source,
            parse_int("amount", amount)?,
            parse_int("target index", target)?,
        )),
        (op, rest) => Err(ParseError::FieldCount {
            op: op.as_str(),
            expected: expected_fields(op),
            got: rest.len() + 2,
        }),
    }
}

fn parse_op(field: &str) -> Result<OpKind, ParseError> {
    match field {
        "deposit" => Ok(OpKind::Deposit),
        "withdraw" => Ok(OpKind::Withdraw),
        "view" => Ok(OpKind::View),
        "transfer" => Ok(OpKind::Transfer),
        other => Err(ParseError::UnknownOperation(other.to_string())),
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, ParseError> {
    value.parse().map_err(|_| ParseError::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

fn expected_fields(op: OpKind) -> &'static str {
    match op {
        OpKind::Deposit | OpKind::Withdraw => "3",
        OpKind::View => "2 or 3",
        OpKind::Transfer => "4",
    }
}
