//! MessagePack codec for the options stream.

use thiserror::Error;

use super::messages::{
    AuthRequest, ErrorMessage, QuoteMessage, StreamMessage, SubscribeRequest, SubscriptionMessage,
    SuccessMessage,
};

/// Codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// MessagePack encoding failed.
    #[error("msgpack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// MessagePack decoding failed.
    #[error("msgpack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// A frame element could not be converted to a typed message.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Encode an auth request as a msgpack frame.
pub fn encode_auth(request: &AuthRequest) -> Result<Vec<u8>, CodecError> {
    Ok(rmp_serde::to_vec_named(request)?)
}

/// Encode a subscribe request as a msgpack frame.
pub fn encode_subscribe(request: &SubscribeRequest) -> Result<Vec<u8>, CodecError> {
    Ok(rmp_serde::to_vec_named(request)?)
}

/// Decode one binary frame into typed messages.
///
/// Frames are arrays of `T`-tagged maps. Message types this client does
/// not consume (trades, bars) are skipped rather than treated as errors.
pub fn decode_frame(bytes: &[u8]) -> Result<Vec<StreamMessage>, CodecError> {
    let values: Vec<rmpv::Value> = rmp_serde::from_slice(bytes)?;
    let mut messages = Vec::with_capacity(values.len());

    for value in values {
        let tag = value
            .as_map()
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|(k, _)| k.as_str() == Some("T"))
                    .and_then(|(_, v)| v.as_str())
            })
            .map(str::to_owned);

        let message = match tag.as_deref() {
            Some("success") => {
                let m: SuccessMessage = typed(value)?;
                Some(StreamMessage::Success(m))
            }
            Some("error") => {
                let m: ErrorMessage = typed(value)?;
                Some(StreamMessage::Error(m))
            }
            Some("subscription") => {
                let m: SubscriptionMessage = typed(value)?;
                Some(StreamMessage::Subscription(m))
            }
            Some("q") => {
                let m: QuoteMessage = typed(value)?;
                Some(StreamMessage::Quote(m))
            }
            _ => None,
        };
        if let Some(message) = message {
            messages.push(message);
        }
    }

    Ok(messages)
}

fn typed<T: serde::de::DeserializeOwned>(value: rmpv::Value) -> Result<T, CodecError> {
    rmpv::ext::from_value(value).map_err(|e| CodecError::InvalidMessage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn frame(values: Vec<rmpv::Value>) -> Vec<u8> {
        rmp_serde::to_vec(&rmpv::Value::Array(values)).unwrap()
    }

    fn map(entries: Vec<(&str, rmpv::Value)>) -> rmpv::Value {
        rmpv::Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (rmpv::Value::from(k), v))
                .collect(),
        )
    }

    #[test]
    fn decodes_success_message() {
        let bytes = frame(vec![map(vec![
            ("T", "success".into()),
            ("msg", "authenticated".into()),
        ])]);
        let messages = decode_frame(&bytes).unwrap();
        assert!(
            matches!(&messages[0], StreamMessage::Success(m) if m.msg == "authenticated")
        );
    }

    #[test]
    fn decodes_quote_message() {
        let bytes = frame(vec![map(vec![
            ("T", "q".into()),
            ("S", "AAPL240119C00190000".into()),
            ("bp", rmpv::Value::F64(1.25)),
            ("ap", rmpv::Value::F64(1.35)),
        ])]);
        let messages = decode_frame(&bytes).unwrap();
        let StreamMessage::Quote(quote) = &messages[0] else {
            panic!("expected quote");
        };
        assert_eq!(quote.symbol, "AAPL240119C00190000");
        assert_eq!(quote.bid_price, Decimal::new(125, 2));
        assert_eq!(quote.ask_price, Decimal::new(135, 2));
    }

    #[test]
    fn skips_unconsumed_message_types() {
        let bytes = frame(vec![
            map(vec![("T", "t".into()), ("S", "AAPL".into())]),
            map(vec![("T", "subscription".into())]),
        ]);
        let messages = decode_frame(&bytes).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], StreamMessage::Subscription(_)));
    }

    #[test]
    fn auth_round_trip_has_named_fields() {
        let bytes = encode_auth(&AuthRequest::new("key", "secret")).unwrap();
        let value: rmpv::Value = rmp_serde::from_slice(&bytes).unwrap();
        let entries = value.as_map().unwrap();
        assert!(
            entries
                .iter()
                .any(|(k, v)| k.as_str() == Some("action") && v.as_str() == Some("auth"))
        );
    }
}
