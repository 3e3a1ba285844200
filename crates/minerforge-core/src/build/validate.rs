//! Build request validation.
//!
//! Requests arrive as raw JSON so that a missing or mistyped field can be
//! reported as a [`ValidationError`] instead of a deserialization failure.

use serde_json::{Map, Value};

use minerforge_types::build::BuildRequest;
use minerforge_types::error::ValidationError;

/// Wallet addresses must carry this prefix.
pub const WALLET_PREFIX: &str = "ak_";

/// Pool URLs must use this scheme.
pub const POOL_SCHEME: &str = "stratum+tcp://";

/// Inclusive bounds for the GPU power limit, in watts.
pub const POWER_LIMIT_MIN: i64 = 100;
pub const POWER_LIMIT_MAX: i64 = 300;

/// Fields every request must carry, checked in this order.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "wallet",
    "worker_name",
    "pool_url",
    "power_limit",
    "core_offset",
    "mem_offset",
];

/// Validate a raw request body and turn it into a [`BuildRequest`].
///
/// Checks, in order: every required field is present, the wallet prefix, the
/// pool URL scheme, that the three GPU settings are integers, and the power
/// limit range. Integers may be given as JSON numbers or as strings holding
/// an integer.
pub fn parse_request(raw: &Value) -> Result<BuildRequest, ValidationError> {
    let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(ValidationError::MissingField(field));
        }
    }

    let wallet = string_field(obj, "wallet")?;
    if !wallet.starts_with(WALLET_PREFIX) {
        return Err(ValidationError::WalletPrefix(WALLET_PREFIX));
    }

    let worker_name = string_field(obj, "worker_name")?;

    let pool_url = string_field(obj, "pool_url")?;
    if !pool_url.starts_with(POOL_SCHEME) {
        return Err(ValidationError::PoolScheme(POOL_SCHEME));
    }

    let power_limit = integer_field(obj, "power_limit")?;
    let core_offset = integer_field(obj, "core_offset")?;
    let mem_offset = integer_field(obj, "mem_offset")?;

    if !(POWER_LIMIT_MIN..=POWER_LIMIT_MAX).contains(&power_limit) {
        return Err(ValidationError::PowerLimitOutOfRange {
            value: power_limit,
            min: POWER_LIMIT_MIN,
            max: POWER_LIMIT_MAX,
        });
    }

    Ok(BuildRequest {
        wallet: wallet.to_string(),
        worker_name: worker_name.to_string(),
        pool_url: pool_url.to_string(),
        power_limit,
        core_offset,
        mem_offset,
    })
}

fn string_field<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or(ValidationError::InvalidType(field))
}

fn integer_field(obj: &Map<String, Value>, field: &'static str) -> Result<i64, ValidationError> {
    match obj.get(field) {
        Some(Value::Number(n)) => n.as_i64().ok_or(ValidationError::NotInteger(field)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotInteger(field)),
        _ => Err(ValidationError::NotInteger(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "wallet": "ak_abc",
            "worker_name": "w1",
            "pool_url": "stratum+tcp://pool:3333",
            "power_limit": 200,
            "core_offset": 100,
            "mem_offset": 800,
        })
    }

    #[test]
    fn accepts_valid_request() {
        let req = parse_request(&valid()).unwrap();
        assert_eq!(req.wallet, "ak_abc");
        assert_eq!(req.worker_name, "w1");
        assert_eq!(req.pool_url, "stratum+tcp://pool:3333");
        assert_eq!(req.power_limit, 200);
        assert_eq!(req.core_offset, 100);
        assert_eq!(req.mem_offset, 800);
    }

    #[test]
    fn accepts_integer_strings_and_negative_offsets() {
        let mut raw = valid();
        raw["power_limit"] = json!("250");
        raw["core_offset"] = json!(-200);
        let req = parse_request(&raw).unwrap();
        assert_eq!(req.power_limit, 250);
        assert_eq!(req.core_offset, -200);
    }

    #[test]
    fn rejects_each_missing_field() {
        for field in REQUIRED_FIELDS {
            let mut raw = valid();
            raw.as_object_mut().unwrap().remove(field);
            assert_eq!(
                parse_request(&raw),
                Err(ValidationError::MissingField(field)),
                "field {field}"
            );
        }
    }

    #[test]
    fn rejects_non_object_body() {
        assert_eq!(
            parse_request(&json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn rejects_wallet_without_prefix() {
        let mut raw = valid();
        raw["wallet"] = json!("bad");
        assert_eq!(
            parse_request(&raw),
            Err(ValidationError::WalletPrefix(WALLET_PREFIX))
        );
    }

    #[test]
    fn rejects_non_string_wallet() {
        let mut raw = valid();
        raw["wallet"] = json!(42);
        assert_eq!(
            parse_request(&raw),
            Err(ValidationError::InvalidType("wallet"))
        );
    }

    #[test]
    fn rejects_pool_url_with_wrong_scheme() {
        let mut raw = valid();
        raw["pool_url"] = json!("http://pool:3333");
        assert_eq!(
            parse_request(&raw),
            Err(ValidationError::PoolScheme(POOL_SCHEME))
        );
    }

    #[test]
    fn rejects_non_integer_offsets() {
        let mut raw = valid();
        raw["mem_offset"] = json!("lots");
        assert_eq!(
            parse_request(&raw),
            Err(ValidationError::NotInteger("mem_offset"))
        );

        let mut raw = valid();
        raw["core_offset"] = json!(12.5);
        assert_eq!(
            parse_request(&raw),
            Err(ValidationError::NotInteger("core_offset"))
        );

        let mut raw = valid();
        raw["power_limit"] = json!(null);
        assert_eq!(
            parse_request(&raw),
            Err(ValidationError::NotInteger("power_limit"))
        );
    }

    #[test]
    fn power_limit_bounds_are_inclusive() {
        for (value, ok) in [(99, false), (100, true), (300, true), (301, false)] {
            let mut raw = valid();
            raw["power_limit"] = json!(value);
            assert_eq!(parse_request(&raw).is_ok(), ok, "power_limit {value}");
        }
    }
}
