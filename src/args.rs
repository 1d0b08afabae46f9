//! Request argument validation
//!
//! Arguments are gathered from the query string, a form-encoded body and a
//! JSON object body. Later sources win on duplicate keys (query, then form,
//! then JSON); within one source the first occurrence of a key wins. The
//! merged set is then parsed strictly into one typed struct
//! per operation. Unknown keys, missing required keys and values that fail
//! coercion are all `ApiError::Validation`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::models::{Player, PlayerKey, PlayerPatch, SortQuery};

/// Raw key/value arguments of one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestArgs(Map<String, Value>);

type Coerce<T> = fn(&str, &Value) -> Result<T, ApiError>;

impl RequestArgs {
    pub fn new(args: Map<String, Value>) -> Self {
        Self(args)
    }

    /// Merge query pairs, form pairs and an optional JSON body
    pub fn collect(
        query: Vec<(String, String)>,
        form: Vec<(String, String)>,
        body: &[u8],
    ) -> Result<Self, ApiError> {
        let mut args = first_occurrences(query);
        args.extend(first_occurrences(form));

        if !body.iter().all(u8::is_ascii_whitespace) {
            let parsed: Value = serde_json::from_slice(body)
                .map_err(|err| ApiError::Validation(format!("Malformed JSON body: {}", err)))?;

            match parsed {
                Value::Object(fields) => args.extend(fields),
                _ => {
                    return Err(ApiError::Validation(
                        "Request body must be a JSON object".to_string(),
                    ))
                }
            }
        }

        Ok(Self(args))
    }

    fn required<T>(&self, name: &str, coerce: Coerce<T>) -> Result<T, ApiError> {
        match self.0.get(name) {
            Some(value) => coerce(name, value),
            None => Err(ApiError::Validation(format!(
                "{}: Missing required parameter in the JSON body, the form body or the query string",
                name
            ))),
        }
    }

    fn optional<T>(&self, name: &str, coerce: Coerce<T>) -> Result<Option<T>, ApiError> {
        self.0.get(name).map(|value| coerce(name, value)).transpose()
    }

    /// Strict mode: every key must be one the operation recognises
    fn reject_unknown(&self, fields: &[&str]) -> Result<(), ApiError> {
        let unknown: Vec<&str> = self
            .0
            .keys()
            .map(String::as_str)
            .filter(|key| !fields.contains(key))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(format!(
                "Unknown arguments: {}",
                unknown.join(", ")
            )))
        }
    }

    pub fn parse<T: FromArgs>(&self) -> Result<T, ApiError> {
        let parsed = T::from_args(self)?;
        self.reject_unknown(T::FIELDS)?;
        Ok(parsed)
    }
}

/// `?sort_age=true&sort_age=false` reads as `true`
fn first_occurrences(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut args = Map::new();
    for (key, value) in pairs {
        args.entry(key).or_insert(Value::String(value));
    }
    args
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn type_error(name: &str, expected: &str, value: &Value) -> ApiError {
    ApiError::Validation(format!("{}: expected {}, got {}", name, expected, value))
}

fn coerce_str(name: &str, value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(type_error(name, "a string", value)),
    }
}

fn coerce_float(name: &str, value: &Value) -> Result<f64, ApiError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| type_error(name, "a float", value))
}

fn coerce_int(name: &str, value: &Value) -> Result<i64, ApiError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            // 250.0 is accepted, 250.5 is not
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| type_error(name, "an integer", value))
}

fn coerce_bool(name: &str, value: &Value) -> Result<bool, ApiError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    };

    parsed.ok_or_else(|| type_error(name, "a boolean", value))
}

/// A typed argument set for one operation
pub trait FromArgs: Sized {
    /// Every argument name the operation recognises
    const FIELDS: &'static [&'static str];

    fn from_args(args: &RequestArgs) -> Result<Self, ApiError>;
}

impl FromArgs for SortQuery {
    const FIELDS: &'static [&'static str] = &["sort_age"];

    fn from_args(args: &RequestArgs) -> Result<Self, ApiError> {
        Ok(SortQuery {
            sort_age: args.optional("sort_age", coerce_bool)?,
        })
    }
}

impl FromArgs for Player {
    const FIELDS: &'static [&'static str] = &[
        "last", "first", "age", "height", "wingspan", "weight", "gp", "mp",
    ];

    fn from_args(args: &RequestArgs) -> Result<Self, ApiError> {
        Ok(Player {
            last: args.required("last", coerce_str)?,
            first: args.required("first", coerce_str)?,
            age: args.required("age", coerce_float)?,
            height: args.required("height", coerce_float)?,
            wingspan: args.required("wingspan", coerce_float)?,
            weight: args.required("weight", coerce_int)?,
            gp: args.required("gp", coerce_int)?,
            mp: args.required("mp", coerce_int)?,
        })
    }
}

impl FromArgs for PlayerKey {
    const FIELDS: &'static [&'static str] = &["last", "first"];

    fn from_args(args: &RequestArgs) -> Result<Self, ApiError> {
        Ok(PlayerKey {
            last: args.required("last", coerce_str)?,
            first: args.required("first", coerce_str)?,
        })
    }
}

impl FromArgs for PlayerPatch {
    const FIELDS: &'static [&'static str] = Player::FIELDS;

    fn from_args(args: &RequestArgs) -> Result<Self, ApiError> {
        Ok(PlayerPatch {
            key: PlayerKey::from_args(args)?,
            age: args.optional("age", coerce_float)?,
            height: args.optional("height", coerce_float)?,
            wingspan: args.optional("wingspan", coerce_float)?,
            weight: args.optional("weight", coerce_int)?,
            gp: args.optional("gp", coerce_int)?,
            mp: args.optional("mp", coerce_int)?,
        })
    }
}

/// Extractor yielding a validated argument set
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: FromArgs,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
            .map_err(|err| ApiError::Validation(err.body_text()))?;

        let args = if is_form(&req) {
            let Form(form) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|err| ApiError::Validation(err.body_text()))?;
            RequestArgs::collect(query, form, b"")?
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|err| ApiError::Validation(err.body_text()))?;
            RequestArgs::collect(query, Vec::new(), &body)?
        };

        args.parse::<T>().map(Validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> RequestArgs {
        match value {
            Value::Object(map) => RequestArgs::new(map),
            _ => panic!("test args must be an object"),
        }
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(message) => message,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    fn full_row() -> Value {
        json!({
            "last": "James", "first": "LeBron", "age": 38, "height": 81.0,
            "wingspan": 84.0, "weight": 250, "gp": 55, "mp": 1954
        })
    }

    #[test]
    fn test_player_from_full_row() {
        let player: Player = args(full_row()).parse().unwrap();
        assert_eq!(player.last, "James");
        assert_eq!(player.age, 38.0);
        assert_eq!(player.weight, 250);
    }

    #[test]
    fn test_missing_required_field() {
        let mut row = full_row();
        row.as_object_mut().unwrap().remove("gp");

        let err = args(row).parse::<Player>().unwrap_err();
        assert!(message(err).starts_with("gp: Missing required parameter"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut row = full_row();
        row["team"] = json!("LAL");

        let err = args(row).parse::<Player>().unwrap_err();
        assert_eq!(message(err), "Unknown arguments: team");
    }

    #[test]
    fn test_key_rejects_row_fields() {
        let err = args(full_row()).parse::<PlayerKey>().unwrap_err();
        assert!(message(err).starts_with("Unknown arguments:"));
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(coerce_float("age", &json!("38.5")).unwrap(), 38.5);
        assert_eq!(coerce_float("age", &json!(38)).unwrap(), 38.0);
        assert!(coerce_float("age", &json!("abc")).is_err());
        assert!(coerce_float("age", &json!("NaN")).is_err());
        assert!(coerce_float("age", &json!(true)).is_err());
        assert!(coerce_float("age", &Value::Null).is_err());
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(coerce_int("gp", &json!(70)).unwrap(), 70);
        assert_eq!(coerce_int("gp", &json!(70.0)).unwrap(), 70);
        assert_eq!(coerce_int("gp", &json!(" 70 ")).unwrap(), 70);
        assert!(coerce_int("gp", &json!(70.5)).is_err());
        assert!(coerce_int("gp", &json!("70.5")).is_err());
    }

    #[test]
    fn test_str_coercion() {
        assert_eq!(coerce_str("last", &json!("James")).unwrap(), "James");
        assert_eq!(coerce_str("last", &json!(23)).unwrap(), "23");
        assert!(coerce_str("last", &json!(["James"])).is_err());
    }

    #[test]
    fn test_bool_coercion() {
        assert!(coerce_bool("sort_age", &json!(true)).unwrap());
        assert!(coerce_bool("sort_age", &json!("True")).unwrap());
        assert!(!coerce_bool("sort_age", &json!("false")).unwrap());
        assert!(!coerce_bool("sort_age", &json!(0)).unwrap());
        assert!(coerce_bool("sort_age", &json!("maybe")).is_err());
    }

    #[test]
    fn test_patch_leaves_absent_fields_out() {
        let patch: PlayerPatch = args(json!({"last": "James", "first": "LeBron", "age": 39}))
            .parse()
            .unwrap();

        assert_eq!(patch.key.last, "James");
        assert_eq!(patch.age, Some(39.0));
        assert_eq!(patch.height, None);
        assert_eq!(patch.gp, None);
    }

    #[test]
    fn test_patch_requires_key() {
        let err = args(json!({"last": "James", "age": 39})).parse::<PlayerPatch>().unwrap_err();
        assert!(message(err).starts_with("first:"));
    }

    #[test]
    fn test_sort_query_is_optional() {
        let query: SortQuery = RequestArgs::default().parse().unwrap();
        assert_eq!(query.sort_age, None);
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_collect_body_overrides_query() {
        let query = pairs(&[("last", "Curry"), ("first", "Stephen")]);

        let collected = RequestArgs::collect(query, Vec::new(), br#"{"last": "James"}"#).unwrap();
        let key: PlayerKey = collected.parse().unwrap();
        assert_eq!(key.last, "James");
        assert_eq!(key.first, "Stephen");
    }

    #[test]
    fn test_collect_form_sits_between_query_and_json() {
        let query = pairs(&[("last", "Curry"), ("first", "Stephen")]);
        let form = pairs(&[("first", "Seth"), ("last", "Smith")]);

        let collected = RequestArgs::collect(query, form, br#"{"last": "James"}"#).unwrap();
        let key: PlayerKey = collected.parse().unwrap();
        assert_eq!(key.last, "James");
        assert_eq!(key.first, "Seth");
    }

    #[test]
    fn test_collect_repeated_key_keeps_first_value() {
        let query = pairs(&[("sort_age", "true"), ("sort_age", "false")]);

        let collected = RequestArgs::collect(query, Vec::new(), b"").unwrap();
        let sort: SortQuery = collected.parse().unwrap();
        assert_eq!(sort.sort_age, Some(true));
    }

    #[test]
    fn test_collect_rejects_non_object_body() {
        let err = RequestArgs::collect(Vec::new(), Vec::new(), b"[1, 2]").unwrap_err();
        assert_eq!(message(err), "Request body must be a JSON object");

        assert!(RequestArgs::collect(Vec::new(), Vec::new(), b"{not json").is_err());
    }

    #[test]
    fn test_collect_allows_blank_body() {
        let collected = RequestArgs::collect(Vec::new(), Vec::new(), b"  \n").unwrap();
        assert_eq!(collected, RequestArgs::default());
    }
}
