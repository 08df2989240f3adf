//! Params trait for values flowing through a cascade.

use std::collections::{BTreeMap, HashMap};

/// A value that can be dispatched and passed along a cascade.
///
/// The same type is used for the dispatched params, the params each
/// subscriber sees and the final dispatch result. Params must be
/// `Clone + Send + Sync + 'static` so cascades can hand them across tasks.
///
/// [`merge_defaults`](Params::merge_defaults) layers the supplied value over a
/// subscription's `default_params`. The default keeps the supplied value.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as dispatch params",
    label = "must implement `Params`",
    note = "Params must be `Clone + Send + Sync + 'static` and implement `Params`."
)]
pub trait Params: Clone + Send + Sync + 'static {
    /// Merge `self` over `defaults`. Supplied values win.
    fn merge_defaults(self, defaults: &Self) -> Self {
        let _ = defaults;
        self
    }
}

macro_rules! scalar_params {
    ($($ty:ty),* $(,)?) => {
        $(impl Params for $ty {})*
    };
}

scalar_params!(
    (),
    bool,
    char,
    String,
    &'static str,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

impl<T: Params> Params for Vec<T> {}

impl<T: Params> Params for std::sync::Arc<T> {}

impl<T: Params> Params for Option<T> {
    fn merge_defaults(self, defaults: &Self) -> Self {
        match (self, defaults) {
            (Some(value), Some(defaults)) => Some(value.merge_defaults(defaults)),
            (None, defaults) => defaults.clone(),
            (value, None) => value,
        }
    }
}

impl<V: Params> Params for HashMap<String, V> {
    fn merge_defaults(self, defaults: &Self) -> Self {
        let mut merged = defaults.clone();
        merged.extend(self);
        merged
    }
}

impl<V: Params> Params for BTreeMap<String, V> {
    fn merge_defaults(self, defaults: &Self) -> Self {
        let mut merged = defaults.clone();
        merged.extend(self);
        merged
    }
}

#[cfg(feature = "serde_json")]
mod json {
    use super::Params;
    use serde_json::Value;

    /// Objects merge key by key; `null` takes object defaults whole.
    impl Params for Value {
        fn merge_defaults(self, defaults: &Self) -> Self {
            match (self, defaults) {
                (Value::Object(supplied), Value::Object(defaults)) => {
                    let mut merged = defaults.clone();
                    merged.extend(supplied);
                    Value::Object(merged)
                }
                (Value::Null, defaults @ Value::Object(_)) => defaults.clone(),
                (supplied, _) => supplied,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_objects_merge_supplied_over_defaults() {
        use serde_json::json;

        let merged = json!({"name": "ada", "admin": true})
            .merge_defaults(&json!({"admin": false, "lang": "en"}));
        assert_eq!(merged, json!({"name": "ada", "admin": true, "lang": "en"}));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_null_takes_defaults() {
        use serde_json::{Value, json};
        assert_eq!(Value::Null.merge_defaults(&json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn scalars_keep_supplied_value() {
        assert_eq!("World".to_string().merge_defaults(&"x".into()), "World");
        assert_eq!(3i32.merge_defaults(&7), 3);
    }

    #[test]
    fn option_falls_back_to_defaults() {
        assert_eq!(None::<i32>.merge_defaults(&Some(4)), Some(4));
        assert_eq!(Some(1).merge_defaults(&Some(4)), Some(1));
    }

    #[test]
    fn maps_merge_keys() {
        let defaults = HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
        let supplied = HashMap::from([("b".to_string(), 20)]);
        let merged = supplied.merge_defaults(&defaults);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 20);
    }
}
