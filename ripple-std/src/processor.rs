//! Default param processor.

use ripple_core::{ParamProcessor, Params, SubscriberConfig, ValidationError};

/// Merges the subscriber's defaults into the params, then validates the
/// result against the subscriber's schema.
///
/// Without defaults the params pass through unchanged; without a schema they
/// are accepted as merged.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardProcessor;

impl<P: Params> ParamProcessor<P> for StandardProcessor {
    fn process(&self, params: P, config: &SubscriberConfig<P>) -> Result<P, ValidationError> {
        let params = match &config.default_params {
            Some(defaults) => params.merge_defaults(defaults),
            None => params,
        };
        match &config.schema {
            Some(schema) => schema.validate(params),
            None => Ok(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn passes_params_through_without_config() {
        let out = StandardProcessor.process(json!({"a": 1}), &SubscriberConfig::default());
        assert_eq!(out.unwrap(), json!({"a": 1}));
    }

    #[test]
    fn caller_values_win_over_defaults() {
        let config =
            SubscriberConfig::new().with_defaults(json!({"greeting": "Hello", "name": "nobody"}));
        let out = StandardProcessor.process(json!({"name": "World"}), &config);
        assert_eq!(out.unwrap(), json!({"greeting": "Hello", "name": "World"}));
    }

    #[test]
    fn schema_sees_merged_params() {
        let config = SubscriberConfig::new()
            .with_defaults(json!({"limit": 10}))
            .with_schema(|params: serde_json::Value| {
                if params["limit"].as_u64().is_some_and(|limit| limit <= 100) {
                    Ok(params)
                } else {
                    Err(ValidationError::new("must be at most 100").at("limit"))
                }
            });

        assert_eq!(
            StandardProcessor.process(json!({}), &config).unwrap(),
            json!({"limit": 10})
        );
        let err = StandardProcessor
            .process(json!({"limit": 500}), &config)
            .unwrap_err();
        assert_eq!(err.path(), Some("limit"));
    }
}
