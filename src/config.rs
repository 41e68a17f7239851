use serde::Deserialize;

/// What writing an annotation field that the header does not declare does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndeclaredFieldPolicy {
    /// Fail with an unknown field error; the field has to be declared first.
    Reject,
    /// Declare the field in the header with a descriptor inferred from the value.
    Declare,
    /// Write the value into the record only, leaving the header untouched.
    WriteThrough,
}

impl Default for UndeclaredFieldPolicy {
    fn default() -> Self {
        UndeclaredFieldPolicy::Reject
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BinderConfig {
    /// Running engine version checked by minimum version requirements.
    pub engine_version: String,
    pub undeclared_info: UndeclaredFieldPolicy,
    /// Description given to fields declared implicitly under [`UndeclaredFieldPolicy::Declare`].
    pub declared_description: String,
}

impl Default for BinderConfig {
    fn default() -> Self {
        BinderConfig {
            engine_version: env!("CARGO_PKG_VERSION").to_owned(),
            undeclared_info: UndeclaredFieldPolicy::default(),
            declared_description: "Added by expression".to_owned(),
        }
    }
}

impl BinderConfig {
    pub fn with_engine_version<S: Into<String>>(mut self, version: S) -> Self {
        self.engine_version = version.into();
        self
    }

    pub fn with_undeclared_info(mut self, policy: UndeclaredFieldPolicy) -> Self {
        self.undeclared_info = policy;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BinderConfig::default();
        assert_eq!(config.engine_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.undeclared_info, UndeclaredFieldPolicy::Reject);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: BinderConfig =
            serde_json::from_str(r#"{"engine-version": "3.12.1", "undeclared-info": "write-through"}"#)
                .unwrap();
        assert_eq!(config.engine_version, "3.12.1");
        assert_eq!(config.undeclared_info, UndeclaredFieldPolicy::WriteThrough);
        assert_eq!(
            config.declared_description,
            BinderConfig::default().declared_description
        );
    }
}
