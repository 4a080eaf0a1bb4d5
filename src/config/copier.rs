use super::traits::ConfigSection;
use crate::error::TechSignalError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopierConfig {
    /// Extensions copied from the top level of the source only
    pub flat_extensions: Vec<String>,
    /// Extensions copied from the whole source tree
    pub recursive_extensions: Vec<String>,
    /// File names never copied by the recursive pass
    pub excluded_names: Vec<String>,
}

impl Default for CopierConfig {
    fn default() -> Self {
        Self {
            flat_extensions: vec![".h".into(), ".cpp".into(), ".ino".into()],
            recursive_extensions: vec![".py".into(), ".md".into(), ".env".into(), ".ipynb".into()],
            excluded_names: vec!["__init__.py".into()],
        }
    }
}

impl ConfigSection for CopierConfig {
    fn section_name() -> &'static str {
        "copier"
    }

    fn validate(&self) -> Result<(), TechSignalError> {
        let all = self.flat_extensions.iter().chain(self.recursive_extensions.iter());
        for ext in all {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(TechSignalError::Configuration(format!(
                    "Extension '{}' must start with a dot",
                    ext
                )));
            }
        }
        Ok(())
    }
}
