use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{
    CodeUnitKey, ImportContext, RawAnnotation, RawCall, RawClass, RawClassHeader, RawCodeUnit,
    RawField, RawFieldAccess, RawType, RawTypeParameter,
};

/// Serialized form of an import batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BatchFile {
    #[serde(default)]
    classes: Vec<RawClass>,
}

/// An in-memory [`ImportContext`] over a list of raw class records.
///
/// This is the form in which an external importer hands its output over,
/// either built programmatically or read from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "BatchFile", into = "BatchFile")]
pub struct ImportBatch {
    classes: Vec<RawClass>,
    by_name: HashMap<String, usize>,
}

impl From<BatchFile> for ImportBatch {
    fn from(file: BatchFile) -> Self {
        file.classes
            .into_iter()
            .fold(ImportBatch::new(), |batch, class| batch.with_class(class))
    }
}

impl From<ImportBatch> for BatchFile {
    fn from(batch: ImportBatch) -> Self {
        BatchFile {
            classes: batch.classes,
        }
    }
}

impl ImportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class record. A later record for an already known name is kept
    /// in the list but never looked up.
    pub fn with_class(mut self, class: RawClass) -> Self {
        self.push(class);
        self
    }

    pub fn push(&mut self, class: RawClass) {
        let index = self.classes.len();
        self.by_name.entry(class.name.clone()).or_insert(index);
        self.classes.push(class);
    }

    pub fn classes(&self) -> &[RawClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let batch: ImportBatch = serde_json::from_str(json)?;
        Ok(batch)
    }

    /// Load a batch from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn class(&self, name: &str) -> Option<&RawClass> {
        self.by_name.get(name).map(|index| &self.classes[*index])
    }

    /// Type parameters of a class and its enclosing classes, innermost first.
    fn type_parameter_scopes(&self, owner: &str) -> Vec<&[RawTypeParameter]> {
        let mut scopes = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.class(owner);
        while let Some(class) = current {
            if !seen.insert(class.name.as_str()) {
                break;
            }
            scopes.push(class.type_parameters.as_slice());
            current = class.enclosing_class.as_deref().and_then(|name| self.class(name));
        }
        scopes
    }

    fn code_unit(&self, key: &CodeUnitKey) -> Option<&RawCodeUnit> {
        let scopes = self.type_parameter_scopes(&key.owner);
        self.class(&key.owner)?.code_units().find(|code_unit| {
            code_unit.name == key.name && code_unit.descriptor_in(&scopes) == key.descriptor
        })
    }

    fn from_code_unit<T: Clone>(
        &self,
        key: &CodeUnitKey,
        select: impl Fn(&RawCodeUnit) -> &Vec<T>,
    ) -> Vec<T> {
        self.code_unit(key)
            .map(|code_unit| select(code_unit).clone())
            .unwrap_or_default()
    }

    fn from_class<T>(&self, owner: &str, select: impl Fn(&RawClass) -> T) -> Option<T> {
        self.class(owner).map(select)
    }
}

impl ImportContext for ImportBatch {
    fn imported_classes(&self) -> Vec<RawClassHeader> {
        self.classes.iter().map(RawClass::header).collect()
    }

    fn create_super_class(&self, owner: &str) -> Option<RawType> {
        self.from_class(owner, RawClass::effective_superclass)
            .flatten()
    }

    fn create_interfaces(&self, owner: &str) -> Vec<RawType> {
        self.from_class(owner, |class| class.interfaces.clone())
            .unwrap_or_default()
    }

    fn create_type_parameters(&self, owner: &str) -> Vec<RawTypeParameter> {
        self.from_class(owner, |class| class.type_parameters.clone())
            .unwrap_or_default()
    }

    fn create_enclosing_class(&self, owner: &str) -> Option<String> {
        self.from_class(owner, |class| class.enclosing_class.clone())
            .flatten()
    }

    fn create_fields(&self, owner: &str) -> Vec<RawField> {
        self.from_class(owner, |class| class.fields.clone())
            .unwrap_or_default()
    }

    fn create_methods(&self, owner: &str) -> Vec<RawCodeUnit> {
        self.from_class(owner, |class| class.methods.clone())
            .unwrap_or_default()
    }

    fn create_constructors(&self, owner: &str) -> Vec<RawCodeUnit> {
        self.from_class(owner, |class| class.constructors.clone())
            .unwrap_or_default()
    }

    fn create_static_initializer(&self, owner: &str) -> Option<RawCodeUnit> {
        self.from_class(owner, |class| class.static_initializer.clone())
            .flatten()
    }

    fn create_annotations(&self, owner: &str) -> Vec<RawAnnotation> {
        self.from_class(owner, |class| class.annotations.clone())
            .unwrap_or_default()
    }

    fn field_accesses_for(&self, code_unit: &CodeUnitKey) -> Vec<RawFieldAccess> {
        self.from_code_unit(code_unit, |c| &c.field_accesses)
    }

    fn method_calls_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall> {
        self.from_code_unit(code_unit, |c| &c.method_calls)
    }

    fn constructor_calls_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall> {
        self.from_code_unit(code_unit, |c| &c.constructor_calls)
    }

    fn method_references_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall> {
        self.from_code_unit(code_unit, |c| &c.method_references)
    }

    fn constructor_references_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall> {
        self.from_code_unit(code_unit, |c| &c.constructor_references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> ImportBatch {
        ImportBatch::new()
            .with_class(
                RawClass::new("com.example.A").method(
                    RawCodeUnit::method("foo", &[], "void")
                        .line(4)
                        .calls("com.example.B", "bar", &[], "void", 5),
                ),
            )
            .with_class(RawClass::interface("com.example.B"))
    }

    #[test]
    fn test_lookup_by_owner() {
        let batch = batch();
        assert_eq!(batch.imported_classes().len(), 2);
        assert_eq!(
            batch.create_super_class("com.example.A"),
            Some(RawType::class("java.lang.Object"))
        );
        assert_eq!(batch.create_super_class("com.example.B"), None);
        assert_eq!(batch.create_methods("com.example.A").len(), 1);
        assert!(batch.create_methods("com.example.Missing").is_empty());
    }

    #[test]
    fn test_accesses_by_code_unit_key() {
        let batch = batch();
        let key = CodeUnitKey {
            owner: "com.example.A".to_string(),
            name: "foo".to_string(),
            descriptor: "()V".to_string(),
        };
        let calls = batch.method_calls_for(&key);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].owner, "com.example.B");
        assert_eq!(calls[0].line, 5);

        let wrong_descriptor = CodeUnitKey {
            descriptor: "(I)V".to_string(),
            ..key
        };
        assert!(batch.method_calls_for(&wrong_descriptor).is_empty());
    }

    #[test]
    fn test_duplicate_records_first_wins() {
        let batch = ImportBatch::new()
            .with_class(RawClass::new("com.example.A").extends("com.example.First"))
            .with_class(RawClass::new("com.example.A").extends("com.example.Second"));
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.create_super_class("com.example.A"),
            Some(RawType::class("com.example.First"))
        );
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, serde_json::to_string(&batch()).unwrap()).unwrap();

        let loaded = ImportBatch::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.classes()[0].methods[0].method_calls[0].name, "bar");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = ImportBatch::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
