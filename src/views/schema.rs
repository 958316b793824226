//! Schemas: serialization and validation bound to request context

use crate::core::error::{FieldValidationError, ViewError, ViewResult};
use crate::core::model::Model;
use crate::core::request::ApiRequest;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use validator::Validate;

/// Context a schema instance is created with
///
/// Holds the current request under `request` plus any extra values a view
/// chose to pass along, so serialization can depend on request state.
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    request: Option<ApiRequest>,
    values: Map<String, Value>,
}

impl SchemaContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, request: ApiRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// The request this schema serves
    pub fn request(&self) -> Option<&ApiRequest> {
        self.request.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Overlay `extra` on this context; keys in `extra` win
    pub fn merge(mut self, extra: Map<String, Value>) -> Self {
        self.values.extend(extra);
        self
    }
}

/// A serializer/validator for model `M`
///
/// Implementations are created per request from a [`SchemaClass`] with a
/// [`SchemaContext`].
pub trait Schema<M>: Send + Sync {
    fn context(&self) -> &SchemaContext;

    /// Serialize one instance
    fn dump(&self, instance: &M) -> ViewResult<Value>;

    /// Serialize many instances into a JSON array
    fn dump_many(&self, instances: &[M]) -> ViewResult<Value> {
        instances
            .iter()
            .map(|instance| self.dump(instance))
            .collect::<ViewResult<Vec<_>>>()
            .map(Value::Array)
    }

    /// Deserialize and validate a full payload
    fn load(&self, data: Value) -> ViewResult<M>;

    /// Apply a partial payload on top of an existing instance
    fn load_partial(&self, data: Value, instance: &M) -> ViewResult<M>;
}

/// Factory building a schema instance from its context
pub type SchemaClass<M> = Arc<dyn Fn(SchemaContext) -> Box<dyn Schema<M>> + Send + Sync>;

/// Schema driven by the model's serde and `validator` derives
pub struct ModelSchema<M> {
    context: SchemaContext,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model + Validate> ModelSchema<M> {
    pub fn new(context: SchemaContext) -> Self {
        Self {
            context,
            _model: PhantomData,
        }
    }

    /// The schema class to put in a view configuration
    pub fn class() -> SchemaClass<M> {
        Arc::new(|context: SchemaContext| -> Box<dyn Schema<M>> {
            Box::new(ModelSchema::<M>::new(context))
        })
    }
}

impl<M: Model + Validate> Schema<M> for ModelSchema<M> {
    fn context(&self) -> &SchemaContext {
        &self.context
    }

    fn dump(&self, instance: &M) -> ViewResult<Value> {
        Ok(instance.to_row()?)
    }

    fn load(&self, data: Value) -> ViewResult<M> {
        let instance: M = serde_json::from_value(data).map_err(|e| {
            ViewError::Validation(vec![FieldValidationError {
                field: "body".to_string(),
                message: e.to_string(),
            }])
        })?;
        instance.validate()?;
        Ok(instance)
    }

    fn load_partial(&self, data: Value, instance: &M) -> ViewResult<M> {
        let Value::Object(changes) = data else {
            return Err(ViewError::bad_request("Partial update body must be a JSON object"));
        };
        let mut merged = instance.to_row()?;
        if let Some(object) = merged.as_object_mut() {
            object.extend(changes);
        }
        self.load(merged)
    }
}
