//! A document store over `serde_json` values, with JSONPath paths.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Map, Value as JsonValue};
use serde_json_path::JsonPath;
use tracing::{debug, warn};

use super::{DocumentStore, Documents};
use crate::{
    error::StoreError,
    functions,
    value::{Value, parse_decimal},
};

/// A store function: the current document and the evaluated arguments.
pub type JsonFunction = dyn Fn(&JsonValue, &[Value]) -> Result<Value, StoreError> + Send + Sync;

/// Where a [`JsonStore`] gets its documents.
pub trait JsonSource {
    fn read(&self, from: &str) -> Result<Documents<'_, JsonValue>, StoreError>;

    fn read_keys(&self, from: &str, keys: &[String]) -> Result<Documents<'_, JsonValue>, StoreError>;
}

/// Named collections of documents held in memory.
///
/// KEYS match the value found at the key path, compared as text, so the
/// key `"1"` matches both `1` and `"1"`.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    collections: HashMap<String, Vec<JsonValue>>,
    key_path: JsonPath,
}

impl InMemorySource {
    pub const DEFAULT_KEY_PATH: &'static str = "$.id";

    pub fn new() -> Self {
        InMemorySource {
            collections: HashMap::new(),
            key_path: compile(Self::DEFAULT_KEY_PATH).expect("default key path is valid JSONPath"),
        }
    }

    /// Load a data set: an object mapping collection names to arrays of
    /// documents. A single non-array entry counts as a one-document
    /// collection.
    ///
    /// ```
    /// use rolls_engine::store::InMemorySource;
    /// use serde_json::json;
    ///
    /// let source = InMemorySource::from_json(json!({
    ///     "people": [{ "id": 1, "name": "Fred" }],
    /// })).unwrap();
    /// assert_eq!(source.len("people"), Some(1));
    /// ```
    pub fn from_json(data: JsonValue) -> Result<Self, StoreError> {
        let JsonValue::Object(collections) = data else {
            return Err(StoreError::InvalidData(
                "expected an object of named collections".to_string(),
            ));
        };

        let mut source = InMemorySource::new();
        for (name, documents) in collections {
            let documents = match documents {
                JsonValue::Array(items) => items,
                single => vec![single],
            };
            source = source.with_collection(name, documents);
        }
        Ok(source)
    }

    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<JsonValue>) -> Self {
        self.collections.insert(name.into(), documents);
        self
    }

    /// Use a different path to find a document's key.
    pub fn with_key_path(mut self, path: &str) -> Result<Self, StoreError> {
        self.key_path = compile(path)?;
        Ok(self)
    }

    /// Number of documents in a collection, `None` if it does not exist.
    pub fn len(&self, from: &str) -> Option<usize> {
        self.collections.get(from).map(Vec::len)
    }

    fn collection(&self, from: &str) -> Result<&[JsonValue], StoreError> {
        self.collections
            .get(from)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::UnknownSource(from.to_string()))
    }

    fn key_of(&self, document: &JsonValue) -> Option<String> {
        match self.key_path.query(document).first() {
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(JsonValue::Number(n)) => Some(n.to_string()),
            Some(JsonValue::Bool(b)) => Some(b.to_string()),
            Some(_) => None,
            None => {
                warn!(key_path = %self.key_path, "document has no key");
                None
            }
        }
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSource for InMemorySource {
    fn read(&self, from: &str) -> Result<Documents<'_, JsonValue>, StoreError> {
        Ok(Box::new(self.collection(from)?.iter().cloned()))
    }

    fn read_keys(&self, from: &str, keys: &[String]) -> Result<Documents<'_, JsonValue>, StoreError> {
        let keys = keys.to_vec();
        let documents = self.collection(from)?.iter().filter(move |document| {
            self.key_of(document)
                .is_some_and(|key| keys.iter().any(|k| *k == key))
        });
        Ok(Box::new(documents.cloned()))
    }
}

/// Compiled paths kept per store before the cache starts over.
const PATH_CACHE_LIMIT: usize = 256;

/// [`DocumentStore`] over JSON documents.
///
/// Paths are JSONPath (RFC 9535). A path whose text ends in `]` reads as an
/// array of every matched node; any other path reads the first match, or
/// null when nothing matches.
pub struct JsonStore<S> {
    source: S,
    paths: Mutex<HashMap<String, Arc<JsonPath>>>,
    functions: HashMap<String, Arc<JsonFunction>>,
}

impl<S: JsonSource> JsonStore<S> {
    pub fn new(source: S) -> Self {
        JsonStore {
            source,
            paths: Mutex::new(HashMap::new()),
            functions: HashMap::new(),
        }
    }

    /// Register a function for queries to call. Names are case-insensitive
    /// and built-in functions take precedence.
    pub fn with_function<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&JsonValue, &[Value]) -> Result<Value, StoreError> + Send + Sync + 'static,
    {
        if functions::is_builtin(name) {
            warn!(function = name, "store function is shadowed by a built-in");
        }
        self.functions
            .insert(name.to_ascii_lowercase(), Arc::new(function));
        self
    }

    fn compiled(&self, path: &str) -> Result<Arc<JsonPath>, StoreError> {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(compiled) = paths.get(path) {
            return Ok(Arc::clone(compiled));
        }

        let compiled = Arc::new(compile(path)?);
        if paths.len() >= PATH_CACHE_LIMIT {
            debug!(entries = paths.len(), "clearing compiled path cache");
            paths.clear();
        }
        paths.insert(path.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }
}

impl<S: JsonSource> DocumentStore for JsonStore<S> {
    type Document = JsonValue;

    fn new_document(&self) -> JsonValue {
        JsonValue::Object(Map::new())
    }

    fn add(&self, mut document: JsonValue, name: &str, value: Value) -> JsonValue {
        if value.is_null() {
            return document;
        }
        match document.as_object_mut() {
            Some(fields) => {
                fields.insert(name.to_string(), value_to_json(value));
            }
            None => warn!(field = name, "cannot add a field to a non-object document"),
        }
        document
    }

    fn read(&self, source: &str) -> Result<Documents<'_, JsonValue>, StoreError> {
        debug!(source, "reading source");
        self.source.read(source)
    }

    fn read_keys(&self, source: &str, keys: &[String]) -> Result<Documents<'_, JsonValue>, StoreError> {
        debug!(source, keys = keys.len(), "reading source by key");
        self.source.read_keys(source, keys)
    }

    fn path(&self, document: &JsonValue, path: &str) -> Result<Value, StoreError> {
        let compiled = self.compiled(path)?;
        let nodes = compiled.query(document);

        let value = if path.ends_with(']') {
            Value::Array(nodes.all().into_iter().map(json_to_value).collect())
        } else {
            nodes.first().map_or(Value::Null, json_to_value)
        };
        Ok(value)
    }

    fn execute(&self, document: &JsonValue, name: &str, args: &[Value]) -> Result<Value, StoreError> {
        match self.functions.get(&name.to_ascii_lowercase()) {
            Some(function) => function(document, args),
            None => Err(StoreError::NotImplemented(name.to_string())),
        }
    }
}

fn compile(path: &str) -> Result<JsonPath, StoreError> {
    JsonPath::parse(path).map_err(|e| StoreError::InvalidPath {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Convert a JSON node to a runtime value.
pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => Value::Number(json_number(n)),
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        JsonValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect(),
        ),
    }
}

fn json_number(n: &serde_json::Number) -> Decimal {
    if let Some(i) = n.as_i64() {
        Decimal::from(i)
    } else if let Some(u) = n.as_u64() {
        Decimal::from(u)
    } else {
        parse_decimal(&n.to_string())
            .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Convert a runtime value to JSON. Whole numbers become JSON integers.
pub fn value_to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::Number(n) => decimal_to_json(n),
        Value::Text(s) => JsonValue::String(s),
        Value::Array(items) => JsonValue::Array(items.into_iter().map(value_to_json).collect()),
        Value::Object(fields) => JsonValue::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

fn decimal_to_json(n: Decimal) -> JsonValue {
    if n.fract().is_zero() {
        if let Some(i) = n.to_i64() {
            return JsonValue::from(i);
        }
    }
    // decimal text, so fractions are written exactly as computed
    n.normalize()
        .to_string()
        .parse::<serde_json::Number>()
        .map_or(JsonValue::Null, JsonValue::Number)
}
