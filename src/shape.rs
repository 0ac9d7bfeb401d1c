//! Logical value shapes
//!
//! Shapes describe what a route node is declared to produce: a scalar, a
//! sequence of some element shape, a structured record, or a record bound to
//! a store collection. They exist for construction-time introspection (path
//! descent, relation-target lookup) and are never enforced against runtime
//! values.

use crate::path::{FieldPath, Segment};
use crate::store::{Query, RecordStore, StoreError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Declared structure of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A leaf value with no declared internal structure
    Scalar,
    /// An ordered collection whose elements share one shape
    Sequence(Box<Shape>),
    /// A structured document with declared fields
    Record(Schema),
    /// A record bound to a store collection
    Model(Model),
    /// Structure that could not be determined at construction time
    Unknown,
}

impl Shape {
    /// Convenience constructor for `Sequence` without the `Box` noise
    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence(Box::new(element))
    }

    /// Convenience constructor for `Record`
    pub fn record(schema: Schema) -> Self {
        Shape::Record(schema)
    }

    /// Descend one path segment
    ///
    /// Named segments descend into record or model members, numeric segments
    /// into sequence elements. Anything undeterminable is `Unknown`, never a
    /// guess.
    pub fn descend(&self, segment: &Segment) -> Shape {
        match (self, segment) {
            (Shape::Record(schema), Segment::Name(name)) => schema
                .shape_of(name)
                .cloned()
                .unwrap_or(Shape::Unknown),
            (Shape::Model(model), Segment::Name(name)) => model
                .schema()
                .shape_of(name)
                .cloned()
                .unwrap_or(Shape::Unknown),
            (Shape::Sequence(element), Segment::Index(_)) => (**element).clone(),
            _ => Shape::Unknown,
        }
    }

    /// Descend a full path, segment by segment
    pub fn at_path(&self, path: &FieldPath) -> Shape {
        let mut current = self.clone();
        for segment in path.segments() {
            current = current.descend(segment);
        }
        current
    }

    /// The model this shape names directly, if any
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Shape::Model(model) => Some(model),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Sequence(element) => write!(f, "sequence<{}>", element),
            Shape::Record(schema) => {
                write!(f, "record{{")?;
                for (i, (name, _)) in schema.fields().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", name)?;
                }
                write!(f, "}}")
            }
            Shape::Model(model) => write!(f, "model({})", model.collection()),
            Shape::Unknown => write!(f, "unknown"),
        }
    }
}

/// Declared fields of a record shape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: BTreeMap<String, Shape>,
}

impl Schema {
    /// Empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field declaration
    pub fn with_field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.insert(name.into(), shape);
        self
    }

    /// Declared shape of a field, if present
    pub fn shape_of(&self, name: &str) -> Option<&Shape> {
        self.fields.get(name)
    }

    /// Iterate declared fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Shape)> {
        self.fields.iter().map(|(name, shape)| (name.as_str(), shape))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A schema bound to a named store collection
///
/// Models carry their own store handle, so a relation hop that targets a
/// model knows both where to look and what the records there look like.
/// Equality covers the declared structure, not the bound store.
#[derive(Clone)]
pub struct Model {
    collection: String,
    schema: Schema,
    store: Arc<dyn RecordStore>,
}

impl Model {
    pub fn new(
        collection: impl Into<String>,
        schema: Schema,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            collection: collection.into(),
            schema,
            store,
        }
    }

    /// Collection name in the backing store
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Declared record structure
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Shape of a single record of this model
    pub fn shape(&self) -> Shape {
        Shape::Model(self.clone())
    }

    /// Shape of a list of records of this model
    pub fn many(&self) -> Shape {
        Shape::sequence(Shape::Model(self.clone()))
    }

    /// First record matching `query`, if any
    ///
    /// # Errors
    ///
    /// Propagates the store's error unchanged.
    pub async fn find_one(&self, query: &Query) -> Result<Option<Value>, StoreError> {
        self.store.find_one(&self.collection, query).await
    }

    /// All records matching `query`
    ///
    /// # Errors
    ///
    /// Propagates the store's error unchanged.
    pub async fn find_many(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.store.find_many(&self.collection, query).await
    }

    /// The record whose primary identifier equals `id`, if any
    ///
    /// # Errors
    ///
    /// Propagates the store's error unchanged.
    pub async fn find_by_id(&self, id: &Value) -> Result<Option<Value>, StoreError> {
        self.store.find_by_id(&self.collection, id).await
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("collection", &self.collection)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.collection == other.collection && self.schema == other.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> Schema {
        Schema::new()
            .with_field("name", Shape::Scalar)
            .with_field(
                "roles",
                Shape::sequence(Shape::record(
                    Schema::new().with_field("title", Shape::Scalar),
                )),
            )
    }

    #[test]
    fn test_schema_builder() {
        let schema = user_schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.shape_of("name"), Some(&Shape::Scalar));
        assert!(schema.shape_of("missing").is_none());
    }

    #[test]
    fn test_descend_record_field() {
        let shape = Shape::record(user_schema());
        let name = shape.descend(&Segment::Name("name".into()));
        assert_eq!(name, Shape::Scalar);
    }

    #[test]
    fn test_descend_sequence_index() {
        let shape = Shape::record(user_schema());
        let roles = shape.descend(&Segment::Name("roles".into()));
        let role = roles.descend(&Segment::Index(0));
        assert_eq!(
            role,
            Shape::record(Schema::new().with_field("title", Shape::Scalar))
        );
    }

    #[test]
    fn test_descend_undeterminable_is_unknown() {
        assert_eq!(
            Shape::Scalar.descend(&Segment::Name("x".into())),
            Shape::Unknown
        );
        assert_eq!(
            Shape::record(user_schema()).descend(&Segment::Index(0)),
            Shape::Unknown
        );
        assert_eq!(
            Shape::record(user_schema()).descend(&Segment::Name("missing".into())),
            Shape::Unknown
        );
        assert_eq!(
            Shape::Unknown.descend(&Segment::Name("x".into())),
            Shape::Unknown
        );
    }

    #[test]
    fn test_at_path_walks_all_segments() {
        let shape = Shape::record(user_schema());
        let path: FieldPath = "roles[0].title".parse().unwrap();
        assert_eq!(shape.at_path(&path), Shape::Scalar);

        let missing: FieldPath = "roles[0].missing.deeper".parse().unwrap();
        assert_eq!(shape.at_path(&missing), Shape::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::Scalar.to_string(), "scalar");
        assert_eq!(
            Shape::sequence(Shape::Scalar).to_string(),
            "sequence<scalar>"
        );
        assert_eq!(
            Shape::record(user_schema()).to_string(),
            "record{name, roles}"
        );
        assert_eq!(Shape::Unknown.to_string(), "unknown");
    }

    #[cfg(feature = "memory")]
    mod with_store {
        use super::*;
        use crate::store::MemoryStore;
        use serde_json::json;

        fn users_model(store: Arc<MemoryStore>) -> Model {
            Model::new("users", user_schema(), store)
        }

        #[test]
        fn test_model_equality_ignores_store() {
            let a = users_model(Arc::new(MemoryStore::new()));
            let b = users_model(Arc::new(MemoryStore::new()));
            assert_eq!(a, b);
            assert_eq!(a.shape().to_string(), "model(users)");
            assert_eq!(a.many(), Shape::sequence(Shape::Model(b)));
        }

        #[test]
        fn test_descend_model_field() {
            let model = users_model(Arc::new(MemoryStore::new()));
            let shape = model.shape();
            assert_eq!(shape.descend(&Segment::Name("name".into())), Shape::Scalar);
            assert!(shape.as_model().is_some());
        }

        #[tokio::test]
        async fn test_model_finders() {
            let store = Arc::new(MemoryStore::new());
            let stored = store
                .insert("users", json!({ "name": "alice" }))
                .await
                .unwrap();
            store
                .insert("users", json!({ "name": "bob" }))
                .await
                .unwrap();

            let model = users_model(store);

            let one = model
                .find_one(&Query::eq("name", json!("alice")))
                .await
                .unwrap();
            assert_eq!(one.unwrap()["name"], json!("alice"));

            let all = model.find_many(&Query::new()).await.unwrap();
            assert_eq!(all.len(), 2);

            let by_id = model.find_by_id(&stored["id"]).await.unwrap();
            assert_eq!(by_id.unwrap()["name"], json!("alice"));
        }
    }
}
