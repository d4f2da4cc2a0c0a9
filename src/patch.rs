//! JSON Patch documents applied to a flat working copy.
//!
//! Only top-level properties are addressable. Property names match without
//! regard to ASCII case, so `/Titulo` and `/titulo` name the same field.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::{AppError, FieldErrors};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    /// Absent and `null` both mean null.
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl PatchOperation {
    pub fn replace(path: &str, value: impl Into<Value>) -> Self {
        Self { op: PatchOp::Replace, path: path.to_string(), value: value.into(), from: None }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("the target location '{0}' was not found")]
    UnknownPath(String),

    #[error("'{0}' operations require a 'from' location")]
    MissingFrom(String),

    #[error("the current value at '{0}' is not equal to the test value")]
    TestFailed(String),

    #[error("the value for '{path}' is invalid: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("the patch target is not an object")]
    NotAnObject,
}

impl PatchError {
    pub fn path(&self) -> &str {
        match self {
            PatchError::UnknownPath(path)
            | PatchError::MissingFrom(path)
            | PatchError::TestFailed(path)
            | PatchError::InvalidValue { path, .. } => path,
            PatchError::NotAnObject => "",
        }
    }
}

impl From<PatchError> for AppError {
    fn from(err: PatchError) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(err.path().to_string(), vec![err.to_string()]);
        AppError::Validation { status: StatusCode::UNPROCESSABLE_ENTITY, errors }
    }
}

/// Applies `ops` in order to a copy of `target`. The original is untouched
/// and nothing is returned unless every operation succeeds.
pub fn apply<T>(target: &T, ops: &[PatchOperation]) -> Result<T, PatchError>
where
    T: Serialize + DeserializeOwned,
{
    let Ok(Value::Object(mut doc)) = serde_json::to_value(target) else {
        return Err(PatchError::NotAnObject);
    };

    for op in ops {
        apply_one::<T>(&mut doc, op)?;
    }

    from_doc(&doc, "")
}

fn apply_one<T>(doc: &mut Map<String, Value>, op: &PatchOperation) -> Result<(), PatchError>
where
    T: DeserializeOwned,
{
    let key = resolve(doc, &op.path)?;

    match op.op {
        PatchOp::Add | PatchOp::Replace => {
            doc.insert(key, op.value.clone());
        },
        PatchOp::Remove => {
            doc.insert(key, Value::Null);
        },
        PatchOp::Copy | PatchOp::Move => {
            let Some(from) = op.from.as_deref() else {
                return Err(PatchError::MissingFrom(op.path.clone()));
            };
            let from_key = resolve(doc, from)?;
            let value = doc.get(&from_key).cloned().unwrap_or(Value::Null);
            if op.op == PatchOp::Move && from_key != key {
                doc.insert(from_key, Value::Null);
            }
            doc.insert(key, value);
        },
        PatchOp::Test => {
            if !doc.get(&key).is_some_and(|current| same_value(current, &op.value)) {
                return Err(PatchError::TestFailed(op.path.clone()));
            }
        },
    }

    // catch type mismatches at the operation that introduced them
    from_doc::<T>(doc, &op.path).map(|_| ())
}

/// JSON equality, except that numbers compare by value (`90` equals `90.0`).
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn from_doc<T: DeserializeOwned>(doc: &Map<String, Value>, path: &str) -> Result<T, PatchError> {
    serde_json::from_value(Value::Object(doc.clone())).map_err(|e| PatchError::InvalidValue {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn resolve(doc: &Map<String, Value>, path: &str) -> Result<String, PatchError> {
    let unknown = || PatchError::UnknownPath(path.to_string());

    let segment = path.strip_prefix('/').ok_or_else(unknown)?;
    if segment.is_empty() || segment.contains('/') {
        return Err(unknown());
    }
    let segment = segment.replace("~1", "/").replace("~0", "~");

    doc.keys().find(|k| k.eq_ignore_ascii_case(&segment)).cloned().ok_or_else(unknown)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::MoviePayload;

    fn cinderela() -> MoviePayload {
        MoviePayload {
            title: Some("Cinderela".into()),
            genre: Some("Drama".into()),
            duration: Some(90),
        }
    }

    fn ops(raw: Value) -> Vec<PatchOperation> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn replace_changes_only_the_named_field() {
        let patched =
            apply(&cinderela(), &[PatchOperation::replace("/titulo", "Cinderela 2")]).unwrap();
        assert_eq!(patched.title.as_deref(), Some("Cinderela 2"));
        assert_eq!(patched.genre.as_deref(), Some("Drama"));
        assert_eq!(patched.duration, Some(90));
    }

    #[test]
    fn paths_ignore_case() {
        let patched = apply(&cinderela(), &ops(json!([
            { "op": "replace", "path": "/Duracao", "value": 120 }
        ])))
        .unwrap();
        assert_eq!(patched.duration, Some(120));
    }

    #[test]
    fn operations_apply_in_order() {
        let patched = apply(&cinderela(), &ops(json!([
            { "op": "replace", "path": "/titulo", "value": "A" },
            { "op": "test", "path": "/titulo", "value": "A" },
            { "op": "add", "path": "/titulo", "value": "B" }
        ])))
        .unwrap();
        assert_eq!(patched.title.as_deref(), Some("B"));
    }

    #[test]
    fn remove_clears_the_field() {
        let patched = apply(&cinderela(), &ops(json!([{ "op": "remove", "path": "/genero" }])))
            .unwrap();
        assert_eq!(patched.genre, None);
    }

    #[test]
    fn copy_and_move_read_from() {
        let patched = apply(&cinderela(), &ops(json!([
            { "op": "copy", "from": "/titulo", "path": "/genero" }
        ])))
        .unwrap();
        assert_eq!(patched.genre.as_deref(), Some("Cinderela"));
        assert_eq!(patched.title.as_deref(), Some("Cinderela"));

        let patched = apply(&cinderela(), &ops(json!([
            { "op": "move", "from": "/genero", "path": "/titulo" }
        ])))
        .unwrap();
        assert_eq!(patched.title.as_deref(), Some("Drama"));
        assert_eq!(patched.genre, None);
    }

    #[test]
    fn unknown_path_is_rejected() {
        let err = apply(&cinderela(), &[PatchOperation::replace("/diretor", "x")]).unwrap_err();
        assert_eq!(err, PatchError::UnknownPath("/diretor".into()));

        let err = apply(&cinderela(), &[PatchOperation::replace("titulo", "x")]).unwrap_err();
        assert_eq!(err.path(), "titulo");

        let err = apply(&cinderela(), &[PatchOperation::replace("/titulo/0", "x")]).unwrap_err();
        assert!(matches!(err, PatchError::UnknownPath(_)));
    }

    #[test]
    fn wrong_type_names_the_path() {
        let err = apply(&cinderela(), &[PatchOperation::replace("/duracao", "longo")]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidValue { ref path, .. } if path == "/duracao"));
    }

    #[test]
    fn failed_test_aborts() {
        let err = apply(&cinderela(), &ops(json!([
            { "op": "replace", "path": "/titulo", "value": "X" },
            { "op": "test", "path": "/genero", "value": "Comédia" }
        ])))
        .unwrap_err();
        assert_eq!(err, PatchError::TestFailed("/genero".into()));
    }

    #[test]
    fn test_compares_numbers_by_value() {
        let patched = apply(&cinderela(), &ops(json!([
            { "op": "test", "path": "/duracao", "value": 90.0 },
            { "op": "replace", "path": "/duracao", "value": 100 }
        ])))
        .unwrap();
        assert_eq!(patched.duration, Some(100));

        let err = apply(&cinderela(), &ops(json!([
            { "op": "test", "path": "/duracao", "value": 90.5 }
        ])))
        .unwrap_err();
        assert_eq!(err, PatchError::TestFailed("/duracao".into()));

        let err = apply(&cinderela(), &ops(json!([
            { "op": "test", "path": "/duracao", "value": "90" }
        ])))
        .unwrap_err();
        assert_eq!(err, PatchError::TestFailed("/duracao".into()));
    }

    #[test]
    fn copy_without_from_is_rejected() {
        let err = apply(&cinderela(), &ops(json!([{ "op": "copy", "path": "/titulo" }])))
            .unwrap_err();
        assert_eq!(err, PatchError::MissingFrom("/titulo".into()));
    }

    #[test]
    fn unknown_op_does_not_parse() {
        let parsed: Result<Vec<PatchOperation>, _> =
            serde_json::from_value(json!([{ "op": "merge", "path": "/titulo" }]));
        assert!(parsed.is_err());
    }

    #[test]
    fn patch_errors_are_unprocessable() {
        use axum::response::IntoResponse;

        let resp = AppError::from(PatchError::UnknownPath("/x".into())).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
