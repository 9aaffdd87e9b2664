use serde_json::{Map, Value};

use super::settings::IngestSettings;
use crate::core::errors::ApiError;

pub(crate) fn overlap_error() -> ApiError {
    ApiError::BadRequest(
        "Invalid config at 'ingest.chunk_overlap': must be smaller than chunk_size".to_string(),
    )
}

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65_535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(logging) = expect_optional_object(root, "logging")? {
        validate_optional_string_field(logging, "logging.level", "level")?;
    }

    if let Some(inference) = expect_optional_object(root, "inference")? {
        validate_url_field(inference, "inference.base_url", "base_url")?;
        validate_non_empty_string_field(
            inference,
            "inference.embedding_model",
            "embedding_model",
        )?;
        validate_non_empty_string_field(
            inference,
            "inference.generation_model",
            "generation_model",
        )?;
        validate_f64_field(inference, "inference.temperature", "temperature", 0.0, 2.0)?;
        validate_u64_field(
            inference,
            "inference.pull_timeout_secs",
            "pull_timeout_secs",
            1,
            86_400,
        )?;
    }

    if let Some(store) = expect_optional_object(root, "vector_store")? {
        validate_optional_string_field(store, "vector_store.api_key", "api_key")?;
        validate_non_empty_string_field(store, "vector_store.index_name", "index_name")?;
        validate_optional_string_field(store, "vector_store.index_host", "index_host")?;
        validate_url_field(
            store,
            "vector_store.control_plane_url",
            "control_plane_url",
        )?;
        validate_non_empty_string_field(store, "vector_store.namespace", "namespace")?;
        validate_u64_field(store, "vector_store.top_k", "top_k", 1, 100)?;
    }

    if let Some(chat) = expect_optional_object(root, "chat")? {
        validate_u64_field(chat, "chat.history_turns", "history_turns", 0, 1_000)?;
    }

    if let Some(ingest) = expect_optional_object(root, "ingest")? {
        validate_u64_field(ingest, "ingest.chunk_size", "chunk_size", 1, 100_000)?;
        validate_u64_field(ingest, "ingest.chunk_overlap", "chunk_overlap", 0, 100_000)?;
        // Missing keys fall back to the defaults they will deserialize to.
        let defaults = IngestSettings::default();
        let size = ingest
            .get("chunk_size")
            .and_then(Value::as_u64)
            .unwrap_or(defaults.chunk_size as u64);
        let overlap = ingest
            .get("chunk_overlap")
            .and_then(Value::as_u64)
            .unwrap_or(defaults.chunk_overlap as u64);
        if overlap >= size {
            return Err(overlap_error());
        }
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(out_of_range(path, min, max));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(out_of_range(path, min, max));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    match section.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(config_type_error(path, "string")),
    }
}

fn validate_non_empty_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_url_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    validate_non_empty_string_field(section, path, key)?;
    let Some(text) = section.get(key).and_then(Value::as_str) else {
        return Ok(());
    };
    if !(text.starts_with("http://") || text.starts_with("https://")) {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': expected an http(s) URL",
            path
        )));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn out_of_range<T: std::fmt::Display>(path: &str, min: T, max: T) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': must be between {} and {}",
        path, min, max
    ))
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
