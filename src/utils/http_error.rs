// ============================================================================
// HTTP ERROR - Mensajes legibles a partir de errores del backend
// ============================================================================
// El backend Flask responde `{ "msg": ... }` donde `msg` puede ser un string,
// una lista o un dict de errores de validación (a veces como repr de Python).
// ============================================================================

use serde_json::Value;

use crate::error::ApiError;

/// Mensaje para mostrar al usuario: prioriza el `msg` del backend y si no hay,
/// usa la descripción del propio error.
pub fn extract_error_message(error: &ApiError) -> Option<String> {
    let backend = match error {
        ApiError::Http { body: Some(body), .. } => backend_message(body),
        _ => None,
    };

    match backend {
        Some(raw) => format_raw_message(raw),
        None => format_raw_message(&Value::String(error.to_string())),
    }
}

/// Normaliza strings tipo `{'email': ['Not a valid email.']}` (repr de un dict
/// de Python) a texto plano. Cualquier otro string se devuelve recortado.
pub fn normalize_error_string(message: &str) -> String {
    let trimmed = message.trim();
    if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return trimmed.to_string();
    }

    let as_json = trimmed
        .replace('\'', "\"")
        .replace("None", "null")
        .replace("True", "true")
        .replace("False", "false");

    match serde_json::from_str::<Value>(&as_json) {
        Ok(Value::String(s)) => s,
        Ok(parsed @ (Value::Array(_) | Value::Object(_))) => {
            format_raw_message(&parsed).unwrap_or_else(|| trimmed.to_string())
        }
        _ => trimmed.to_string(),
    }
}

fn backend_message(payload: &Value) -> Option<&Value> {
    payload.as_object()?.get("msg")
}

fn format_raw_message(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(normalize_error_string(s)),
        Value::Array(items) => Some(join_items(items.iter())),
        Value::Object(map) => {
            let parts = map.values().flat_map(|value| match value {
                Value::Array(items) => items.iter().collect::<Vec<_>>(),
                other => vec![other],
            });
            Some(join_items(parts))
        }
        _ => None,
    }
}

fn join_items<'a>(items: impl Iterator<Item = &'a Value>) -> String {
    items.map(stringify_item).collect::<Vec<_>>().join(" ")
}

fn stringify_item(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
