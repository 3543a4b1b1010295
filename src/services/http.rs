// ============================================================================
// HTTP - Transporte de requests (pipeline de salida)
// ============================================================================
// `HttpTransport` es la costura entre el cliente API y la red: en el navegador
// se usa gloo-net, en los tests un transporte simulado, y el gateway de
// autenticación lo envuelve para firmar cada request.
// ============================================================================

use futures::future::LocalBoxFuture;
use gloo_net::http::{Request, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Archivo a subir en un formulario multipart
#[derive(Clone, Debug, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormField {
    Text(String),
    File(UploadFile),
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// `multipart/form-data`; el navegador pone el boundary
    Multipart(Vec<(String, FormField)>),
}

/// Request saliente, independiente del transporte
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn with_multipart(mut self, fields: Vec<(String, FormField)>) -> Self {
        self.body = Some(RequestBody::Multipart(fields));
        self
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// Campo de un formulario multipart por nombre
    pub fn form_field(&self, name: &str) -> Option<&FormField> {
        match &self.body {
            Some(RequestBody::Multipart(fields)) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, field)| field),
            _ => None,
        }
    }

    /// Valor de un header (nombre sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }
}

/// Respuesta 2xx (las no-2xx llegan como `ApiError::Http`)
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Construye el error de una respuesta no-2xx, conservando el JSON del backend
pub fn http_error(status: u16, status_text: &str, body: &str) -> ApiError {
    let message = if status_text.is_empty() {
        "HTTP error".to_string()
    } else {
        status_text.to_string()
    };
    ApiError::Http {
        status,
        message,
        body: serde_json::from_str(body).ok(),
    }
}

pub type HttpFuture<'a> = LocalBoxFuture<'a, Result<ApiResponse, ApiError>>;

/// Envía requests. Las respuestas no-2xx se devuelven como `ApiError::Http`.
pub trait HttpTransport {
    fn send(&self, request: ApiRequest) -> HttpFuture<'_>;
}

/// Transporte del navegador (fetch vía gloo-net)
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

impl GlooTransport {
    fn builder(request: &ApiRequest) -> RequestBuilder {
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
            HttpMethod::Put => Request::put(&request.url),
            HttpMethod::Patch => Request::patch(&request.url),
            HttpMethod::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder
    }
}

fn form_data(fields: &[(String, FormField)]) -> Result<FormData, ApiError> {
    let js_error = |e: JsValue| ApiError::Serialization(format!("{:?}", e));

    let form = FormData::new().map_err(js_error)?;
    for (name, field) in fields {
        match field {
            FormField::Text(value) => form.append_with_str(name, value).map_err(js_error)?,
            FormField::File(file) => {
                let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(file.bytes.as_slice()));
                let options = BlobPropertyBag::new();
                options.set_type(&file.mimetype);
                let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                    .map_err(js_error)?;
                form.append_with_blob_and_filename(name, &blob, &file.filename)
                    .map_err(js_error)?;
            }
        }
    }
    Ok(form)
}

impl HttpTransport for GlooTransport {
    fn send(&self, request: ApiRequest) -> HttpFuture<'_> {
        Box::pin(async move {
            let builder = Self::builder(&request);
            let sent = match &request.body {
                Some(RequestBody::Json(body)) => builder
                    .json(body)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?
                    .send()
                    .await,
                Some(RequestBody::Multipart(fields)) => builder
                    .body(form_data(fields)?)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?
                    .send()
                    .await,
                None => builder.send().await,
            };
            let response = sent.map_err(|e| ApiError::Network(e.to_string()))?;

            let status = response.status();
            let status_text = response.status_text();
            let body = response.text().await.unwrap_or_default();

            if !response.ok() {
                log::warn!(
                    "❌ [HTTP] {} {} → {} {}",
                    request.method.as_str(),
                    request.url,
                    status,
                    status_text
                );
                return Err(http_error(status, &status_text, &body));
            }

            Ok(ApiResponse { status, body })
        })
    }
}
