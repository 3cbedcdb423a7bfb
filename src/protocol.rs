//! The request/response exchange every facade call goes through:
//! send through the shared transport, validate the status, then interpret the body.

use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::errors::{DockerError, Result};
use crate::http::{Method, Request, Response, Transport};
use crate::validate::{validate, Operation};
use crate::JsonObject;

/// Send one request and validate the status for `operation`. The body is untouched.
#[cfg_attr(
    feature = "telemetry",
    instrument(
        level = "debug",
        skip_all,
        fields(operation = operation.name(), method = %method, uri = %uri)
    )
)]
pub(crate) fn exchange(
    transport: &dyn Transport,
    operation: Operation,
    method: Method,
    uri: Url,
    body: Option<&Value>,
) -> Result<Response> {
    let mut request = Request::new(method, uri.clone());
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = transport.send(request)?;
    #[cfg(feature = "telemetry")]
    tracing::debug!(status = response.status(), "daemon responded");
    validate(response, operation, method, &uri)
}

/// Parse the body as a single JSON object.
pub(crate) fn parse_object(response: Response, uri: &Url) -> Result<JsonObject> {
    match parse_value(response, uri)? {
        Value::Object(obj) => Ok(obj),
        other => Err(DockerError::malformed(
            uri,
            format!("expected a JSON object, got {}", kind(&other)),
        )),
    }
}

/// Parse the body as a JSON array whose elements are all objects, keeping order.
pub(crate) fn parse_object_array(response: Response, uri: &Url) -> Result<Vec<JsonObject>> {
    let items = match parse_value(response, uri)? {
        Value::Array(items) => items,
        other => {
            return Err(DockerError::malformed(
                uri,
                format!("expected a JSON array, got {}", kind(&other)),
            ))
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(obj) => Ok(obj),
            other => Err(DockerError::malformed(
                uri,
                format!("array element {i} is {}, expected an object", kind(&other)),
            )),
        })
        .collect()
}

/// Read the body to completion and drop it.
pub(crate) fn discard(response: Response) -> Result<()> {
    response.drain()?;
    Ok(())
}

/// String `Id` of an identity document.
pub(crate) fn id_of<'a>(obj: &'a JsonObject, uri: &Url) -> Result<&'a str> {
    obj.get("Id")
        .and_then(Value::as_str)
        .ok_or_else(|| DockerError::malformed(uri, "object has no string \"Id\" field"))
}

fn parse_value(response: Response, uri: &Url) -> Result<Value> {
    let bytes = response.bytes()?;
    serde_json::from_slice(&bytes).map_err(|source| DockerError::Json {
        uri: uri.to_string(),
        source,
    })
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
