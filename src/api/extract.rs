//! Request body and path extraction with structured validation errors.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, RawPathParams, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
};

use crate::error::ApiError;

/// JSON body extractor whose rejections are [`ApiError`]s (422) instead of
/// axum's plain-text responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(rejection_to_error(&rejection)),
        }
    }
}

/// Path extractor whose rejections are [`ApiError`]s.
///
/// A parameter that does not parse (`/tasks/abc`) is a 422 naming the route
/// parameter, so path and body failures share one error shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
    T: Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ValidPath(value)),
            Err(rejection) => {
                if rejection.status().is_server_error() {
                    return Err(ApiError::internal(rejection.body_text()));
                }
                let field = match RawPathParams::from_request_parts(parts, state).await {
                    Ok(params) => single_param_name(params.iter().map(|(name, _)| name)),
                    Err(_) => None,
                };
                let field = field.unwrap_or_else(|| "path".to_string());
                Err(ApiError::invalid_value(&field, rejection.body_text()))
            }
        }
    }
}

fn single_param_name<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<String> {
    let first = names.next()?;
    match names.next() {
        None => Some(first.to_string()),
        Some(_) => None,
    }
}

/// Pull the backticked field name out of a serde message such as
/// "missing field `title` at line 1 column 20".
fn backticked_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find('`')?;
    Some(&rest[..end])
}

fn rejection_to_error(rejection: &JsonRejection) -> ApiError {
    let text = rejection.body_text();
    match rejection {
        JsonRejection::JsonDataError(_) => {
            if let Some(field) = backticked_after(&text, "missing field `") {
                ApiError::missing_field(field).with_details(text.clone())
            } else if let Some(field) = backticked_after(&text, "unknown field `") {
                ApiError::invalid_value(field, format!("unknown field: {}", field))
                    .with_details(text.clone())
            } else {
                ApiError::malformed_body(text)
            }
        }
        _ => ApiError::malformed_body(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backticked_after() {
        let msg = "Failed to deserialize the JSON body into the target type: missing field `goal_id` at line 1 column 9";
        assert_eq!(backticked_after(msg, "missing field `"), Some("goal_id"));
        assert_eq!(backticked_after(msg, "unknown field `"), None);
        assert_eq!(backticked_after("missing field `oops", "missing field `"), None);
    }

    #[test]
    fn test_single_param_name() {
        assert_eq!(single_param_name(["task_id"].into_iter()), Some("task_id".to_string()));
        assert_eq!(single_param_name(["a", "b"].into_iter()), None);
        assert_eq!(single_param_name(std::iter::empty()), None);
    }
}
