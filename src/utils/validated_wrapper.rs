use axum::{
    extract::{FromRequest, FromRequestParts, OptionalFromRequest, Query, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::utils::api_response::ValidationErrorDetail;
use crate::utils::app_error::AppError;

/// JSON body that has been deserialized and passed `Validate`.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|err| {
            AppError::validation("INVALID_JSON", format!("Invalid JSON format: {}", err.body_text()))
        })?;

        payload
            .validate()
            .map_err(|e| AppError::InvalidFields(map_validation_errors(&e)))?;

        Ok(ValidatedJson(payload))
    }
}

/// Bodyless requests yield `None`; a body that is present must still be valid.
impl<T, S> OptionalFromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        if !req.headers().contains_key(header::CONTENT_TYPE) {
            return Ok(None);
        }
        <Self as FromRequest<S>>::from_request(req, state).await.map(Some)
    }
}

/// Query string counterpart of [`ValidatedJson`].
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| AppError::validation("INVALID_QUERY", err.body_text()))?;

        params
            .validate()
            .map_err(|e| AppError::InvalidFields(map_validation_errors(&e)))?;

        Ok(ValidatedQuery(params))
    }
}

/// Flattens nested validator errors into `field` / `parent.field` entries.
pub fn map_validation_errors(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details = Vec::new();
    collect(errors, None, &mut details);
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<ValidationErrorDetail>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string());
                    out.push(ValidationErrorDetail::new(&path, &err.code, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(inner, Some(&format!("{}[{}]", path, idx)), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "Too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn collects_every_failing_field() {
        let sample = Sample {
            name: "ab".into(),
            email: "nope".into(),
        };
        let details = map_validation_errors(&sample.validate().unwrap_err());
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "email");
        assert_eq!(details[0].title, "email");
        assert_eq!(details[1].field, "name");
        assert_eq!(details[1].message, "Too short");
    }
}
