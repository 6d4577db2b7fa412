use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest},
    http::Request,
    Json,
};
use validator::{Validate, ValidationErrors};

use crate::error::PortalError;

/// JSON request body checked with [`validator`] rules before it reaches
/// a handler.
///
/// Rule violations are reported as [`PortalError::InvalidField`] naming the
/// first invalid field, so the checks happen before any wallet interaction.
pub(crate) struct ValidatedJson<T>(pub T);

fn invalid_field(errors: ValidationErrors) -> PortalError {
    let field = errors
        .field_errors()
        .into_keys()
        .min()
        .unwrap_or("body");

    PortalError::InvalidField {
        field,
        reason: "value doesn't satisfy field constraints",
    }
}

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: Validate,
    B: Send + 'static,
    S: Sync,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
{
    type Rejection = PortalError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value.validate().map_err(invalid_field)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::invalid_field;
    use crate::error::PortalError;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1))]
        name: String,

        #[validate(range(min = 1))]
        amount: u64,
    }

    #[test]
    fn first_invalid_field_is_reported() {
        let form = Form {
            name: String::new(),
            amount: 0,
        };

        match form.validate().map_err(invalid_field) {
            Err(PortalError::InvalidField { field, .. }) => assert_eq!(field, "amount"),
            _ => panic!("form must be invalid"),
        }
    }
}
