//! Request extractors that reject with `AppError`.
//!
//! axum's own `Query`, `Json` and `Path` answer malformed input with a
//! plain-text 400/415/422. These wrappers run the same extraction and turn
//! the rejection into a 400 `invalid_request` JSON body.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Query string deserialized into `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// JSON request body deserialized into `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters deserialized into `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::campaign::{CampaignListQuery, CreateCampaignRequest};
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        routing::{get, post},
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> Router {
        Router::new()
            .route(
                "/campaigns",
                get(|ApiQuery(query): ApiQuery<CampaignListQuery>| async move {
                    format!("{:?}", query.status)
                })
                .post(|ApiJson(request): ApiJson<CreateCampaignRequest>| async move {
                    request.name
                }),
            )
            .route(
                "/campaigns/{id}",
                get(|ApiPath(id): ApiPath<Uuid>| async move { id.to_string() }),
            )
            .route("/echo", post(|ApiJson(value): ApiJson<Value>| async move { value.to_string() }))
    }

    async fn error_body(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_enum_in_query_is_invalid_request() {
        let request = Request::get("/campaigns?status=BOGUS")
            .body(Body::empty())
            .unwrap();

        let (status, body) = error_body(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
        assert!(body["error"]["message"].as_str().unwrap().contains("BOGUS"));
    }

    #[tokio::test]
    async fn non_numeric_page_is_invalid_request() {
        let request = Request::get("/campaigns?page=two").body(Body::empty()).unwrap();

        let (status, body) = error_body(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn malformed_json_body_is_invalid_request() {
        let request = Request::post("/campaigns")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();

        let (status, body) = error_body(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn wrongly_typed_json_field_is_invalid_request() {
        let request = Request::post("/campaigns")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "Open day", "budgetCents": "lots"}"#))
            .unwrap();

        let (status, body) = error_body(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn missing_content_type_is_invalid_request() {
        let request = Request::post("/echo").body(Body::from("{}")).unwrap();

        let (status, body) = error_body(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn malformed_path_uuid_is_invalid_request() {
        let request = Request::get("/campaigns/not-a-uuid").body(Body::empty()).unwrap();

        let (status, body) = error_body(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn well_formed_input_reaches_the_handler() {
        let response = app()
            .oneshot(
                Request::get("/campaigns?status=ACTIVE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Some(Active)");
    }
}
