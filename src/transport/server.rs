use crate::app::context::AppContext;
use crate::core::guard::{failure_response, panic_message};
use crate::core::request::{parse_query, GenericRequest, GenericResponse, MAX_BODY_BYTES};
use crate::core::router::Api;
use crate::utils::error::{AppError, Result};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use http::header::{HeaderName, ACCESS_CONTROL_ALLOW_HEADERS, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use http_body_util::LengthLimitError;
use std::any::Any;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

/// Any origin, the CRUD verbs plus preflight, and the headers browsers send.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::DELETE,
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::PATCH,
        ])
        .allow_headers([
            CONTENT_TYPE,
            ACCESS_CONTROL_ALLOW_HEADERS,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Every path goes to the facade; CORS answers preflights before that.
pub fn router(api: Api) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
}

async fn dispatch(State(api): State<Api>, request: Request) -> Response {
    let response = match into_generic_request(request).await {
        Ok(request) => api.handle(&request),
        Err(e) if is_length_limit(&e) => failure_response(&AppError::PayloadTooLarge {
            limit: MAX_BODY_BYTES,
        }),
        Err(e) => GenericResponse::error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            &format!("failed to read request body: {}", e),
        ),
    };
    into_response(response)
}

async fn into_generic_request(request: Request) -> std::result::Result<GenericRequest, axum::Error> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES).await?;
    let query = parts.uri.query().map(parse_query).unwrap_or_default();

    Ok(GenericRequest::new(
        parts.method,
        parts.uri.path(),
        parts.headers,
        query,
        body.to_vec(),
    ))
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

fn into_response(response: GenericResponse) -> Response {
    let (status, headers, body) = response.into_parts();
    let mut reply = Response::new(Body::from(body));
    *reply.status_mut() = status;
    *reply.headers_mut() = headers;
    reply
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let err = AppError::HandlerPanic {
        message: panic_message(payload.as_ref()),
    };
    into_response(failure_response(&err))
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::BindError { addr, source })
}

pub async fn serve(listener: TcpListener, api: Api) -> Result<()> {
    axum::serve(listener, router(api))
        .await
        .map_err(|e| AppError::RuntimeError {
            message: format!("http server error: {}", e),
        })
}

/// Binds `0.0.0.0:<port>` and serves until the process is stopped.
pub async fn run(context: AppContext) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], context.config().port));
    let listener = bind(addr).await?;
    log_server_info(&context);
    serve(listener, context.api()).await
}

fn log_server_info(context: &AppContext) {
    let config = context.config();
    let logger = context.logger();
    logger.info("Initializing server");
    logger.info(&format!("Environment: {}", config.environment_label()));
    logger.info(&format!("Storage: {}", context.store().describe()));
    logger.info(&format!("Server url: http://localhost:{}", config.port));
}
