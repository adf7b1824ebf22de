//! Access log for the job API.
//!
//! Each request produces a `Request received` event and a `Request finished`
//! event on the `api` target. The finish event is logged at `warn` for 4xx and
//! `error` for 5xx responses. Both events carry the caller from `X-User-Id`,
//! since every job route is scoped to it.

use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::config::USER_ID_HEADER;

/// Wraps an app so every request is access-logged.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// Request fields repeated on the finish event.
struct RequestSummary {
    method: String,
    path: String,
    caller: String,
    received: Instant,
}

impl RequestSummary {
    fn from_request(req: &ServiceRequest) -> Self {
        let caller = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            caller,
            received: Instant::now(),
        }
    }

    fn finished(&self, status: StatusCode) {
        let elapsed_ms = self.received.elapsed().as_millis();
        let status = status.as_u16();

        match status {
            500.. => error!(
                target: "api",
                method = %self.method,
                path = %self.path,
                caller = %self.caller,
                status,
                duration_ms = %elapsed_ms,
                "Request finished"
            ),
            400..=499 => warn!(
                target: "api",
                method = %self.method,
                path = %self.path,
                caller = %self.caller,
                status,
                duration_ms = %elapsed_ms,
                "Request finished"
            ),
            _ => info!(
                target: "api",
                method = %self.method,
                path = %self.path,
                caller = %self.caller,
                status,
                duration_ms = %elapsed_ms,
                "Request finished"
            ),
        }
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let summary = RequestSummary::from_request(&req);

        info!(
            target: "api",
            method = %summary.method,
            path = %summary.path,
            query = %req.query_string(),
            peer = %req.connection_info().realip_remote_addr().unwrap_or("-"),
            caller = %summary.caller,
            "Request received"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            summary.finished(res.status());
            Ok(res)
        })
    }
}
