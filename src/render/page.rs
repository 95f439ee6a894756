//! Rendering pages and redirecting.

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::Response,
};

use super::{Page, RenderData};
use crate::http::context::RequestContext;
use crate::http::response::{internal_error, TEXT_HTML_UTF_8};

impl Page {
    /// Render this page with `status`.
    ///
    /// Consumes the request's inbound flash cookie and hands its messages to
    /// `data`. On template failure the client gets a generic 500 and the
    /// rendered buffer is dropped. Write failures on the connection happen after
    /// the handler returns and are reported by hyper, not here.
    pub fn render<D: RenderData>(
        &self,
        ctx: &mut RequestContext,
        status: StatusCode,
        mut data: D,
    ) -> Response {
        let mut headers = HeaderMap::new();
        let flashes = ctx.with_flash(|flash| {
            flash.check_and_consume(&mut headers);
            flash.take_messages()
        });
        data.set_flashes(flashes);

        let body = match self.execute(&data) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    template = %self.name(),
                    code = status.as_u16(),
                    "Failed to execute template"
                );
                return internal_error(headers);
            }
        };

        headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_HTML_UTF_8));

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().extend(headers);
        response
    }
}

/// Redirect to `url` with `code`, carrying queued flash messages to the next request.
///
/// This is the only place a flash cookie is written.
pub fn redirect(ctx: &mut RequestContext, url: &str, code: StatusCode) -> Response {
    let mut headers = HeaderMap::new();
    let flashes = ctx.take_pending_flashes();
    ctx.with_flash(|flash| flash.set_if_needed(&mut headers, true, &flashes));

    let location = match HeaderValue::from_str(url) {
        Ok(location) => location,
        Err(e) => {
            tracing::error!(error = %e, url = %url, "Invalid redirect target");
            return internal_error(headers);
        }
    };
    headers.insert(LOCATION, location);

    let mut response = Response::new(Body::empty());
    *response.status_mut() = code;
    response.headers_mut().extend(headers);
    response
}
