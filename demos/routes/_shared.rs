//! Helpers shared by the demo controllers. The leading underscore keeps this
//! file out of the route table.

use routewright::{HandlerError, RequestContext};

/// Parse the `:id` path parameter.
pub fn id_param(req: &RequestContext) -> Result<u64, HandlerError> {
    let raw = req
        .param("id")
        .ok_or_else(|| HandlerError::bad_request("Missing id"))?;
    raw.parse()
        .map_err(|_| HandlerError::bad_request(format!("Invalid id `{raw}`")).with_code(1001))
}

/// Page size from `?limit=`, capped at 100.
pub fn limit(req: &RequestContext) -> usize {
    req.query("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20)
        .min(100)
}
