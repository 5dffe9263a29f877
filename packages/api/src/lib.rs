// Restake-LP Cloudflare Worker API
//
// Stateless HTTP front for the task performer. Operators and agents submit
// restake / liquidity / rebalance / withdraw tasks as JSON; the worker checks
// the payload and returns the acknowledgment. It never holds ledger state.
//
// ── 1. Run locally ────────────────────────────────────────────────────────────
//   wrangler dev
//   # Starts at http://localhost:8787
//
// ── 2. Deploy ─────────────────────────────────────────────────────────────────
//   wrangler deploy
//   # After the first deploy set API_URL in wrangler.toml [vars] so GET /
//   # echoes the live URL.
//
// ── 3. Try it ─────────────────────────────────────────────────────────────────
//   export BASE=http://localhost:8787
//
//   curl "$BASE/"
//   curl "$BASE/health"
//
//   # Check a payload without executing it
//   curl -X POST "$BASE/validate" \
//        -H 'Content-Type: application/json' \
//        -d '{"task_id":"t1","payload":{"type":"restake","restake":{"protocol":"eigenlayer","amount":"1000","token":"stETH"}}}'
//
//   # Validate and acknowledge
//   curl -X POST "$BASE/task" \
//        -H 'Content-Type: application/json' \
//        -d '{"task_id":"t2","payload":{"type":"rebalance"}}'

use restake_lp_performer::{TaskPerformer, TaskRequest};
use worker::*;

const VERSION: &str = "0.1.0";

// ── Entry point ───────────────────────────────────────────────────────────────

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    // Log every incoming request
    console_log!(
        "{} {} (cf-ray: {})",
        req.method().to_string(),
        req.path(),
        req.headers()
            .get("cf-ray")
            .unwrap_or_default()
            .unwrap_or_default(),
    );

    Router::new()
        .get("/", handle_root)
        .get("/health", handle_health)
        .post_async("/validate",      handle_validate)
        .post_async("/task",          handle_task)
        .or_else_any_method("/*path", handle_not_found)
        .run(req, env)
        .await
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /  →  service welcome with endpoint catalogue
fn handle_root(_req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let url = ctx.env.var("API_URL")
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "https://restake-lp-api.<your-account>.workers.dev".to_string());

    json_ok(&serde_json::json!({
        "service":  "restake-lp-api",
        "version":  VERSION,
        "url":      url,
        "tasks":    ["restake", "liquidity", "rebalance", "withdraw"],
        "endpoints": {
            "GET  /":          "this response",
            "GET  /health":    "liveness check",
            "POST /validate":  "check a task payload  {task_id, payload}",
            "POST /task":      "validate and acknowledge a task  {task_id, payload}",
        },
    }))
}

/// GET /health  →  liveness payload
fn handle_health(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    json_ok(&serde_json::json!({
        "status":  "ok",
        "service": "restake-lp-api",
        "version": VERSION,
    }))
}

/// POST /validate  →  {valid, task_id, type} or 422 with the rejection reason
async fn handle_validate(mut req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    let request: TaskRequest = match req.json().await {
        Ok(r) => r,
        Err(_) => return json_error(400, r#"required fields: "task_id", "payload""#),
    };

    match TaskPerformer::new().validate(&request) {
        Ok(task) => json_ok(&serde_json::json!({
            "valid":   true,
            "task_id": request.task_id,
            "type":    task.kind(),
        })),
        Err(e) => {
            console_log!("task {} rejected: {}", request.task_id, e);
            json_error(422, &e.to_string())
        }
    }
}

/// POST /task  →  {task_id, result}
async fn handle_task(mut req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    let request: TaskRequest = match req.json().await {
        Ok(r) => r,
        Err(_) => return json_error(400, r#"required fields: "task_id", "payload""#),
    };

    // Date::now() is milliseconds since the epoch
    let timestamp = (Date::now().as_millis() / 1_000) as i64;

    match TaskPerformer::new().handle(&request, timestamp) {
        Ok(response) => json_ok(&serde_json::to_value(&response)?),
        Err(e) => {
            console_log!("task {} failed: {}", request.task_id, e);
            json_error(422, &e.to_string())
        }
    }
}

fn handle_not_found(req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    console_log!("404 {}", req.path());
    json_error(404, &format!("route not found: {}", req.path()))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Return a 200 JSON response.
fn json_ok(body: &serde_json::Value) -> Result<Response> {
    let mut res = Response::from_json(body)?;
    res.headers_mut()
        .set("Content-Type", "application/json")?;
    Ok(res)
}

/// Return an error JSON response with the given HTTP status.
fn json_error(status: u16, message: &str) -> Result<Response> {
    let body = serde_json::json!({ "error": message });
    let res = Response::from_json(&body)?
        .with_status(status);
    Ok(res)
}
