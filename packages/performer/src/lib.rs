//! Restake-LP task performer
//!
//! Operators run this next to the ledger to accept `restake`, `liquidity`,
//! `rebalance` and `withdraw` tasks. It checks that a payload carries the
//! fields its type needs and acknowledges it; it holds no ledger state and a
//! rejected task never touches one.
//!
//! ```rust
//! use restake_lp_performer::{RestakeParams, TaskPayload, TaskPerformer, TaskRequest};
//!
//! let payload = TaskPayload {
//!     task_type: "restake".into(),
//!     restake: RestakeParams {
//!         protocol: "eigenlayer".into(),
//!         amount: "1000".into(),
//!         token: "stETH".into(),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! let request = TaskRequest::new("task-1", &payload).unwrap();
//! let response = TaskPerformer::new().handle(&request, 1_700_000_000).unwrap();
//! assert_eq!(response.result["status"], "completed");
//! ```

pub mod error;
pub mod task;

pub use error::{Error, Result};
pub use task::{LiquidityParams, RestakeParams, Task, TaskPayload, TaskRequest, TaskResponse};

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

/// Default TCP port operators expose the performer on.
pub const DEFAULT_PORT: u16 = 8080;

/// Per-request deadline, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskPerformer;

impl TaskPerformer {
    pub fn new() -> Self {
        Self
    }

    /// Decode the payload and check the fields its type requires.
    pub fn validate(&self, request: &TaskRequest) -> Result<Task> {
        info!(task_id = %request.task_id, "validating task");
        let task = TaskPayload::deserialize(&request.payload)
            .map_err(Error::from)
            .and_then(Task::try_from)
            .map_err(|err| {
                warn!(task_id = %request.task_id, %err, "task rejected");
                err
            })?;
        Ok(task)
    }

    /// Validate, then acknowledge with the echoed parameters and `timestamp`.
    pub fn handle(&self, request: &TaskRequest, timestamp: i64) -> Result<TaskResponse> {
        let task = self.validate(request)?;

        let result = match &task {
            Task::Restake(p) => {
                info!(protocol = %p.protocol, amount = %p.amount, token = %p.token, "executing restake task");
                json!({
                    "status": "completed",
                    "protocol": p.protocol,
                    "amount": p.amount,
                    "token": p.token,
                    "timestamp": timestamp,
                })
            }
            Task::Liquidity(p) => {
                info!(
                    protocol = %p.protocol,
                    token_a = %p.token_a,
                    token_b = %p.token_b,
                    amount_a = %p.amount_a,
                    amount_b = %p.amount_b,
                    "executing liquidity task"
                );
                json!({
                    "status": "completed",
                    "protocol": p.protocol,
                    "token_a": p.token_a,
                    "token_b": p.token_b,
                    "amount_a": p.amount_a,
                    "amount_b": p.amount_b,
                    "timestamp": timestamp,
                })
            }
            Task::Rebalance | Task::Withdraw => {
                info!(action = task.kind(), "executing task");
                json!({
                    "status": "completed",
                    "action": task.kind(),
                    "timestamp": timestamp,
                })
            }
        };

        info!(task_id = %request.task_id, kind = task.kind(), "task completed");
        Ok(TaskResponse { task_id: request.task_id.clone(), result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restake_payload(protocol: &str) -> TaskPayload {
        TaskPayload {
            task_type: "restake".into(),
            restake: RestakeParams {
                protocol: protocol.into(),
                amount: "1000000000000000000".into(),
                token: "0x0000000000000000000000000000000000000000".into(),
                strategy: "compound".into(),
                min_yield: "500".into(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn valid_restake_task() {
        let performer = TaskPerformer::new();
        let request = TaskRequest::new("test-restake-task", &restake_payload("ethereum")).unwrap();

        let task = performer.validate(&request).unwrap();
        assert_eq!(task.kind(), "restake");

        let response = performer.handle(&request, 1_700_000_000).unwrap();
        assert_eq!(response.task_id, "test-restake-task");
        assert_eq!(
            response.result,
            json!({
                "status": "completed",
                "protocol": "ethereum",
                "amount": "1000000000000000000",
                "token": "0x0000000000000000000000000000000000000000",
                "timestamp": 1_700_000_000,
            })
        );
    }

    #[test]
    fn valid_liquidity_task() {
        let payload = TaskPayload {
            task_type: "liquidity".into(),
            liquidity: LiquidityParams {
                protocol: "uniswap-v3".into(),
                token_a: "0xA0b86a33E6441b8c4C8C0e4B8b8c4C8C0e4B8b8c4".into(),
                token_b: "0xB0b86a33E6441b8c4C8C0e4B8b8c4C8C0e4B8b8c4".into(),
                amount_a: "1000000000000000000".into(),
                amount_b: "2000000000000000000".into(),
                min_liquidity: "1000000000000000000".into(),
            },
            ..Default::default()
        };
        let request = TaskRequest::new("test-liquidity-task", &payload).unwrap();

        let response = TaskPerformer::new().handle(&request, 42).unwrap();
        assert_eq!(response.result["status"], "completed");
        assert_eq!(response.result["protocol"], "uniswap-v3");
        assert_eq!(response.result["amount_b"], "2000000000000000000");
        assert_eq!(response.result["timestamp"], 42);
        assert!(response.result.get("min_liquidity").is_none());
    }

    #[test]
    fn restake_task_without_protocol_is_rejected() {
        let request = TaskRequest::new("test-invalid-task", &restake_payload("")).unwrap();
        let err = TaskPerformer::new().validate(&request).unwrap_err();
        assert!(matches!(err, Error::RestakeProtocolRequired));
        assert_eq!(err.to_string(), "protocol is required for restake task");
    }

    #[test]
    fn restake_fields_are_checked_in_order() {
        let mut payload = restake_payload("ethereum");
        payload.restake.amount.clear();
        payload.restake.token.clear();
        let request = TaskRequest::new("t", &payload).unwrap();
        assert!(matches!(TaskPerformer::new().validate(&request), Err(Error::RestakeAmountRequired)));

        payload.restake.amount = "1".into();
        let request = TaskRequest::new("t", &payload).unwrap();
        assert!(matches!(TaskPerformer::new().validate(&request), Err(Error::RestakeTokenRequired)));
    }

    #[test]
    fn liquidity_task_needs_both_tokens_and_amounts() {
        let performer = TaskPerformer::new();
        let request = |payload: serde_json::Value| TaskRequest { task_id: "t".into(), payload };

        let err = performer
            .validate(&request(json!({ "type": "liquidity", "liquidity": { "token_a": "A" } })))
            .unwrap_err();
        assert_eq!(err.to_string(), "protocol is required for liquidity task");

        let err = performer
            .validate(&request(json!({
                "type": "liquidity",
                "liquidity": { "protocol": "p", "token_a": "A", "amount_a": "1", "amount_b": "2" }
            })))
            .unwrap_err();
        assert_eq!(err.to_string(), "both tokens are required for liquidity task");

        let err = performer
            .validate(&request(json!({
                "type": "liquidity",
                "liquidity": { "protocol": "p", "token_a": "A", "token_b": "B", "amount_a": "1" }
            })))
            .unwrap_err();
        assert_eq!(err.to_string(), "both amounts are required for liquidity task");
    }

    #[test]
    fn rebalance_and_withdraw_need_no_parameters() {
        let performer = TaskPerformer::new();
        for kind in ["rebalance", "withdraw"] {
            let request = TaskRequest { task_id: "t".into(), payload: json!({ "type": kind }) };
            let response = performer.handle(&request, 7).unwrap();
            assert_eq!(
                response.result,
                json!({ "status": "completed", "action": kind, "timestamp": 7 })
            );
        }
    }

    #[test]
    fn unknown_type_and_malformed_payloads() {
        let performer = TaskPerformer::new();

        let request = TaskRequest { task_id: "t".into(), payload: json!({ "type": "bridge" }) };
        let err = performer.validate(&request).unwrap_err();
        assert_eq!(err.to_string(), "unknown task type: bridge");

        let request = TaskRequest { task_id: "t".into(), payload: json!("not an object") };
        assert!(matches!(performer.validate(&request), Err(Error::InvalidPayload(_))));

        let request = TaskRequest { task_id: "t".into(), payload: json!({ "type": 5 }) };
        assert!(matches!(performer.handle(&request, 0), Err(Error::InvalidPayload(_))));
    }
}
