//! Task payloads and their typed form.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters of a `restake` task. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestakeParams {
    pub protocol: String,
    pub amount: String,
    pub token: String,
    pub strategy: String,
    pub min_yield: String,
}

/// Parameters of a `liquidity` task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityParams {
    pub protocol: String,
    pub token_a: String,
    pub token_b: String,
    pub amount_a: String,
    pub amount_b: String,
    pub min_liquidity: String,
}

/// Raw payload as it arrives. `type` is kept as a string so an unknown type
/// can be reported by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(default)]
    pub restake: RestakeParams,
    #[serde(default)]
    pub liquidity: LiquidityParams,
}

/// A validated task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Restake(RestakeParams),
    Liquidity(LiquidityParams),
    Rebalance,
    Withdraw,
}

impl Task {
    pub fn kind(&self) -> &'static str {
        match self {
            Task::Restake(_) => "restake",
            Task::Liquidity(_) => "liquidity",
            Task::Rebalance => "rebalance",
            Task::Withdraw => "withdraw",
        }
    }
}

impl TryFrom<TaskPayload> for Task {
    type Error = Error;

    fn try_from(payload: TaskPayload) -> Result<Self> {
        match payload.task_type.as_str() {
            "restake" => {
                let p = payload.restake;
                if p.protocol.is_empty() {
                    return Err(Error::RestakeProtocolRequired);
                }
                if p.amount.is_empty() {
                    return Err(Error::RestakeAmountRequired);
                }
                if p.token.is_empty() {
                    return Err(Error::RestakeTokenRequired);
                }
                Ok(Task::Restake(p))
            }
            "liquidity" => {
                let p = payload.liquidity;
                if p.protocol.is_empty() {
                    return Err(Error::LiquidityProtocolRequired);
                }
                if p.token_a.is_empty() || p.token_b.is_empty() {
                    return Err(Error::LiquidityTokensRequired);
                }
                if p.amount_a.is_empty() || p.amount_b.is_empty() {
                    return Err(Error::LiquidityAmountsRequired);
                }
                Ok(Task::Liquidity(p))
            }
            "rebalance" => Ok(Task::Rebalance),
            "withdraw" => Ok(Task::Withdraw),
            other => Err(Error::UnknownTaskType(other.to_string())),
        }
    }
}

/// One unit of work: an opaque id plus its JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task_id: String,
    pub payload: serde_json::Value,
}

impl TaskRequest {
    pub fn new(task_id: impl Into<String>, payload: &TaskPayload) -> Result<Self> {
        Ok(Self { task_id: task_id.into(), payload: serde_json::to_value(payload)? })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub result: serde_json::Value,
}
