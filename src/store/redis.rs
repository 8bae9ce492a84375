use redis::aio::MultiplexedConnection;
use redis::{ConnectionInfo, Pipeline, Value};

use crate::error::QueryError;
use crate::query::plan::RangeJoinPlan;
use crate::store::RangeJoinStore;

/// 真实 Redis 后端：整个计划作为一个 MULTI/EXEC 管道发出
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(info: ConnectionInfo) -> Result<Self, QueryError> {
        let client = redis::Client::open(info)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("connected to redis");
        Ok(Self { conn })
    }
}

/// 非 SORT 的回复全部 ignore，EXEC 之后只剩一条
pub fn to_pipeline(plan: &RangeJoinPlan) -> Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();
    for (i, command) in plan.commands.iter().enumerate() {
        let mut cmd = redis::cmd(command.name());
        for arg in command.args() {
            cmd.arg(arg);
        }
        pipe.add_command(cmd);
        if i != plan.reply_index {
            pipe.ignore();
        }
    }
    pipe
}

/// EXEC 回复（ignore 之后只剩 SORT 一条）→ 扁平投影，nil 保留为 None
pub fn decode_exec_reply(reply: Value) -> Result<Vec<Option<String>>, QueryError> {
    let (flat,): (Vec<Option<String>>,) = redis::from_owned_redis_value(reply)?;
    Ok(flat)
}

impl RangeJoinStore for RedisStore {
    async fn exec_plan(&self, plan: &RangeJoinPlan) -> Result<Vec<Option<String>>, QueryError> {
        let pipe = to_pipeline(plan);
        let mut conn = self.conn.clone();
        let reply: Value = pipe.query_async(&mut conn).await?;
        decode_exec_reply(reply)
    }
}
