pub mod memory;
pub mod redis;

use std::future::Future;

use crate::error::QueryError;
use crate::query::plan::RangeJoinPlan;

/// RangeJoinQuery 的执行后端抽象。
///
/// ## 契约
/// - `exec_plan` 必须把 `plan.commands` 作为一个原子批次执行（MULTI/EXEC 语义）：
///   外部观察者看不到临时集合的中间状态。
/// - 只返回 `plan.reply_index` 那条回复（扁平数组，nil 为 None）。
/// - 任何一条命令失败都让整体返回 Err；其余命令（包括最后的 DEL）仍照常执行。
pub trait RangeJoinStore: Send + Sync {
    fn exec_plan(
        &self,
        plan: &RangeJoinPlan,
    ) -> impl Future<Output = Result<Vec<Option<String>>, QueryError>> + Send;
}

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;
