use std::time::{Duration, Instant};

use crate::core::{rows_from_flat, ResultSet, ScopedTempKey, ScoreBound};
use crate::error::QueryError;
use crate::query::plan::{RangeJoinPlan, SortOrder};
use crate::store::RangeJoinStore;

/// 价格区间查询 + hash 连接。
///
/// 对 `index_key` 做自并集复制到临时集合，裁到 `[lower, upper]`，
/// 按 `<namespace>:*->price` 排序并投影 `#`/price/name，最后删除临时集合。
/// 五步在一个事务里完成。
#[derive(Clone, Debug)]
pub struct RangeJoinQuery {
    pub index_key: String,
    pub namespace: String,
    pub temp_prefix: String,
    pub order: SortOrder,
}

impl RangeJoinQuery {
    pub fn new(
        index_key: impl Into<String>,
        namespace: impl Into<String>,
        temp_prefix: impl Into<String>,
    ) -> Self {
        Self {
            index_key: index_key.into(),
            namespace: namespace.into(),
            temp_prefix: temp_prefix.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn plan(&self, lower: ScoreBound, upper: ScoreBound) -> RangeJoinPlan {
        RangeJoinPlan::build(
            &self.index_key,
            &self.namespace,
            ScopedTempKey::acquire(&self.temp_prefix),
            lower,
            upper,
            self.order,
        )
    }

    /// lower > upper 不做校验，结果为空
    pub async fn execute<S: RangeJoinStore>(
        &self,
        store: &S,
        lower: ScoreBound,
        upper: ScoreBound,
    ) -> Result<ResultSet, QueryError> {
        self.execute_with_deadline(store, lower, upper, None).await
    }

    /// 超时整体失败，不返回部分行。
    /// 事务一旦到达服务端，排在最后的 DEL 照常执行。
    pub async fn execute_with_deadline<S: RangeJoinStore>(
        &self,
        store: &S,
        lower: ScoreBound,
        upper: ScoreBound,
        deadline: Option<Duration>,
    ) -> Result<ResultSet, QueryError> {
        let plan = self.plan(lower, upper);
        tracing::debug!(temp = plan.temp.as_str(), "range join [{}, {}]", lower, upper);
        for command in &plan.commands {
            tracing::trace!("queued: {}", command);
        }

        let started = Instant::now();
        let flat = match deadline {
            Some(limit) => tokio::time::timeout(limit, store.exec_plan(&plan))
                .await
                .map_err(|_| QueryError::Timeout(limit))??,
            None => store.exec_plan(&plan).await?,
        };
        let round_trip = started.elapsed();

        let rows = rows_from_flat(flat)?;
        tracing::info!(
            "range join [{}, {}] matched {} item(s) in {:?}",
            lower,
            upper,
            rows.len(),
            round_trip
        );
        Ok(ResultSet { rows, round_trip })
    }
}
