use uuid::Uuid;

/// 单次查询独占的临时有序集合 key。
///
/// 每次调用生成新的 uuid 后缀，并发调用互不覆盖。
/// 释放由同一个 MULTI 里排在最后的 DEL 完成：事务只要到达服务端，
/// 无论 SORT 成功与否 DEL 都会执行。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopedTempKey {
    key: String,
}

impl ScopedTempKey {
    pub fn acquire(prefix: &str) -> Self {
        Self {
            key: format!("{}:{}", prefix, Uuid::new_v4().simple()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}
