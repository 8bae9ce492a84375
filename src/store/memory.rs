use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::QueryError;
use crate::query::plan::{FieldPattern, Projection, RangeEdge, RangeJoinPlan, SortOrder, StoreCommand};
use crate::store::RangeJoinStore;

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Clone, Debug)]
enum Value {
    SortedSet(HashMap<String, f64>),
    Hash(HashMap<String, String>),
}

/// 单条命令的回复
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Integer(i64),
    Array(Vec<Option<String>>),
}

/// 进程内存储：有序集合 + hash，命令语义对齐 Redis。
///
/// 一个计划在同一把锁内顺序执行，等价于 MULTI/EXEC：
/// 中间状态对其他调用方不可见，某条命令出错不会中断后续命令。
#[derive(Default)]
pub struct MemoryStore {
    keys: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ZADD key score member
    pub fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), QueryError> {
        let mut keys = self.keys.lock();
        let entry = keys
            .entry(key.to_string())
            .or_insert_with(|| Value::SortedSet(HashMap::new()));
        match entry {
            Value::SortedSet(set) => {
                set.insert(member.to_string(), score);
                Ok(())
            }
            Value::Hash(_) => Err(QueryError::Command(WRONGTYPE.to_string())),
        }
    }

    /// HSET key field value
    pub fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), QueryError> {
        let mut keys = self.keys.lock();
        let entry = keys
            .entry(key.to_string())
            .or_insert_with(|| Value::Hash(HashMap::new()));
        match entry {
            Value::Hash(h) => {
                h.insert(field.to_string(), value.to_string());
                Ok(())
            }
            Value::SortedSet(_) => Err(QueryError::Command(WRONGTYPE.to_string())),
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.keys.lock().contains_key(key)
    }

    pub fn key_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keys.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// 原子执行一批命令，返回每条的回复；任一条失败则整体 Err（其余命令已执行）
    pub fn run(&self, commands: &[StoreCommand]) -> Result<Vec<Reply>, QueryError> {
        let mut keys = self.keys.lock();
        let mut replies = Vec::with_capacity(commands.len());
        let mut first_err = None;
        for command in commands {
            match apply(&mut keys, command) {
                Ok(r) => replies.push(r),
                Err(e) => {
                    tracing::debug!("memory store: {} failed: {}", command.name(), e);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(replies),
        }
    }
}

impl RangeJoinStore for MemoryStore {
    async fn exec_plan(&self, plan: &RangeJoinPlan) -> Result<Vec<Option<String>>, QueryError> {
        let mut replies = self.run(&plan.commands)?;
        if plan.reply_index >= replies.len() {
            return Err(QueryError::Command("reply index out of range".to_string()));
        }
        match replies.swap_remove(plan.reply_index) {
            Reply::Array(flat) => Ok(flat),
            Reply::Integer(_) => Err(QueryError::Command(
                "expected an array reply from SORT".to_string(),
            )),
        }
    }
}

fn apply(keys: &mut HashMap<String, Value>, command: &StoreCommand) -> Result<Reply, QueryError> {
    match command {
        StoreCommand::UnionStore { dest, source } => union_store(keys, dest, source),
        StoreCommand::RemoveRangeByScore { key, min, max } => remove_range(keys, key, *min, *max),
        StoreCommand::Sort { key, by, order, get } => sort(keys, key, by, *order, get),
        StoreCommand::Delete { key } => Ok(Reply::Integer(keys.remove(key).map_or(0, |_| 1))),
    }
}

fn sorted_set<'a>(
    keys: &'a HashMap<String, Value>,
    key: &str,
) -> Result<Option<&'a HashMap<String, f64>>, QueryError> {
    match keys.get(key) {
        None => Ok(None),
        Some(Value::SortedSet(set)) => Ok(Some(set)),
        Some(Value::Hash(_)) => Err(QueryError::Command(WRONGTYPE.to_string())),
    }
}

fn union_store(
    keys: &mut HashMap<String, Value>,
    dest: &str,
    source: &str,
) -> Result<Reply, QueryError> {
    let copy = sorted_set(keys, source)?.cloned().unwrap_or_default();
    let card = copy.len() as i64;
    // 结果为空时 Redis 删除 dest
    if copy.is_empty() {
        keys.remove(dest);
    } else {
        keys.insert(dest.to_string(), Value::SortedSet(copy));
    }
    Ok(Reply::Integer(card))
}

fn remove_range(
    keys: &mut HashMap<String, Value>,
    key: &str,
    min: RangeEdge,
    max: RangeEdge,
) -> Result<Reply, QueryError> {
    let set = match keys.get_mut(key) {
        None => return Ok(Reply::Integer(0)),
        Some(Value::SortedSet(set)) => set,
        Some(Value::Hash(_)) => return Err(QueryError::Command(WRONGTYPE.to_string())),
    };
    let before = set.len();
    set.retain(|_, score| !(min.admits_as_min(*score) && max.admits_as_max(*score)));
    let removed = (before - set.len()) as i64;
    if set.is_empty() {
        keys.remove(key);
    }
    Ok(Reply::Integer(removed))
}

fn hash_field(keys: &HashMap<String, Value>, pattern: &FieldPattern, member: &str) -> Option<String> {
    match keys.get(&pattern.resolve_key(member)) {
        Some(Value::Hash(h)) => h.get(&pattern.field).cloned(),
        _ => None,
    }
}

/// 与 Redis 的 strtod 校验一致：允许前导空白，尾随字符与 NaN 都算失败
fn parse_sort_score(raw: &str) -> Result<f64, QueryError> {
    match raw.trim_start().parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(QueryError::Command(
            "One or more scores can't be converted into double".to_string(),
        )),
    }
}

fn sort(
    keys: &HashMap<String, Value>,
    key: &str,
    by: &FieldPattern,
    order: SortOrder,
    get: &[Projection],
) -> Result<Reply, QueryError> {
    let Some(set) = sorted_set(keys, key)? else {
        return Ok(Reply::Array(Vec::new()));
    };

    let mut scored = Vec::with_capacity(set.len());
    for member in set.keys() {
        // 外部 key 缺失按 0 排序；存在但不是数字则整条 SORT 失败
        let score = match hash_field(keys, by, member) {
            None => 0.0,
            Some(raw) => parse_sort_score(&raw)?,
        };
        scored.push((score, member.as_str()));
    }

    // 排序键相同则按 member 字节序，保证结果确定
    scored.sort_by(|a, b| {
        a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1))
    });
    if order == SortOrder::Desc {
        scored.reverse();
    }

    let mut flat = Vec::with_capacity(scored.len() * get.len());
    for (_, member) in scored {
        for p in get {
            flat.push(match p {
                Projection::Member => Some(member.to_string()),
                Projection::Field(pattern) => hash_field(keys, pattern, member),
            });
        }
    }
    Ok(Reply::Array(flat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScoreBound;

    fn store() -> MemoryStore {
        let s = MemoryStore::new();
        for (slug, price) in [("a", 10.0), ("b", 20.0), ("c", 30.0)] {
            s.zadd("idx", slug, price).unwrap();
            s.hset(&format!("items:{slug}"), "price", &price.to_string()).unwrap();
        }
        s
    }

    #[test]
    fn union_store_copies_and_empty_source_removes_dest() {
        let s = store();
        let r = s
            .run(&[StoreCommand::UnionStore {
                dest: "tmp".into(),
                source: "idx".into(),
            }])
            .unwrap();
        assert_eq!(r, vec![Reply::Integer(3)]);
        assert!(s.exists("tmp"));

        s.run(&[StoreCommand::UnionStore {
            dest: "tmp".into(),
            source: "missing".into(),
        }])
        .unwrap();
        assert!(!s.exists("tmp"));
    }

    #[test]
    fn remove_range_honours_exclusive_edges() {
        let s = store();
        let r = s
            .run(&[StoreCommand::RemoveRangeByScore {
                key: "idx".into(),
                min: RangeEdge::inclusive(ScoreBound::NegInfinity),
                max: RangeEdge::exclusive(ScoreBound::Finite(20.0)),
            }])
            .unwrap();
        assert_eq!(r, vec![Reply::Integer(1)]);

        let r = s
            .run(&[StoreCommand::RemoveRangeByScore {
                key: "idx".into(),
                min: RangeEdge::inclusive(ScoreBound::Finite(20.0)),
                max: RangeEdge::inclusive(ScoreBound::Finite(20.0)),
            }])
            .unwrap();
        assert_eq!(r, vec![Reply::Integer(1)]);
        assert!(s.exists("idx"));
    }

    #[test]
    fn sort_ties_break_on_member_and_missing_by_sorts_as_zero() {
        let s = store();
        s.zadd("idx", "aa", 10.0).unwrap();
        s.hset("items:aa", "price", "10").unwrap();
        s.zadd("idx", "z", 99.0).unwrap();

        let r = s
            .run(&[StoreCommand::Sort {
                key: "idx".into(),
                by: FieldPattern::new("items", "price"),
                order: SortOrder::Asc,
                get: vec![Projection::Member],
            }])
            .unwrap();
        let members: Vec<String> = match &r[0] {
            Reply::Array(v) => v.iter().flatten().cloned().collect(),
            other => panic!("unexpected reply {:?}", other),
        };
        assert_eq!(members, vec!["z", "a", "aa", "b", "c"]);
    }

    fn sort_members(s: &MemoryStore) -> Result<Vec<Reply>, QueryError> {
        s.run(&[StoreCommand::Sort {
            key: "idx".into(),
            by: FieldPattern::new("items", "price"),
            order: SortOrder::Asc,
            get: vec![Projection::Member],
        }])
    }

    #[test]
    fn sort_rejects_nan_and_trailing_garbage_in_by_values() {
        let s = store();
        s.hset("items:a", "price", "nan").unwrap();
        assert!(matches!(sort_members(&s), Err(QueryError::Command(_))));

        let s = store();
        s.hset("items:b", "price", "10 ").unwrap();
        assert!(matches!(sort_members(&s), Err(QueryError::Command(_))));
    }

    #[test]
    fn sort_accepts_leading_whitespace_and_infinities() {
        let s = store();
        s.hset("items:c", "price", "  5").unwrap();
        s.hset("items:b", "price", "-inf").unwrap();
        let r = sort_members(&s).unwrap();
        assert_eq!(
            r,
            vec![Reply::Array(vec![
                Some("b".to_string()),
                Some("c".to_string()),
                Some("a".to_string()),
            ])]
        );
    }

    #[test]
    fn command_error_still_runs_remaining_commands() {
        let s = store();
        s.hset("items:b", "price", "twenty").unwrap();
        s.zadd("tmp", "x", 1.0).unwrap();

        let err = s
            .run(&[
                StoreCommand::Sort {
                    key: "idx".into(),
                    by: FieldPattern::new("items", "price"),
                    order: SortOrder::Asc,
                    get: vec![Projection::Member],
                },
                StoreCommand::Delete { key: "tmp".into() },
            ])
            .unwrap_err();
        assert!(matches!(err, QueryError::Command(_)));
        assert!(!s.exists("tmp"));
    }

    #[test]
    fn wrong_type_is_reported() {
        let s = store();
        assert!(s.zadd("items:a", "x", 1.0).is_err());
        assert!(s.hset("idx", "f", "v").is_err());
    }
}
