use std::fmt;

use crate::core::{ScopedTempKey, ScoreBound};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_arg(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// `<ns>:*->field`：`*` 替换为 member 后取 hash 字段
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPattern {
    pub key_pattern: String,
    pub field: String,
}

impl FieldPattern {
    pub fn new(namespace: &str, field: &str) -> Self {
        Self {
            key_pattern: format!("{}:*", namespace),
            field: field.to_string(),
        }
    }

    /// 与 Redis 一致：只替换第一个 `*`
    pub fn resolve_key(&self, member: &str) -> String {
        self.key_pattern.replacen('*', member, 1)
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.key_pattern, self.field)
    }
}

/// SORT 的 GET 投影
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Projection {
    /// `GET #`：member 本身
    Member,
    Field(FieldPattern),
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Member => f.write_str("#"),
            Projection::Field(p) => p.fmt(f),
        }
    }
}

/// ZREMRANGEBYSCORE 的一端
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeEdge {
    pub bound: ScoreBound,
    pub exclusive: bool,
}

impl RangeEdge {
    pub fn inclusive(bound: ScoreBound) -> Self {
        Self { bound, exclusive: false }
    }

    pub fn exclusive(bound: ScoreBound) -> Self {
        Self { bound, exclusive: true }
    }

    pub fn to_arg(self) -> String {
        if self.exclusive {
            self.bound.exclusive_arg()
        } else {
            self.bound.to_string()
        }
    }

    pub fn admits_as_min(self, score: f64) -> bool {
        if self.exclusive {
            score > self.bound.value()
        } else {
            score >= self.bound.value()
        }
    }

    pub fn admits_as_max(self, score: f64) -> bool {
        if self.exclusive {
            score < self.bound.value()
        } else {
            score <= self.bound.value()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreCommand {
    /// `ZUNIONSTORE dest 1 source`
    UnionStore { dest: String, source: String },
    RemoveRangeByScore {
        key: String,
        min: RangeEdge,
        max: RangeEdge,
    },
    Sort {
        key: String,
        by: FieldPattern,
        order: SortOrder,
        get: Vec<Projection>,
    },
    Delete { key: String },
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::UnionStore { .. } => "ZUNIONSTORE",
            StoreCommand::RemoveRangeByScore { .. } => "ZREMRANGEBYSCORE",
            StoreCommand::Sort { .. } => "SORT",
            StoreCommand::Delete { .. } => "DEL",
        }
    }

    pub fn args(&self) -> Vec<String> {
        match self {
            StoreCommand::UnionStore { dest, source } => {
                vec![dest.clone(), "1".to_string(), source.clone()]
            }
            StoreCommand::RemoveRangeByScore { key, min, max } => {
                vec![key.clone(), min.to_arg(), max.to_arg()]
            }
            StoreCommand::Sort { key, by, order, get } => {
                let mut args = vec![
                    key.clone(),
                    "BY".to_string(),
                    by.to_string(),
                    order.as_arg().to_string(),
                ];
                for p in get {
                    args.push("GET".to_string());
                    args.push(p.to_string());
                }
                args
            }
            StoreCommand::Delete { key } => vec![key.clone()],
        }
    }
}

impl fmt::Display for StoreCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        for a in self.args() {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}

/// 一次范围连接查询的完整事务：按顺序执行，整体原子
#[derive(Clone, Debug)]
pub struct RangeJoinPlan {
    pub temp: ScopedTempKey,
    pub commands: Vec<StoreCommand>,
    /// 需要返回给调用方的那条回复（SORT）
    pub reply_index: usize,
}

impl RangeJoinPlan {
    pub fn build(
        index_key: &str,
        namespace: &str,
        temp: ScopedTempKey,
        lower: ScoreBound,
        upper: ScoreBound,
        order: SortOrder,
    ) -> Self {
        let t = temp.as_str().to_string();
        let price = FieldPattern::new(namespace, "price");
        let name = FieldPattern::new(namespace, "name");

        let commands = vec![
            StoreCommand::UnionStore {
                dest: t.clone(),
                source: index_key.to_string(),
            },
            // 两次删除都对保留侧排他：恰好等于边界的分数保留
            StoreCommand::RemoveRangeByScore {
                key: t.clone(),
                min: RangeEdge::inclusive(ScoreBound::NegInfinity),
                max: RangeEdge::exclusive(lower),
            },
            StoreCommand::RemoveRangeByScore {
                key: t.clone(),
                min: RangeEdge::exclusive(upper),
                max: RangeEdge::inclusive(ScoreBound::PosInfinity),
            },
            StoreCommand::Sort {
                key: t.clone(),
                by: price.clone(),
                order,
                get: vec![
                    Projection::Member,
                    Projection::Field(price),
                    Projection::Field(name),
                ],
            },
            StoreCommand::Delete { key: t },
        ];

        Self {
            temp,
            commands,
            reply_index: 3,
        }
    }
}
