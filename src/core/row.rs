use std::time::Duration;

use crate::error::QueryError;

/// SORT 每个 member 固定投影：`#`、price、name
pub const PROJECTION_WIDTH: usize = 3;

/// 一行结果。price/name 缺失时原样透传为 None（渲染成 null），行不丢弃
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRow {
    pub slug: String,
    pub price: Option<String>,
    pub name: Option<String>,
}

impl ResultRow {
    pub fn new(slug: impl Into<String>, price: Option<&str>, name: Option<&str>) -> Self {
        Self {
            slug: slug.into(),
            price: price.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    pub fn price_value(&self) -> Option<f64> {
        self.price.as_deref()?.trim().parse().ok()
    }
}

/// 有序结果集（顺序即 store 的 SORT 输出顺序）
#[derive(Clone, Debug, Default)]
pub struct ResultSet {
    pub rows: Vec<ResultRow>,
    /// 仅 store 往返耗时
    pub round_trip: Duration,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow> {
        self.rows.iter()
    }
}

/// 把扁平 SORT 回复按位置切成行。
///
/// 长度必须是 `PROJECTION_WIDTH` 的整数倍，且 `#` 投影不能为 nil；
/// 否则整体报错，不返回截断的行。
pub fn rows_from_flat(flat: Vec<Option<String>>) -> Result<Vec<ResultRow>, QueryError> {
    let len = flat.len();
    let malformed = || QueryError::MalformedReply {
        len,
        width: PROJECTION_WIDTH,
    };
    if len % PROJECTION_WIDTH != 0 {
        return Err(malformed());
    }

    let mut rows = Vec::with_capacity(len / PROJECTION_WIDTH);
    let mut it = flat.into_iter();
    while let (Some(slug), Some(price), Some(name)) = (it.next(), it.next(), it.next()) {
        let Some(slug) = slug else {
            return Err(malformed());
        };
        rows.push(ResultRow { slug, price, name });
    }
    Ok(rows)
}
