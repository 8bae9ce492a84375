use tabled::builder::Builder;
use tabled::settings::Style;

use crate::core::ResultSet;

pub const HEADERS: [&str; 3] = ["Slug", "Price", "Name"];

/// 缺失字段的单元格占位
pub const NULL_CELL: &str = "null";

fn cell(v: &Option<String>) -> String {
    v.as_deref().unwrap_or(NULL_CELL).to_string()
}

/// 表格 + 末尾行数。零行时仍输出表头和 `0`
pub fn render_table(rs: &ResultSet) -> String {
    let mut builder = Builder::new();
    builder.push_record(HEADERS.map(String::from));
    for row in rs.iter() {
        builder.push_record([row.slug.clone(), cell(&row.price), cell(&row.name)]);
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    format!("{table}\n{}", rs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResultRow;

    fn rs(rows: Vec<ResultRow>) -> ResultSet {
        ResultSet {
            rows,
            ..Default::default()
        }
    }

    #[test]
    fn empty_set_still_prints_headers_and_zero() {
        let out = render_table(&rs(Vec::new()));
        let header = out.lines().find(|l| l.contains("Slug")).unwrap();
        assert!(header.contains("Price") && header.contains("Name"));
        assert_eq!(out.lines().last(), Some("0"));
    }

    #[test]
    fn rows_keep_order_and_null_cells_render() {
        let out = render_table(&rs(vec![
            ResultRow::new("b", Some("20"), Some("Banana")),
            ResultRow::new("d", Some("25"), None),
        ]));
        let banana = out.find("Banana").unwrap();
        let d_row = out.lines().find(|l| l.contains(" d ")).unwrap();
        assert!(banana < out.find(" d ").unwrap());
        assert!(d_row.contains(NULL_CELL));
        assert_eq!(out.lines().last(), Some("2"));
    }
}
