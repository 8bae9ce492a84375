use std::fmt;
use std::time::Duration;

/// `--perf` 计时报告
#[derive(Clone, Debug, Default)]
pub struct PerfReport {
    /// 发出查询到行整形完成（不含渲染）
    pub total: Duration,
    /// 仅 store 往返
    pub store_round_trip: Duration,
}

fn human_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros >= 1_000_000 {
        format!("{:.3}s", d.as_secs_f64())
    } else if micros >= 1_000 {
        format!("{:.3}ms", micros as f64 / 1_000.0)
    } else {
        format!("{}µs", micros)
    }
}

impl fmt::Display for PerfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "justRedisTime: {}", human_duration(self.store_round_trip))?;
        write!(f, "totalExecutionTime: {}", human_duration(self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_duration_picks_unit() {
        assert_eq!(human_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(human_duration(Duration::from_micros(1_500)), "1.500ms");
        assert_eq!(human_duration(Duration::from_millis(2_250)), "2.250s");
    }

    #[test]
    fn report_lists_both_timers() {
        let r = PerfReport {
            total: Duration::from_millis(3),
            store_round_trip: Duration::from_millis(2),
        };
        let out = r.to_string();
        assert!(out.contains("justRedisTime: 2.000ms"));
        assert!(out.contains("totalExecutionTime: 3.000ms"));
    }
}
