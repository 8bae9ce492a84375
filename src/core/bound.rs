use std::fmt;
use std::str::FromStr;

/// 分数边界：有限值或 ±inf 哨兵
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreBound {
    NegInfinity,
    /// 不得为 NaN；从 f64 构造请走 `TryFrom`
    Finite(f64),
    PosInfinity,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BoundParseError {
    #[error("empty score bound")]
    Empty,
    #[error("score bound is not a number: {0:?}")]
    NotANumber(String),
}

impl ScoreBound {
    pub fn value(self) -> f64 {
        match self {
            ScoreBound::NegInfinity => f64::NEG_INFINITY,
            ScoreBound::Finite(v) => v,
            ScoreBound::PosInfinity => f64::INFINITY,
        }
    }

    /// 闭区间判断（两端都包含）
    pub fn contains(lower: ScoreBound, upper: ScoreBound, score: f64) -> bool {
        lower.value() <= score && score <= upper.value()
    }

    /// Redis 排他写法：`(15`、`(-inf`
    pub fn exclusive_arg(self) -> String {
        format!("({}", self)
    }
}

impl TryFrom<f64> for ScoreBound {
    type Error = BoundParseError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        if v.is_nan() {
            Err(BoundParseError::NotANumber(v.to_string()))
        } else if v == f64::NEG_INFINITY {
            Ok(ScoreBound::NegInfinity)
        } else if v == f64::INFINITY {
            Ok(ScoreBound::PosInfinity)
        } else {
            Ok(ScoreBound::Finite(v))
        }
    }
}

impl FromStr for ScoreBound {
    type Err = BoundParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BoundParseError::Empty);
        }
        match s.to_ascii_lowercase().as_str() {
            "-inf" | "-infinity" => return Ok(ScoreBound::NegInfinity),
            "inf" | "+inf" | "infinity" | "+infinity" => return Ok(ScoreBound::PosInfinity),
            _ => {}
        }
        match s.parse::<f64>() {
            Ok(v) if !v.is_nan() => ScoreBound::try_from(v),
            _ => Err(BoundParseError::NotANumber(s.to_string())),
        }
    }
}

impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBound::NegInfinity => f.write_str("-inf"),
            ScoreBound::Finite(v) => write!(f, "{}", v),
            ScoreBound::PosInfinity => f.write_str("+inf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_sentinels() {
        assert_eq!("15".parse::<ScoreBound>().unwrap(), ScoreBound::Finite(15.0));
        assert_eq!(" 9.99 ".parse::<ScoreBound>().unwrap(), ScoreBound::Finite(9.99));
        assert_eq!("-inf".parse::<ScoreBound>().unwrap(), ScoreBound::NegInfinity);
        assert_eq!("+inf".parse::<ScoreBound>().unwrap(), ScoreBound::PosInfinity);
        assert_eq!("Infinity".parse::<ScoreBound>().unwrap(), ScoreBound::PosInfinity);
    }

    #[test]
    fn rejects_nan_and_garbage() {
        assert_eq!("".parse::<ScoreBound>(), Err(BoundParseError::Empty));
        assert!(matches!("NaN".parse::<ScoreBound>(), Err(BoundParseError::NotANumber(_))));
        assert!(matches!("ten".parse::<ScoreBound>(), Err(BoundParseError::NotANumber(_))));
    }

    #[test]
    fn try_from_f64_rejects_nan_and_maps_infinities() {
        assert!(matches!(
            ScoreBound::try_from(f64::NAN),
            Err(BoundParseError::NotANumber(_))
        ));
        assert_eq!(ScoreBound::try_from(f64::INFINITY), Ok(ScoreBound::PosInfinity));
        assert_eq!(ScoreBound::try_from(f64::NEG_INFINITY), Ok(ScoreBound::NegInfinity));
        assert_eq!(ScoreBound::try_from(2.5), Ok(ScoreBound::Finite(2.5)));
    }

    #[test]
    fn exclusive_args_match_redis_syntax() {
        assert_eq!(ScoreBound::Finite(15.0).exclusive_arg(), "(15");
        assert_eq!(ScoreBound::Finite(0.5).exclusive_arg(), "(0.5");
        assert_eq!(ScoreBound::NegInfinity.exclusive_arg(), "(-inf");
        assert_eq!(ScoreBound::PosInfinity.exclusive_arg(), "(+inf");
    }

    #[test]
    fn contains_is_closed_on_both_ends() {
        let lo = ScoreBound::Finite(10.0);
        let hi = ScoreBound::Finite(20.0);
        assert!(ScoreBound::contains(lo, hi, 10.0));
        assert!(ScoreBound::contains(lo, hi, 20.0));
        assert!(!ScoreBound::contains(lo, hi, 20.0001));
        assert!(ScoreBound::contains(ScoreBound::NegInfinity, hi, f64::NEG_INFINITY));
    }
}
