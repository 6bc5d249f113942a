use serde::Serialize;
use std::fmt::Display;

/// 시장 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketDirection {
    /// 상승
    Bullish,
    /// 하락
    Bearish,
    /// 중립
    #[default]
    Neutral,
}

impl MarketDirection {
    /// 부호로부터 방향 결정 (0이면 중립)
    pub fn from_sign(value: f64) -> MarketDirection {
        if value > 0.0 {
            MarketDirection::Bullish
        } else if value < 0.0 {
            MarketDirection::Bearish
        } else {
            MarketDirection::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketDirection::Bullish => "bullish",
            MarketDirection::Bearish => "bearish",
            MarketDirection::Neutral => "neutral",
        }
    }
}

impl Display for MarketDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 구조 스캔 중의 추세 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// 최종 시장 신호
///
/// 요청마다 다시 계산되며 저장되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalResult {
    /// 신뢰도 (0-100)
    pub confidence: f64,
    /// 강도 (0-100)
    pub strength: f64,
    /// 전환선/기준선 기반 실제 움직임
    pub actual_movement: MarketDirection,
    /// 모든 소스를 합친 최종 방향
    pub direction: MarketDirection,
}

impl SignalResult {
    pub fn is_bullish(&self) -> bool {
        self.direction == MarketDirection::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.direction == MarketDirection::Bearish
    }

    /// (confidence, strength, actual_movement, direction) 튜플
    pub fn as_tuple(&self) -> (f64, f64, MarketDirection, MarketDirection) {
        (
            self.confidence,
            self.strength,
            self.actual_movement,
            self.direction,
        )
    }
}

impl Display for SignalResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "신호(신뢰도: {:.2}, 강도: {:.2}, 움직임: {}, 방향: {})",
            self.confidence, self.strength, self.actual_movement, self.direction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_sign() {
        assert_eq!(MarketDirection::from_sign(0.1), MarketDirection::Bullish);
        assert_eq!(MarketDirection::from_sign(-0.1), MarketDirection::Bearish);
        assert_eq!(MarketDirection::from_sign(0.0), MarketDirection::Neutral);
    }

    #[test]
    fn test_signal_result_serialize() {
        let result = SignalResult {
            confidence: 50.0,
            strength: 12.5,
            actual_movement: MarketDirection::Neutral,
            direction: MarketDirection::Bullish,
        };
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["direction"], "bullish");
        assert_eq!(json["actual_movement"], "neutral");
    }
}
