use crate::analyzer::base::{ForceAnalyzer, ForceTally};
use crate::candle::Candle;
use crate::config::PatternConfig;
use crate::error::IndicatorResult;
use crate::indicator::utils::{CandleParts, average_volume, clamp_multiplier};
use serde::Serialize;
use std::fmt::Display;

/// 캔들 패턴 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    /// 불리시 엔걸핑 - 상승 반전
    BullishEngulfing,
    /// 베어리시 엔걸핑 - 하락 반전
    BearishEngulfing,
    /// 망치/행잉맨 - 긴 아래꼬리
    HammerLike,
    /// 슈팅스타/역망치 - 긴 위꼬리
    ShootingStarLike,
    /// 드래곤플라이 도지 - 하단 반전 신호
    DragonflyDoji,
    /// 그레이브스톤 도지 - 상단 반전 신호
    GravestoneDoji,
    /// 도지 스타 - 이전 몸통 대비 작은 몸통
    DojiStar,
    /// 모멘텀 캔들 - 직전 세 몸통 합을 압도하는 몸통
    MomentumCandle,
}

impl CandlePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandlePattern::BullishEngulfing => "bullish_engulfing",
            CandlePattern::BearishEngulfing => "bearish_engulfing",
            CandlePattern::HammerLike => "hammer_like",
            CandlePattern::ShootingStarLike => "shooting_star_like",
            CandlePattern::DragonflyDoji => "dragonfly_doji",
            CandlePattern::GravestoneDoji => "gravestone_doji",
            CandlePattern::DojiStar => "doji_star",
            CandlePattern::MomentumCandle => "momentum_candle",
        }
    }
}

/// 감지된 캔들 패턴 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternEvent {
    #[serde(rename = "type")]
    pub pattern: CandlePattern,
    /// 윈도우 내 캔들 인덱스
    pub index: usize,
    /// 부호: 상승(+)/하락(-), 크기: 패턴 강도. [-25, 25]로 제한됨
    pub multiplicator: f64,
    /// 캔들 거래량 / 평균 거래량
    pub volume_strength: f64,
}

impl PatternEvent {
    pub fn is_bullish(&self) -> bool {
        self.multiplicator > 0.0
    }

    pub fn is_bearish(&self) -> bool {
        self.multiplicator < 0.0
    }
}

impl Display for PatternEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} (x{:.2}, vol {:.2})",
            self.pattern.as_str(),
            self.index,
            self.multiplicator,
            self.volume_strength
        )
    }
}

/// 캔들 방향 부호 (양봉 1, 그 외 -1)
///
/// 시가와 종가가 같은 보합 캔들은 하락으로 봅니다.
fn direction_sign<C: Candle>(candle: &C) -> f64 {
    if candle.is_bullish() { 1.0 } else { -1.0 }
}

/// 캔들 패턴 분석기
///
/// 이전/현재 캔들 쌍을 순서대로 훑으며, 캔들마다 우선순위상 처음 맞는 패턴 하나만 기록합니다.
#[derive(Debug, Clone)]
pub struct CandlePatternAnalyzer {
    /// 평균 거래량 계산 기간
    pub volume_period: usize,
    /// 이 값보다 거래량 강도가 낮은 캔들은 건너뜀
    pub min_volume_strength: f64,
    /// 점수 계산 시 거래량 강도 상한
    pub volume_cap: f64,
    /// 점수 계산용 후행 윈도우
    pub window: usize,
}

impl Default for CandlePatternAnalyzer {
    fn default() -> Self {
        Self::new(&PatternConfig::default(), 2.0, 14)
    }
}

impl CandlePatternAnalyzer {
    /// 새 캔들 패턴 분석기 생성
    ///
    /// # Arguments
    /// * `volume_cap` - 점수 계산 시 거래량 강도 상한
    pub fn new(config: &PatternConfig, volume_cap: f64, window: usize) -> CandlePatternAnalyzer {
        CandlePatternAnalyzer {
            volume_period: config.volume_period,
            min_volume_strength: config.min_volume_strength,
            volume_cap,
            window,
        }
    }

    /// 윈도우 전체에서 패턴 감지
    ///
    /// # Returns
    /// * `Vec<PatternEvent>` - 인덱스 순 패턴 이벤트
    pub fn analyze<C: Candle>(&self, data: &[C]) -> Vec<PatternEvent> {
        let avg_volume = average_volume(data, self.volume_period);
        let mut events = Vec::new();

        for i in 1..data.len() {
            let prev = CandleParts::of(&data[i - 1]);
            if prev.body == 0.0 {
                log::trace!("패턴 스킵 {i}: 이전 캔들 몸통 0");
                continue;
            }

            let volume_strength = if avg_volume > 0.0 {
                data[i].volume() / avg_volume
            } else {
                0.0
            };
            if volume_strength < self.min_volume_strength {
                continue;
            }

            if let Some((pattern, raw)) = self.classify(data, i, &prev) {
                let event = PatternEvent {
                    pattern,
                    index: i,
                    multiplicator: clamp_multiplier(raw),
                    volume_strength,
                };
                log::trace!("패턴 감지: {event}");
                events.push(event);
            }
        }

        log::debug!("캔들 패턴 분석 완료: {}개 캔들, {}개 이벤트", data.len(), events.len());
        events
    }

    /// 인덱스 `i` 캔들의 패턴 판정 (우선순위 순서, 처음 맞는 것만)
    fn classify<C: Candle>(
        &self,
        data: &[C],
        i: usize,
        prev: &CandleParts,
    ) -> Option<(CandlePattern, f64)> {
        let prev_candle = &data[i - 1];
        let candle = &data[i];
        let curr = CandleParts::of(candle);

        // 엔걸핑: 몸통 비율 2배 이상 + 방향 전환
        let ratio = curr.body / prev.body;
        if ratio >= 2.0 {
            if candle.is_bullish() && prev_candle.is_bearish() {
                return Some((CandlePattern::BullishEngulfing, ratio));
            }
            if candle.is_bearish() && prev_candle.is_bullish() {
                return Some((CandlePattern::BearishEngulfing, -ratio));
            }
        }

        if curr.body > 0.0 {
            // 드래곤플라이/그레이브스톤이 망치 계열 조건의 부분집합이라 먼저 확인
            if curr.lower_wick >= 3.0 * curr.body && curr.upper_wick <= curr.body * 0.2 {
                return Some((CandlePattern::DragonflyDoji, curr.lower_wick / curr.body));
            }
            if curr.upper_wick >= 3.0 * curr.body && curr.lower_wick <= curr.body * 0.2 {
                return Some((CandlePattern::GravestoneDoji, -curr.upper_wick / curr.body));
            }

            if curr.lower_wick >= 2.0 * curr.body && curr.upper_wick <= curr.body {
                return Some((CandlePattern::HammerLike, curr.lower_wick / curr.body));
            }
            if curr.upper_wick >= 2.0 * curr.body && curr.lower_wick <= curr.body {
                return Some((CandlePattern::ShootingStarLike, -curr.upper_wick / curr.body));
            }
        }

        if curr.body < prev.body * 0.3 && curr.wicks() > prev.body {
            let raw = direction_sign(candle) * curr.wicks() / prev.body;
            return Some((CandlePattern::DojiStar, raw));
        }

        if i >= 3 {
            let prev_body_sum: f64 = data[i - 3..i]
                .iter()
                .map(|c| CandleParts::of(c).body)
                .sum();
            if prev_body_sum > 0.0 && curr.body >= 2.0 * prev_body_sum {
                let raw = direction_sign(candle) * curr.body / prev_body_sum;
                return Some((CandlePattern::MomentumCandle, raw));
            }
        }

        None
    }

    /// 패턴 이벤트를 힘 합계로 변환
    ///
    /// 이벤트마다 `|배수| × min(거래량 강도, 상한)`을 부호 방향에 더합니다.
    pub fn score(&self, events: &[PatternEvent]) -> ForceTally {
        let mut tally = ForceTally::default();
        for event in events {
            let impact = event.multiplicator.abs() * event.volume_strength.min(self.volume_cap);
            if event.is_bullish() {
                tally.bullish_event(impact);
            } else if event.is_bearish() {
                tally.bearish_event(impact);
            }
        }
        tally
    }
}

impl<C: Candle> ForceAnalyzer<C> for CandlePatternAnalyzer {
    fn window(&self) -> usize {
        self.window
    }

    fn tally(&self, data: &[C]) -> IndicatorResult<ForceTally> {
        Ok(self.score(&self.analyze(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(multiplicator: f64, volume_strength: f64) -> PatternEvent {
        PatternEvent {
            pattern: CandlePattern::DojiStar,
            index: 1,
            multiplicator,
            volume_strength,
        }
    }

    #[test]
    fn test_flat_candle_counts_as_bearish() {
        let flat = crate::candle::OhlcvCandle::new(0, 104.0, 107.0, 102.0, 104.0, 1.0);
        assert_eq!(direction_sign(&flat), -1.0);
    }

    #[test]
    fn test_score_caps_volume_strength() {
        let analyzer = CandlePatternAnalyzer::default();
        let tally = analyzer.score(&[event(3.0, 5.0), event(-2.0, 1.5), event(0.0, 3.0)]);
        assert_eq!(tally.bullish, 6.0);
        assert_eq!(tally.bearish, 3.0);
        assert_eq!(tally.bullish_count, 1);
        assert_eq!(tally.bearish_count, 1);
    }
}
