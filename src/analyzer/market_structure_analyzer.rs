use crate::analyzer::base::{ForceAnalyzer, ForceTally};
use crate::candle::Candle;
use crate::config::{StructureConfig, StructureWeights};
use crate::error::IndicatorResult;
use crate::indicator::utils::{average_volume, clamp_multiplier};
use crate::model::Trend;
use serde::Serialize;
use std::fmt::Display;

/// 시장 구조 이벤트 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureEventType {
    /// 상승 추세 중 직전 고점 돌파 (추세 지속)
    BosBullish,
    /// 하락 추세 중 직전 저점 이탈 (추세 지속)
    BosBearish,
    /// 상승 추세가 아닌 상태에서 고점 돌파 (성격 변화)
    ChochBullish,
    /// 하락 추세가 아닌 상태에서 저점 이탈 (성격 변화)
    ChochBearish,
    /// 상승 FVG
    BullishFvg,
    /// 하락 FVG
    BearishFvg,
    HigherHigh,
    HigherLow,
    LowerHigh,
    LowerLow,
}

impl StructureEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureEventType::BosBullish => "bos_bullish",
            StructureEventType::BosBearish => "bos_bearish",
            StructureEventType::ChochBullish => "choch_bullish",
            StructureEventType::ChochBearish => "choch_bearish",
            StructureEventType::BullishFvg => "bullish_fvg",
            StructureEventType::BearishFvg => "bearish_fvg",
            StructureEventType::HigherHigh => "higher_high",
            StructureEventType::HigherLow => "higher_low",
            StructureEventType::LowerHigh => "lower_high",
            StructureEventType::LowerLow => "lower_low",
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            StructureEventType::BosBullish
                | StructureEventType::ChochBullish
                | StructureEventType::BullishFvg
                | StructureEventType::HigherHigh
                | StructureEventType::HigherLow
        )
    }

    pub fn is_bearish(&self) -> bool {
        !self.is_bullish()
    }

    /// 점수 계산에 반영되는 이벤트인지 (스윙 비교 이벤트는 정보용)
    pub fn is_scored(&self) -> bool {
        !matches!(
            self,
            StructureEventType::HigherHigh
                | StructureEventType::HigherLow
                | StructureEventType::LowerHigh
                | StructureEventType::LowerLow
        )
    }
}

/// 시장 구조 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructureEvent {
    #[serde(rename = "type")]
    pub event_type: StructureEventType,
    /// 윈도우 내 캔들 인덱스
    pub index: usize,
    /// 퍼센트 단위 크기 (0 이상, 최대 25)
    pub multiplicator: f64,
    pub volume_strength: f64,
}

impl Display for StructureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} (x{:.2}, vol {:.2})",
            self.event_type.as_str(),
            self.index,
            self.multiplicator,
            self.volume_strength
        )
    }
}

/// 스윙 고점/저점
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
}

/// 스윙 고점과 저점 찾기
///
/// 인덱스 `i`의 고가가 `[i-left, i+right]` 구간 최고가와 같으면 스윙 고점, 저점은 대칭입니다.
///
/// # Returns
/// * `(Vec<SwingPoint>, Vec<SwingPoint>)` - 인덱스 순 (고점, 저점)
pub fn find_swing_points<C: Candle>(
    data: &[C],
    left: usize,
    right: usize,
) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let mut highs = Vec::new();
    let mut lows = Vec::new();

    if data.len() < left + right + 1 {
        return (highs, lows);
    }

    for i in left..data.len() - right {
        let window = &data[i - left..=i + right];
        let high = data[i].high_price();
        let low = data[i].low_price();

        let window_high = window
            .iter()
            .map(|c| c.high_price())
            .fold(f64::NEG_INFINITY, f64::max);
        let window_low = window
            .iter()
            .map(|c| c.low_price())
            .fold(f64::INFINITY, f64::min);

        if high == window_high {
            highs.push(SwingPoint { index: i, price: high });
        }
        if low == window_low {
            lows.push(SwingPoint { index: i, price: low });
        }
    }

    (highs, lows)
}

/// 퍼센트 변화량 (기준이 0이면 0)
fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    clamp_multiplier((to - from).abs() / from.abs() * 100.0)
}

/// 구조 스캔 결과
#[derive(Debug, Clone, PartialEq)]
pub struct StructureScan {
    /// 시간순 이벤트
    pub events: Vec<StructureEvent>,
    /// 스캔 종료 시점 추세
    pub trend: Option<Trend>,
    /// 마지막으로 확정된 스윙 고점 가격
    pub last_high: Option<f64>,
    /// 마지막으로 확정된 스윙 저점 가격
    pub last_low: Option<f64>,
}

/// 시장 구조 분석기
#[derive(Debug, Clone)]
pub struct MarketStructureAnalyzer {
    pub swing_left: usize,
    pub swing_right: usize,
    pub volume_period: usize,
    /// BOS/CHOCH 판정에 필요한 최소 거래량 강도
    pub min_volume_strength: f64,
    /// FVG 최소 갭 비율(%)
    pub min_gap_percent: Option<f64>,
    pub weights: StructureWeights,
    /// 점수 계산용 후행 윈도우
    pub window: usize,
}

impl Default for MarketStructureAnalyzer {
    fn default() -> Self {
        Self::new(&StructureConfig::default(), &StructureWeights::default(), 28)
    }
}

impl MarketStructureAnalyzer {
    pub fn new(
        config: &StructureConfig,
        weights: &StructureWeights,
        window: usize,
    ) -> MarketStructureAnalyzer {
        MarketStructureAnalyzer {
            swing_left: config.swing_left,
            swing_right: config.swing_right,
            volume_period: config.volume_period,
            min_volume_strength: config.min_volume_strength,
            min_gap_percent: config.min_gap_percent,
            weights: *weights,
            window,
        }
    }

    /// 시간순 구조 이벤트 목록
    pub fn analyze<C: Candle>(&self, data: &[C]) -> Vec<StructureEvent> {
        self.scan(data).events
    }

    /// 윈도우를 한 번 훑어 구조 이벤트와 최종 상태 계산
    ///
    /// 스윙은 `swing_index + swing_right` 시점에 확정되며, 확정과 FVG 감지는 거래량 필터보다 먼저
    /// 처리됩니다. BOS/CHOCH만 거래량 강도가 `min_volume_strength` 이상인 캔들에서 판정합니다.
    pub fn scan<C: Candle>(&self, data: &[C]) -> StructureScan {
        let (swing_highs, swing_lows) =
            find_swing_points(data, self.swing_left, self.swing_right);
        let avg_volume = average_volume(data, self.volume_period);
        let volume_strength_at = |i: usize| {
            if avg_volume > 0.0 {
                data[i].volume() / avg_volume
            } else {
                1.0
            }
        };

        let mut events = Vec::new();
        let mut last_high: Option<f64> = None;
        let mut last_low: Option<f64> = None;
        let mut trend: Option<Trend> = None;
        let mut next_high = 0;
        let mut next_low = 0;

        for i in 0..data.len() {
            let volume_strength = volume_strength_at(i);

            while next_high < swing_highs.len()
                && swing_highs[next_high].index + self.swing_right <= i
            {
                let swing = swing_highs[next_high];
                if let Some(prev) = last_high {
                    let event_type = if swing.price > prev {
                        StructureEventType::HigherHigh
                    } else {
                        StructureEventType::LowerHigh
                    };
                    events.push(StructureEvent {
                        event_type,
                        index: i,
                        multiplicator: percent_change(prev, swing.price),
                        volume_strength,
                    });
                }
                last_high = Some(swing.price);
                next_high += 1;
            }

            while next_low < swing_lows.len() && swing_lows[next_low].index + self.swing_right <= i
            {
                let swing = swing_lows[next_low];
                if let Some(prev) = last_low {
                    let event_type = if swing.price > prev {
                        StructureEventType::HigherLow
                    } else {
                        StructureEventType::LowerLow
                    };
                    events.push(StructureEvent {
                        event_type,
                        index: i,
                        multiplicator: percent_change(prev, swing.price),
                        volume_strength,
                    });
                }
                last_low = Some(swing.price);
                next_low += 1;
            }

            if i >= 2 {
                if let Some(event) = self.detect_fvg(data, i, volume_strength_at(i - 1)) {
                    events.push(event);
                }
            }

            if volume_strength < self.min_volume_strength {
                continue;
            }

            let close = data[i].close_price();

            if trend.is_none() {
                if let (Some(high), Some(_)) = (last_high, last_low) {
                    let initial = if close > high { Trend::Up } else { Trend::Down };
                    log::trace!("구조 추세 초기화 {i}: {initial:?}");
                    trend = Some(initial);
                    continue;
                }
            }

            if let Some(high) = last_high.filter(|high| close > *high) {
                let event_type = if trend == Some(Trend::Up) {
                    StructureEventType::BosBullish
                } else {
                    StructureEventType::ChochBullish
                };
                events.push(StructureEvent {
                    event_type,
                    index: i,
                    multiplicator: percent_change(high, close),
                    volume_strength,
                });
                trend = Some(Trend::Up);
            }

            // 스윙 고점이 저점보다 낮으면 한 캔들이 양쪽을 모두 돌파할 수 있음
            if let Some(low) = last_low.filter(|low| close < *low) {
                let event_type = if trend == Some(Trend::Down) {
                    StructureEventType::BosBearish
                } else {
                    StructureEventType::ChochBearish
                };
                events.push(StructureEvent {
                    event_type,
                    index: i,
                    multiplicator: percent_change(low, close),
                    volume_strength,
                });
                trend = Some(Trend::Down);
            }
        }

        log::debug!(
            "시장 구조 분석 완료: {}개 캔들, {}개 이벤트, 추세 {:?}",
            data.len(),
            events.len(),
            trend
        );

        StructureScan {
            events,
            trend,
            last_high,
            last_low,
        }
    }

    /// `i-2`와 `i` 캔들 사이 갭 감지
    fn detect_fvg<C: Candle>(
        &self,
        data: &[C],
        i: usize,
        volume_strength: f64,
    ) -> Option<StructureEvent> {
        let first = &data[i - 2];
        let third = &data[i];

        let (event_type, reference, gap) = if third.low_price() > first.high_price() {
            (
                StructureEventType::BullishFvg,
                first.high_price(),
                third.low_price() - first.high_price(),
            )
        } else if third.high_price() < first.low_price() {
            (
                StructureEventType::BearishFvg,
                first.low_price(),
                first.low_price() - third.high_price(),
            )
        } else {
            return None;
        };

        let gap_percent = if reference == 0.0 {
            0.0
        } else {
            gap / reference.abs() * 100.0
        };
        if let Some(min_gap) = self.min_gap_percent {
            if gap_percent < min_gap {
                log::trace!("FVG 스킵 {i}: 갭 {gap_percent:.4}% < {min_gap}%");
                return None;
            }
        }

        Some(StructureEvent {
            event_type,
            index: i,
            multiplicator: clamp_multiplier(gap_percent),
            volume_strength,
        })
    }

    /// 구조 이벤트를 힘 합계로 변환
    ///
    /// CHOCH는 반대 방향 누적값에 `choch_opposite_decay`를 곱한 뒤 더해집니다.
    pub fn score(&self, events: &[StructureEvent]) -> ForceTally {
        let w = &self.weights;
        let mut tally = ForceTally::default();

        for event in events.iter().filter(|e| e.event_type.is_scored()) {
            let impact = event.multiplicator.abs() * event.volume_strength.min(w.volume_cap);
            match event.event_type {
                StructureEventType::BosBullish => tally.bullish_event(impact * w.bos),
                StructureEventType::BosBearish => tally.bearish_event(impact * w.bos),
                StructureEventType::ChochBullish => {
                    tally.bearish *= w.choch_opposite_decay;
                    tally.bullish_event(impact * w.choch);
                }
                StructureEventType::ChochBearish => {
                    tally.bullish *= w.choch_opposite_decay;
                    tally.bearish_event(impact * w.choch);
                }
                StructureEventType::BullishFvg => tally.bullish_event(impact * w.fvg),
                StructureEventType::BearishFvg => tally.bearish_event(impact * w.fvg),
                StructureEventType::HigherHigh
                | StructureEventType::HigherLow
                | StructureEventType::LowerHigh
                | StructureEventType::LowerLow => {}
            }
        }

        tally
    }
}

impl<C: Candle> ForceAnalyzer<C> for MarketStructureAnalyzer {
    fn window(&self) -> usize {
        self.window
    }

    fn tally(&self, data: &[C]) -> IndicatorResult<ForceTally> {
        Ok(self.score(&self.analyze(data)))
    }
}
