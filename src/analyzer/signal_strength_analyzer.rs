use crate::analyzer::base::{ForceAnalyzer, ForceTally};
use crate::analyzer::candle_pattern_analyzer::CandlePatternAnalyzer;
use crate::analyzer::indicator_analyzer::{IndicatorAnalyzer, IndicatorScore};
use crate::analyzer::market_structure_analyzer::MarketStructureAnalyzer;
use crate::candle::{Candle, CandleSeries};
use crate::config::SignalConfig;
use crate::error::IndicatorResult;
use crate::indicator::utils::scale_0_100;
use crate::model::{MarketDirection, SignalResult};
use std::fmt::Display;

/// 소스별 점수와 최종 결과
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBreakdown {
    pub indicator: IndicatorScore,
    pub pattern: ForceTally,
    pub structure: ForceTally,
    pub result: SignalResult,
}

impl Display for SignalBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.indicator)?;
        writeln!(f, "패턴: {}", self.pattern)?;
        writeln!(f, "구조: {}", self.structure)?;
        write!(f, "{}", self.result)
    }
}

/// 지표, 캔들 패턴, 시장 구조 점수를 하나의 신호로 합치는 분석기
///
/// 상태를 갖지 않으므로 같은 분석기를 여러 스레드에서 동시에 써도 됩니다.
#[derive(Debug)]
pub struct SignalStrengthAnalyzer<C: Candle> {
    indicator: IndicatorAnalyzer<C>,
    pattern: CandlePatternAnalyzer,
    structure: MarketStructureAnalyzer,
}

impl<C: Candle> SignalStrengthAnalyzer<C> {
    /// 설정으로부터 분석기 생성
    pub fn from_config(config: &SignalConfig) -> IndicatorResult<SignalStrengthAnalyzer<C>> {
        Ok(SignalStrengthAnalyzer {
            indicator: IndicatorAnalyzer::from_config(
                &config.indicator,
                config.atr_multiplier,
                config.windows.indicator,
            )?,
            pattern: CandlePatternAnalyzer::new(
                &config.pattern,
                config.weights.volume_cap,
                config.windows.pattern,
            ),
            structure: MarketStructureAnalyzer::new(
                &config.structure,
                &config.weights,
                config.windows.structure,
            ),
        })
    }

    pub fn indicator(&self) -> &IndicatorAnalyzer<C> {
        &self.indicator
    }

    pub fn pattern(&self) -> &CandlePatternAnalyzer {
        &self.pattern
    }

    pub fn structure(&self) -> &MarketStructureAnalyzer {
        &self.structure
    }

    /// 최종 신호 계산
    ///
    /// # Returns
    /// * `IndicatorResult<SignalResult>` - 지표 윈도우가 부족하면 `InsufficientData`
    pub fn analyze(&self, series: &CandleSeries<C>) -> IndicatorResult<SignalResult> {
        Ok(self.analyze_detailed(series)?.result)
    }

    /// 소스별 점수를 포함한 신호 계산
    ///
    /// 각 분석기는 시리즈의 마지막 `window`개 캔들만 사용합니다.
    pub fn analyze_detailed(&self, series: &CandleSeries<C>) -> IndicatorResult<SignalBreakdown> {
        let data = series.items();

        let indicator = self.indicator.score(series.tail(self.indicator.window))?;
        let pattern = self.pattern.tally_tail(data)?;
        let structure = self.structure.tally_tail(data)?;

        let result = fuse(&indicator.tally, indicator.movement, &pattern, &structure);
        log::debug!("신호 계산 완료: {result} (패턴 {pattern}, 구조 {structure})");

        Ok(SignalBreakdown {
            indicator,
            pattern,
            structure,
            result,
        })
    }
}

/// 세 소스의 힘 합계를 최종 신호로 결합
///
/// 방향은 (상승 합계 - 하락 합계)의 부호로 정하고, 신뢰도는 우세한 쪽의 패턴/구조 이벤트 수
/// 비율입니다. 신뢰도가 0이면 방향은 중립이 됩니다.
pub fn fuse(
    indicator: &ForceTally,
    actual_movement: MarketDirection,
    pattern: &ForceTally,
    structure: &ForceTally,
) -> SignalResult {
    let total = *indicator + *pattern + *structure;
    let raw_strength = total.net();

    let confidence_count = if raw_strength > 0.0 {
        pattern.bullish_count + structure.bullish_count
    } else if raw_strength < 0.0 {
        pattern.bearish_count + structure.bearish_count
    } else {
        0
    };
    let total_count = total.bullish_count + total.bearish_count;

    let strength = scale_0_100(raw_strength, total.bullish + total.bearish);
    let confidence = scale_0_100(confidence_count as f64, total_count as f64);

    let direction = if confidence == 0.0 {
        MarketDirection::Neutral
    } else {
        MarketDirection::from_sign(raw_strength)
    };

    SignalResult {
        confidence,
        strength,
        actual_movement,
        direction,
    }
}
