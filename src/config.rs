use crate::candle::CandleInterval;
use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::macd::{MACDParams, PriceMode};
use crate::indicator::rsi::RsiMode;
use serde::{Deserialize, Serialize};

/// 각 점수 계산에 쓰이는 후행 윈도우 길이
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// 지표 점수 윈도우
    pub indicator: usize,
    /// 캔들 패턴 점수 윈도우
    pub pattern: usize,
    /// 시장 구조 점수 윈도우
    pub structure: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            indicator: 42,
            pattern: 14,
            structure: 28,
        }
    }
}

/// 지표 기간 및 모드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    /// "close-close" | "open-close"
    pub rsi_mode: String,
    pub conversion_period: usize,
    pub base_period: usize,
    pub atr_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// "close" | "hl2" | "ohlc4"
    pub macd_price_mode: String,
    /// 히스토그램 크기를 가중치로 바꿀 때 나누는 값
    pub histogram_scale: f64,
    /// 히스토그램 가중치 상한
    pub histogram_cap: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            rsi_period: 14,
            rsi_mode: RsiMode::CloseClose.as_str().to_string(),
            conversion_period: 9,
            base_period: 26,
            atr_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            macd_price_mode: PriceMode::Close.as_str().to_string(),
            histogram_scale: 50.0,
            histogram_cap: 2.0,
        }
    }
}

impl IndicatorConfig {
    pub fn macd_params(&self) -> MACDParams {
        MACDParams {
            fast_period: self.macd_fast,
            slow_period: self.macd_slow,
            signal_period: self.macd_signal,
        }
    }

    /// 모든 지표 계산에 필요한 최소 캔들 수
    pub fn required_len(&self) -> usize {
        [
            self.rsi_period + 1,
            self.base_period,
            self.atr_period + 1,
            self.macd_params().required_len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// 캔들 패턴 감지 임계값
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub volume_period: usize,
    pub min_volume_strength: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            volume_period: 20,
            min_volume_strength: 1.2,
        }
    }
}

/// 시장 구조 감지 임계값
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub swing_left: usize,
    pub swing_right: usize,
    pub volume_period: usize,
    pub min_volume_strength: f64,
    /// FVG 최소 갭 비율(%). `None`이면 모든 갭을 이벤트로 냅니다.
    pub min_gap_percent: Option<f64>,
}

impl Default for StructureConfig {
    fn default() -> Self {
        StructureConfig {
            swing_left: 2,
            swing_right: 2,
            volume_period: 20,
            min_volume_strength: 1.1,
            min_gap_percent: None,
        }
    }
}

/// 구조 이벤트 가중치
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureWeights {
    pub bos: f64,
    pub choch: f64,
    /// CHOCH 발생 시 반대 방향 누적값에 곱하는 값
    pub choch_opposite_decay: f64,
    pub fvg: f64,
    /// 거래량 강도 상한
    pub volume_cap: f64,
}

impl Default for StructureWeights {
    fn default() -> Self {
        StructureWeights {
            bos: 1.5,
            choch: 2.0,
            choch_opposite_decay: 0.5,
            fvg: 0.7,
            volume_cap: 2.0,
        }
    }
}

/// 시장 신호 계산 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// 거래소 캔들 간격 토큰 (예: "1h")
    pub timeframe: String,
    /// ATR을 전환선/기준선 버퍼로 바꾸는 배수
    pub atr_multiplier: f64,
    pub windows: WindowConfig,
    pub indicator: IndicatorConfig,
    pub pattern: PatternConfig,
    pub structure: StructureConfig,
    pub weights: StructureWeights,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            timeframe: "1h".to_string(),
            atr_multiplier: 1.0,
            windows: WindowConfig::default(),
            indicator: IndicatorConfig::default(),
            pattern: PatternConfig::default(),
            structure: StructureConfig::default(),
            weights: StructureWeights::default(),
        }
    }
}

impl SignalConfig {
    pub fn interval(&self) -> ConfigResult<CandleInterval> {
        self.timeframe
            .parse::<CandleInterval>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// 세 윈도우 중 가장 긴 것 (데이터 수집 계층이 가져와야 할 캔들 수)
    pub fn required_candles(&self) -> usize {
        self.windows
            .indicator
            .max(self.windows.pattern)
            .max(self.windows.structure)
    }
}

fn ensure_positive(name: &str, value: usize) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{name}은(는) 0보다 커야 합니다"
        )));
    }
    Ok(())
}

fn ensure_non_negative(name: &str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{name}은(는) 0 이상이어야 합니다: {value}"
        )));
    }
    Ok(())
}

impl ConfigValidation for SignalConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.interval()?;
        ensure_non_negative("atr_multiplier", self.atr_multiplier)?;

        let ind = &self.indicator;
        ensure_positive("rsi_period", ind.rsi_period)?;
        ensure_positive("conversion_period", ind.conversion_period)?;
        ensure_positive("base_period", ind.base_period)?;
        ensure_positive("atr_period", ind.atr_period)?;
        ind.macd_params()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        ind.rsi_mode
            .parse::<RsiMode>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        ind.macd_price_mode
            .parse::<PriceMode>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        if ind.histogram_scale.is_nan() || ind.histogram_scale <= 0.0 {
            return Err(ConfigError::ValidationError(
                "histogram_scale은(는) 0보다 커야 합니다".to_string(),
            ));
        }
        ensure_non_negative("histogram_cap", ind.histogram_cap)?;

        ensure_positive("pattern.volume_period", self.pattern.volume_period)?;
        ensure_non_negative(
            "pattern.min_volume_strength",
            self.pattern.min_volume_strength,
        )?;

        ensure_positive("structure.swing_left", self.structure.swing_left)?;
        ensure_positive("structure.swing_right", self.structure.swing_right)?;
        ensure_positive("structure.volume_period", self.structure.volume_period)?;
        ensure_non_negative(
            "structure.min_volume_strength",
            self.structure.min_volume_strength,
        )?;
        if let Some(gap) = self.structure.min_gap_percent {
            ensure_non_negative("structure.min_gap_percent", gap)?;
        }

        let w = &self.weights;
        ensure_non_negative("weights.bos", w.bos)?;
        ensure_non_negative("weights.choch", w.choch)?;
        ensure_non_negative("weights.choch_opposite_decay", w.choch_opposite_decay)?;
        ensure_non_negative("weights.fvg", w.fvg)?;
        ensure_non_negative("weights.volume_cap", w.volume_cap)?;

        ensure_positive("windows.pattern", self.windows.pattern)?;
        ensure_positive("windows.structure", self.windows.structure)?;
        if self.windows.indicator < ind.required_len() {
            return Err(ConfigError::ValidationError(format!(
                "지표 윈도우({})가 지표 최소 길이({})보다 짧습니다",
                self.windows.indicator,
                ind.required_len()
            )));
        }

        Ok(())
    }
}
