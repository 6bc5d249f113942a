use crate::candle::Candle;

/// 이벤트 배수의 하한/상한
pub const MULTIPLIER_LIMIT: f64 = 25.0;

/// 공통 이동평균 계산 함수들
pub mod moving_average {
    /// 단순이동평균(SMA) 계산
    ///
    /// # Arguments
    /// * `values` - 가격 데이터 배열
    /// * `period` - 계산 기간
    ///
    /// # Returns
    /// * `f64` - 마지막 `period`개 값의 평균 (데이터가 부족하면 가용 데이터 평균, 비어 있으면 0.0)
    pub fn calculate_sma(values: &[f64], period: usize) -> f64 {
        if values.is_empty() || period == 0 {
            return 0.0;
        }

        let start_idx = values.len().saturating_sub(period);
        let slice = &values[start_idx..];
        slice.iter().sum::<f64>() / slice.len() as f64
    }

    /// 지수이동평균(EMA) 계산을 위한 알파값 계산
    pub fn calculate_ema_alpha(period: usize) -> f64 {
        2.0 / (period + 1) as f64
    }

    /// 지수이동평균(EMA) 한 스텝 계산
    pub fn calculate_ema_step(current_price: f64, previous_ema: f64, alpha: f64) -> f64 {
        alpha * current_price + (1.0 - alpha) * previous_ema
    }

    /// 첫 샘플로 시드한 EMA 시리즈
    ///
    /// 기간 평균으로 시드하지 않고 첫 값을 그대로 초기값으로 사용합니다.
    pub fn calculate_ema_series(values: &[f64], period: usize) -> Vec<f64> {
        let alpha = calculate_ema_alpha(period);
        let mut series = Vec::with_capacity(values.len());
        let mut iter = values.iter();
        if let Some(&first) = iter.next() {
            series.push(first);
            let mut prev = first;
            for &value in iter {
                prev = calculate_ema_step(value, prev, alpha);
                series.push(prev);
            }
        }
        series
    }
}

/// 캔들 몸통/꼬리 길이
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleParts {
    pub body: f64,
    pub upper_wick: f64,
    pub lower_wick: f64,
}

impl CandleParts {
    pub fn of<C: Candle>(candle: &C) -> CandleParts {
        let open = candle.open_price();
        let close = candle.close_price();
        CandleParts {
            body: (close - open).abs(),
            upper_wick: candle.high_price() - open.max(close),
            lower_wick: open.min(close) - candle.low_price(),
        }
    }

    /// 위/아래 꼬리 합
    pub fn wicks(&self) -> f64 {
        self.upper_wick + self.lower_wick
    }
}

/// 최근 `period`개 캔들의 평균 거래량
pub fn average_volume<C: Candle>(data: &[C], period: usize) -> f64 {
    let volumes = data.iter().map(|c| c.volume()).collect::<Vec<_>>();
    moving_average::calculate_sma(&volumes, period)
}

/// 배수를 [-25, 25] 범위로 제한
pub fn clamp_multiplier(value: f64) -> f64 {
    value.clamp(-MULTIPLIER_LIMIT, MULTIPLIER_LIMIT)
}

/// 소수점 둘째 자리 반올림
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 값을 `max` 대비 0-100 점수로 변환
///
/// `max`가 0 이하이거나 유한하지 않으면 0을 반환합니다.
pub fn scale_0_100(value: f64, max: f64) -> f64 {
    if max.is_nan() || max <= 0.0 || max.is_infinite() {
        return 0.0;
    }
    round2((value.abs() / max).min(1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_sma() {
        assert_eq!(moving_average::calculate_sma(&[1.0, 2.0, 3.0, 4.0], 2), 3.5);
        assert_eq!(moving_average::calculate_sma(&[1.0, 2.0], 5), 1.5);
        assert_eq!(moving_average::calculate_sma(&[], 5), 0.0);
    }

    #[test]
    fn test_ema_series_seeded_with_first_sample() {
        let series = moving_average::calculate_ema_series(&[10.0, 13.0, 13.0], 2);
        // alpha = 2/3
        assert_eq!(series[0], 10.0);
        assert!((series[1] - 12.0).abs() < 1e-12);
        assert!((series[2] - 12.666_666_666_666_666).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_multiplier() {
        assert_eq!(clamp_multiplier(30.0), 25.0);
        assert_eq!(clamp_multiplier(-30.0), -25.0);
        assert_eq!(clamp_multiplier(3.0), 3.0);
    }

    #[test]
    fn test_scale_0_100() {
        assert_eq!(scale_0_100(0.0, 10.0), 0.0);
        assert_eq!(scale_0_100(10.0, 10.0), 100.0);
        assert_eq!(scale_0_100(-5.0, 10.0), 50.0);
        assert_eq!(scale_0_100(20.0, 10.0), 100.0);
        assert_eq!(scale_0_100(1.0, 3.0), 33.33);
        assert_eq!(scale_0_100(5.0, 0.0), 0.0);
    }
}
