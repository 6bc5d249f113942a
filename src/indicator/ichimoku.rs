use crate::candle::{Candle, tail};
use crate::error::{IndicatorError, IndicatorResult, ensure_len};
use crate::indicator::TABuilder;
use std::fmt::Display;
use std::marker::PhantomData;

/// 일목균형표 전환선/기준선
///
/// 두 값 모두 윈도우의 마지막 캔들에서 끝나는 구간으로 계산됩니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ichimoku {
    /// 전환선(Tenkan-sen) 기간
    tenkan_period: usize,
    /// 기준선(Kijun-sen) 기간
    kijun_period: usize,
    /// 전환선 값 (단기 모멘텀)
    pub tenkan: f64,
    /// 기준선 값 (중기 모멘텀)
    pub kijun: f64,
}

/// 일목균형표 매개변수 구조체
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IchimokuParams {
    /// 전환선 기간 (일반적으로 9)
    pub tenkan_period: usize,
    /// 기준선 기간 (일반적으로 26)
    pub kijun_period: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        IchimokuParams {
            tenkan_period: 9,
            kijun_period: 26,
        }
    }
}

impl Display for IchimokuParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ichimoku({},{})", self.tenkan_period, self.kijun_period)
    }
}

impl Display for Ichimoku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ichimoku({},{}: T:{:.2}, K:{:.2})",
            self.tenkan_period, self.kijun_period, self.tenkan, self.kijun
        )
    }
}

impl Ichimoku {
    /// 전환선이 기준선 위에 있는지 확인
    pub fn is_tenkan_above_kijun(&self) -> bool {
        self.tenkan > self.kijun
    }

    /// 전환선 - 기준선
    pub fn diff(&self) -> f64 {
        self.tenkan - self.kijun
    }
}

/// 최근 `period`개 캔들의 (최고가 + 최저가) / 2
fn midpoint<C: Candle>(data: &[C], period: usize) -> f64 {
    let window = tail(data, period);
    let high = window
        .iter()
        .map(|c| c.high_price())
        .fold(f64::MIN, f64::max);
    let low = window
        .iter()
        .map(|c| c.low_price())
        .fold(f64::MAX, f64::min);
    (high + low) / 2.0
}

/// 전환선/기준선 계산
///
/// # Arguments
/// * `data` - 캔들 슬라이스 (`kijun_period`개 이상)
/// * `params` - 전환선/기준선 기간
pub fn calculate_tenkan_kijun<C: Candle>(
    data: &[C],
    params: IchimokuParams,
) -> IndicatorResult<Ichimoku> {
    if params.tenkan_period == 0 || params.kijun_period == 0 {
        return Err(IndicatorError::InvalidArgument(
            "일목균형표 기간은 0보다 커야 합니다".to_string(),
        ));
    }
    ensure_len("Ichimoku", params.kijun_period, data.len())?;

    Ok(Ichimoku {
        tenkan_period: params.tenkan_period,
        kijun_period: params.kijun_period,
        tenkan: midpoint(data, params.tenkan_period),
        kijun: midpoint(data, params.kijun_period),
    })
}

/// 일목균형표 빌더
#[derive(Debug)]
pub struct IchimokuBuilder<C: Candle> {
    params: IchimokuParams,
    _phantom: PhantomData<C>,
}

impl<C: Candle> IchimokuBuilder<C> {
    pub fn new(params: IchimokuParams) -> IndicatorResult<Self> {
        if params.tenkan_period == 0 || params.kijun_period == 0 {
            return Err(IndicatorError::InvalidArgument(
                "일목균형표 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(IchimokuBuilder {
            params,
            _phantom: PhantomData,
        })
    }

    pub fn params(&self) -> IchimokuParams {
        self.params
    }
}

impl<C: Candle> TABuilder<Ichimoku, C> for IchimokuBuilder<C> {
    fn required_len(&self) -> usize {
        self.params.kijun_period
    }

    fn build(&self, data: &[C]) -> IndicatorResult<Ichimoku> {
        calculate_tenkan_kijun(data, self.params)
    }
}
