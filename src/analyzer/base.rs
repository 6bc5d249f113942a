use crate::candle::{Candle, tail};
use crate::error::IndicatorResult;
use std::fmt::Display;

/// 한 신호 소스가 만든 상승/하락 힘과 이벤트 수
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceTally {
    /// 상승 힘 합계
    pub bullish: f64,
    /// 하락 힘 합계
    pub bearish: f64,
    /// 상승 이벤트 수 (신뢰도 계산용)
    pub bullish_count: usize,
    /// 하락 이벤트 수 (신뢰도 계산용)
    pub bearish_count: usize,
}

impl ForceTally {
    /// 상승 힘 추가 (이벤트 수 증가 없음)
    pub fn push_bullish(&mut self, force: f64) {
        self.bullish += force;
    }

    /// 하락 힘 추가 (이벤트 수 증가 없음)
    pub fn push_bearish(&mut self, force: f64) {
        self.bearish += force;
    }

    /// 상승 이벤트 기록
    pub fn bullish_event(&mut self, impact: f64) {
        self.bullish += impact;
        self.bullish_count += 1;
    }

    /// 하락 이벤트 기록
    pub fn bearish_event(&mut self, impact: f64) {
        self.bearish += impact;
        self.bearish_count += 1;
    }

    /// 상승 - 하락
    pub fn net(&self) -> f64 {
        self.bullish - self.bearish
    }
}

impl std::ops::Add for ForceTally {
    type Output = ForceTally;

    fn add(self, rhs: ForceTally) -> ForceTally {
        ForceTally {
            bullish: self.bullish + rhs.bullish,
            bearish: self.bearish + rhs.bearish,
            bullish_count: self.bullish_count + rhs.bullish_count,
            bearish_count: self.bearish_count + rhs.bearish_count,
        }
    }
}

impl Display for ForceTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "상승 {:.2} ({}건), 하락 {:.2} ({}건)",
            self.bullish, self.bullish_count, self.bearish, self.bearish_count
        )
    }
}

/// 이벤트 소스를 힘 합계로 바꾸는 분석기 인터페이스
///
/// 각 분석기는 자신의 후행 윈도우 길이를 가지며, 호출마다 윈도우 전체를 다시 계산합니다.
pub trait ForceAnalyzer<C: Candle> {
    /// 이 분석기가 사용하는 후행 윈도우 길이
    fn window(&self) -> usize;

    /// 주어진 윈도우 전체로 힘 합계 계산
    fn tally(&self, data: &[C]) -> IndicatorResult<ForceTally>;

    /// 데이터의 마지막 `window()`개 캔들로 힘 합계 계산
    fn tally_tail(&self, data: &[C]) -> IndicatorResult<ForceTally> {
        self.tally(tail(data, self.window()))
    }
}
