// 기술적 지표 모듈
// 모든 지표는 주어진 캔들 윈도우에서 매번 전체를 다시 계산합니다.

pub mod atr;
pub mod ichimoku;
pub mod macd;
pub mod rsi;
pub mod utils;

use crate::candle::Candle;
use crate::candle_store::CandleStore;
use crate::error::IndicatorResult;

/// 기술적 지표 생성 인터페이스
///
/// 기간/모드 파라미터를 보관하고, 캔들 윈도우로부터 지표를 계산합니다.
pub trait TABuilder<T, C: Candle>: Send + std::fmt::Debug {
    /// 계산에 필요한 최소 캔들 수
    fn required_len(&self) -> usize;

    /// 데이터에서 기술적 지표 생성
    ///
    /// # Arguments
    /// * `data` - 시간 오름차순 캔들 슬라이스
    ///
    /// # Returns
    /// * `IndicatorResult<T>` - 계산된 지표 또는 데이터 부족 오류
    fn build(&self, data: &[C]) -> IndicatorResult<T>;

    /// 캐시 저장소의 최근 캔들로 지표 생성
    fn from_storage(&self, storage: &CandleStore<C>) -> IndicatorResult<T> {
        self.build(&storage.get_time_ordered_items())
    }
}
