use crate::candle::{Candle, CandleSeries};
use crate::error::{IndicatorError, IndicatorResult, ensure_len};
use chrono::{DateTime, Duration, Utc};

/// 제한된 크기의 캔들 캐시
///
/// 데이터 수집 계층이 소유하는 캔들 스냅샷입니다. 분석기는 이 저장소를 직접 읽지 않고
/// `series`로 잘라낸 윈도우만 인자로 전달받습니다.
/// 데이터는 타임스탬프 기준 내림차순으로 저장됩니다 (최신 데이터가 먼저 옴).
#[derive(Debug, Clone)]
pub struct CandleStore<C: Candle> {
    items: Vec<C>,
    pub max_size: usize,
    pub use_duplicated_filter: bool,
    /// 스냅샷 유효 시간
    pub ttl: Duration,
    refreshed_at: Option<DateTime<Utc>>,
}

/// 저장소 맨 앞의 아이템이 data와 동일한지 확인합니다.
fn is_same_item<T: PartialEq>(items: &[T], data: &T) -> bool {
    items.first() == Some(data)
}

impl<C> CandleStore<C>
where
    C: Candle,
{
    /// 새로운 CandleStore 인스턴스를 생성합니다.
    ///
    /// # Arguments
    /// * `items` - 초기 아이템 목록
    /// * `max_size` - 저장소의 최대 크기
    /// * `use_duplicated_filter` - 중복 아이템 필터링 사용 여부
    /// * `ttl` - 스냅샷 유효 시간
    pub fn new(
        mut items: Vec<C>,
        max_size: usize,
        use_duplicated_filter: bool,
        ttl: Duration,
    ) -> CandleStore<C> {
        items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        items.dedup_by(|a, b| a.timestamp() == b.timestamp());
        items.truncate(max_size);

        CandleStore {
            items,
            max_size,
            use_duplicated_filter,
            ttl,
            refreshed_at: None,
        }
    }

    /// 캔들을 타임스탬프 내림차순 위치에 삽입합니다.
    ///
    /// 같은 타임스탬프의 캔들이 이미 있으면 교체합니다 (진행 중인 봉 갱신).
    /// 최대 크기를 넘으면 가장 오래된 데이터가 제거됩니다.
    pub fn add(&mut self, data: C) {
        if self.use_duplicated_filter && is_same_item(&self.items, &data) {
            return;
        }

        match self
            .items
            .binary_search_by(|item| data.timestamp().cmp(&item.timestamp()))
        {
            Ok(idx) => {
                log::trace!("캔들 갱신: {}", data.timestamp());
                self.items[idx] = data;
            }
            Err(idx) => {
                self.items.insert(idx, data);
                self.items.truncate(self.max_size);
            }
        }
    }

    /// 여러 캔들을 한 번에 추가하고 갱신 시각을 기록합니다.
    pub fn extend(&mut self, candles: impl IntoIterator<Item = C>, now: DateTime<Utc>) {
        for candle in candles {
            self.add(candle);
        }
        self.mark_refreshed(now);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 가장 최신 캔들
    pub fn first(&self) -> Option<&C> {
        self.items.first()
    }

    /// 지정된 인덱스의 아이템 (0이 최신)
    pub fn get(&self, index: usize) -> Option<&C> {
        self.items.get(index)
    }

    /// 저장된 아이템 슬라이스 (최신순)
    pub fn items(&self) -> &[C] {
        &self.items
    }

    /// 스냅샷 갱신 시각 기록
    pub fn mark_refreshed(&mut self, now: DateTime<Utc>) {
        self.refreshed_at = Some(now);
    }

    /// 마지막 갱신 시각
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// 스냅샷이 만료되었는지 확인합니다. 한 번도 갱신되지 않았다면 만료로 봅니다.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.refreshed_at {
            Some(at) => now - at >= self.ttl,
            None => true,
        }
    }

    /// 저장된 캔들을 시간 순서대로 정렬하여 반환합니다.
    pub fn get_time_ordered_items(&self) -> Vec<C> {
        let mut items = self.items.clone();
        items.reverse();
        items
    }

    /// 최근 `window`개 캔들을 시간 오름차순 시리즈로 반환합니다.
    ///
    /// # Returns
    /// * `IndicatorResult<CandleSeries<C>>` - 저장된 캔들이 부족하면 `InsufficientData`
    pub fn series(&self, window: usize) -> IndicatorResult<CandleSeries<C>> {
        if window == 0 {
            return Err(IndicatorError::InvalidArgument(
                "시리즈 윈도우는 1 이상이어야 합니다".to_string(),
            ));
        }
        ensure_len("CandleStore", window, self.items.len())?;
        let mut items = self.items[..window].to_vec();
        items.reverse();
        CandleSeries::new(items)
    }
}
