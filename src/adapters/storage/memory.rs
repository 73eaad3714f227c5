use crate::domain::model::{CategoryCount, SaleRecord, SaleStatistics};
use crate::domain::ports::RecordStore;
use crate::domain::query::SaleFilter;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 進程內記錄存儲，`memory://` 連線字串使用，資料不會持久化
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<SaleRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SaleRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn count(&self, filter: &SaleFilter) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn find(&self, filter: &SaleFilter, skip: u64, limit: u64) -> Result<Vec<SaleRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| filter.matches(r))
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn statistics(&self, filter: &SaleFilter) -> Result<Option<SaleStatistics>> {
        let records = self.records.read().await;
        let mut matched = false;
        let mut stats = SaleStatistics::default();

        for record in records.iter().filter(|r| filter.matches(r)) {
            matched = true;
            if record.sold {
                stats.total_sale_amount += record.price;
                stats.total_sold_items += 1;
            } else {
                stats.total_not_sold_items += 1;
            }
        }

        Ok(matched.then_some(stats))
    }

    async fn count_by_category(&self, filter: &SaleFilter) -> Result<Vec<CategoryCount>> {
        let records = self.records.read().await;
        let mut groups: Vec<CategoryCount> = Vec::new();

        for record in records.iter().filter(|r| filter.matches(r)) {
            match groups.iter_mut().find(|g| g.category == record.category) {
                Some(group) => group.count += 1,
                None => groups.push(CategoryCount {
                    category: record.category.clone(),
                    count: 1,
                }),
            }
        }

        Ok(groups)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn insert_many(&self, batch: Vec<SaleRecord>) -> Result<usize> {
        let mut records = self.records.write().await;
        let inserted = batch.len();
        records.extend(batch);
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::QueryBuilder;
    use crate::domain::query::Month;
    use chrono::{TimeZone, Utc};

    fn record(category: &str, price: f64, sold: bool, month: u32) -> SaleRecord {
        SaleRecord {
            id: None,
            title: format!("{} item", category),
            description: "test".to_string(),
            price,
            category: category.to_string(),
            image: None,
            sold,
            date_of_sale: Utc.with_ymd_and_hms(2022, month, 5, 8, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_statistics_none_when_nothing_matches() {
        let store = MemoryStore::with_records(vec![record("books", 10.0, true, 3)]);
        let pipeline = QueryBuilder::default()
            .build_statistics_pipeline(Month::new(4).unwrap())
            .unwrap();

        assert_eq!(store.statistics(&pipeline.filter).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_statistics_and_categories() {
        let store = MemoryStore::with_records(vec![
            record("books", 10.0, true, 3),
            record("books", 15.5, true, 3),
            record("toys", 99.0, false, 3),
            record("toys", 50.0, true, 4),
        ]);
        let builder = QueryBuilder::default();
        let march = Month::new(3).unwrap();

        let stats = store
            .statistics(&builder.build_statistics_pipeline(march).unwrap().filter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.total_sale_amount, 25.5);
        assert_eq!(stats.total_sold_items, 2);
        assert_eq!(stats.total_not_sold_items, 1);

        let groups = store
            .count_by_category(&builder.build_pie_chart_pipeline(march).unwrap().filter)
            .await
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains(&CategoryCount {
            category: "books".to_string(),
            count: 2
        }));
        assert!(groups.contains(&CategoryCount {
            category: "toys".to_string(),
            count: 1
        }));
    }

    #[tokio::test]
    async fn test_find_pages_in_insertion_order() {
        let records: Vec<_> = (1..=5).map(|i| record("books", i as f64, true, 3)).collect();
        let store = MemoryStore::with_records(records);
        let filter = QueryBuilder::default()
            .build_transaction_filter(Month::new(3).unwrap(), None)
            .unwrap();

        let page = store.find(&filter, 2, 2).await.unwrap();
        let prices: Vec<f64> = page.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![3.0, 4.0]);
        assert_eq!(store.count(&filter).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_delete_then_insert() {
        let store = MemoryStore::with_records(vec![record("books", 1.0, true, 1)]);
        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(store.is_empty().await);

        let inserted = store
            .insert_many(vec![record("toys", 2.0, false, 2), record("toys", 3.0, true, 2)])
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.len().await, 2);
    }
}
