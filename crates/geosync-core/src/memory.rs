use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{normalize_code, Country, CountryQuery, NewCountry};
use crate::store::CountryStore;
use crate::sync::{SyncStats, UpsertOutcome};

/// [`CountryStore`] backed by a map, used by tests and for running the API
/// without PostgreSQL.
#[derive(Default)]
pub struct InMemoryCountryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    by_code: HashMap<String, Country>,
    last_id: i64,
}

impl InMemoryCountryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored countries.
    pub async fn len(&self) -> usize {
        self.state.read().await.by_code.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CountryStore for InMemoryCountryStore {
    async fn get_by_code(&self, code: &str) -> Result<Option<Country>, AppError> {
        let code = normalize_code(code);
        Ok(self.state.read().await.by_code.get(&code).cloned())
    }

    async fn get_all(&self, query: &CountryQuery) -> Result<Vec<Country>, AppError> {
        let region = query.region().map(str::to_lowercase);
        let search = query.search().map(str::to_lowercase);

        let state = self.state.read().await;
        let mut items: Vec<Country> = state
            .by_code
            .values()
            .filter(|c| match &region {
                Some(r) => contains_ci(c.region.as_deref(), r),
                None => true,
            })
            .filter(|c| match &search {
                Some(s) => contains_ci(Some(&c.name), s) || contains_ci(c.capital.as_deref(), s),
                None => true,
            })
            .cloned()
            .collect();

        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));

        Ok(items
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect())
    }

    async fn list_regions(&self) -> Result<Vec<String>, AppError> {
        let state = self.state.read().await;
        let mut regions: Vec<String> = state
            .by_code
            .values()
            .filter_map(|c| c.region.clone())
            .collect();
        regions.sort();
        regions.dedup();
        Ok(regions)
    }

    async fn upsert_many(&self, countries: &[NewCountry]) -> Result<SyncStats, AppError> {
        // Holding the write lock for the whole batch keeps readers from seeing
        // a half-applied sync.
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let mut stats = SyncStats::new();
        let now = Utc::now();

        for data in countries {
            let existed = match state.by_code.get_mut(&data.code) {
                Some(existing) => {
                    existing.apply(data, now);
                    true
                }
                None => {
                    state.last_id += 1;
                    let country = Country {
                        id: state.last_id,
                        code: data.code.clone(),
                        name: data.name.clone(),
                        capital: data.capital.clone(),
                        region: data.region.clone(),
                        subregion: data.subregion.clone(),
                        population: data.population,
                        area: data.area,
                        flag_url: data.flag_url.clone(),
                        created_at: now,
                        updated_at: None,
                    };
                    state.by_code.insert(country.code.clone(), country);
                    false
                }
            };
            stats.record(UpsertOutcome::from_existing(existed));
        }

        Ok(stats)
    }
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateCountry;

    fn country(code: &str, name: &str, capital: &str, region: &str) -> NewCountry {
        NewCountry::try_from(CandidateCountry {
            name: name.to_string(),
            code: code.to_string(),
            capital: Some(capital.to_string()),
            region: Some(region.to_string()),
            subregion: None,
            population: Some(1_000),
            area: Some(10.5),
            flag_url: None,
        })
        .unwrap()
    }

    fn sample() -> Vec<NewCountry> {
        vec![
            country("arg", "Argentina", "Buenos Aires", "Americas"),
            country("FRA", "France", "Paris", "Europe"),
            country("BRA", "Brazil", "Brasília", "Americas"),
        ]
    }

    async fn seeded() -> InMemoryCountryStore {
        let store = InMemoryCountryStore::new();
        store.upsert_many(&sample()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = InMemoryCountryStore::new();

        let first = store.upsert_many(&sample()).await.unwrap();
        assert_eq!(first, SyncStats { created: 3, updated: 0 });

        let second = store.upsert_many(&sample()).await.unwrap();
        assert_eq!(second, SyncStats { created: 0, updated: 3 });
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields_and_sets_timestamp() {
        let store = seeded().await;
        let before = store.get_by_code("ARG").await.unwrap().unwrap();
        assert!(before.updated_at.is_none());

        let mut changed = country("ARG", "Argentine Republic", "Buenos Aires", "Americas");
        changed.population = Some(46_000_000);
        changed.region = None;
        store.upsert_many(&[changed]).await.unwrap();

        let after = store.get_by_code("ARG").await.unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.name, "Argentine Republic");
        assert_eq!(after.population, Some(46_000_000));
        assert_eq!(after.region, None);
        assert!(after.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_codes_in_batch_last_wins() {
        let store = InMemoryCountryStore::new();
        let batch = vec![
            country("ARG", "First", "A", "Americas"),
            country("arg", "Second", "B", "Americas"),
        ];

        let stats = store.upsert_many(&batch).await.unwrap();
        assert_eq!(stats, SyncStats { created: 1, updated: 1 });
        assert_eq!(store.len().await, 1);

        let stored = store.get_by_code("ARG").await.unwrap().unwrap();
        assert_eq!(stored.name, "Second");
        assert_eq!(stored.capital.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = seeded().await;

        let upper = store.get_by_code("ARG").await.unwrap();
        let mixed = store.get_by_code("Arg").await.unwrap();
        let lower = store.get_by_code("arg").await.unwrap();

        assert!(upper.is_some());
        assert_eq!(upper, mixed);
        assert_eq!(upper, lower);
        assert!(store.get_by_code("XYZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_orders_by_name() {
        let store = seeded().await;
        let names: Vec<String> = store
            .get_all(&CountryQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Argentina", "Brazil", "France"]);
    }

    #[tokio::test]
    async fn test_region_filter_is_case_insensitive_substring() {
        let store = seeded().await;
        let query = CountryQuery::new(Some("amer".to_string()), None, 0, 50).unwrap();
        let result = store.get_all(&query).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result
            .iter()
            .all(|c| c.region.as_deref() == Some("Americas")));
    }

    #[tokio::test]
    async fn test_search_matches_name_or_capital() {
        let store = seeded().await;

        let by_capital = CountryQuery::new(None, Some("Buenos".to_string()), 0, 50).unwrap();
        let result = store.get_all(&by_capital).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "ARG");

        let by_name = CountryQuery::new(None, Some("fran".to_string()), 0, 50).unwrap();
        let result = store.get_all(&by_name).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "FRA");
    }

    #[tokio::test]
    async fn test_pagination_after_ordering() {
        let store = seeded().await;
        let query = CountryQuery::new(None, None, 1, 1).unwrap();
        let result = store.get_all(&query).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Brazil");
    }

    #[tokio::test]
    async fn test_list_regions_distinct_sorted() {
        let store = seeded().await;
        let mut no_region = country("ATA", "Antarctica", "", "");
        no_region.region = None;
        store.upsert_many(&[no_region]).await.unwrap();

        let regions = store.list_regions().await.unwrap();
        assert_eq!(regions, vec!["Americas", "Europe"]);
    }
}
