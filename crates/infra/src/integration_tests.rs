//! Integration tests for the full write → notify → live query pipeline.
//!
//! Tests: ItemStore write → ItemRepository → EventBus → LiveQuery
//!
//! Verifies, against both backends:
//! - listings are name-sorted and re-delivered after every committed write
//! - insert-or-ignore leaves existing rows untouched and stays silent
//! - single-item views track their row and go quiet once it is deleted
//! - dropped live queries release their bus registration

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;
    use proptest::prelude::*;
    use tokio::time::timeout;

    use itemstore_inventory::{Item, ItemId};

    use crate::item_store::ItemStore;
    use crate::live_query::LiveQuery;
    use crate::repository::SqliteItemRepository;

    fn init_tracing() {
        itemstore_observability::init_with_filter("warn");
    }

    fn memory_store() -> ItemStore {
        init_tracing();
        ItemStore::in_memory()
    }

    async fn sqlite_store() -> ItemStore {
        init_tracing();
        let repo = SqliteItemRepository::connect("sqlite::memory:", 1)
            .await
            .expect("open in-memory sqlite");
        ItemStore::new(Arc::new(repo))
    }

    /// Helper: wait for the next emission, failing the test if none arrives.
    async fn next<T: Send + 'static>(query: &mut LiveQuery<T>) -> T {
        timeout(Duration::from_secs(2), query.next())
            .await
            .expect("live query should emit")
            .expect("live query should stay open")
            .expect("live query should not fail")
    }

    /// Helper: assert the query emits nothing for a short while.
    async fn assert_quiet<T: Send + 'static>(query: &mut LiveQuery<T>) {
        let waited = timeout(Duration::from_millis(100), query.next()).await;
        assert!(waited.is_err(), "expected no emission");
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    async fn widget_apple_scenario(store: ItemStore) {
        let mut all = store.list_all();
        assert!(next(&mut all).await.is_empty());

        store.insert(&Item::new(1, "Widget", 10, 2.50)).await.unwrap();
        assert_eq!(names(&next(&mut all).await), vec!["Widget"]);

        store.insert(&Item::new(2, "Apple", 5, 1.00)).await.unwrap();
        assert_eq!(names(&next(&mut all).await), vec!["Apple", "Widget"]);

        store.update(&Item::new(1, "Widget", 3, 2.50)).await.unwrap();
        let listed = next(&mut all).await;
        assert_eq!(names(&listed), vec!["Apple", "Widget"]);
        assert_eq!(listed[1].quantity, 3);

        store.delete(&Item::new(2, "Apple", 5, 1.00)).await.unwrap();
        assert_eq!(next(&mut all).await, vec![Item::new(1, "Widget", 3, 2.50)]);

        // A fresh subscription starts from the current state.
        let mut fresh = store.list_all();
        assert_eq!(next(&mut fresh).await, vec![Item::new(1, "Widget", 3, 2.50)]);
    }

    #[tokio::test]
    async fn widget_apple_scenario_in_memory() {
        widget_apple_scenario(memory_store()).await;
    }

    #[tokio::test]
    async fn widget_apple_scenario_sqlite() {
        widget_apple_scenario(sqlite_store().await).await;
    }

    async fn one_emission_per_mutation(store: ItemStore) {
        let mut all = store.list_all();
        assert!(next(&mut all).await.is_empty());

        store.insert(&Item::new(1, "Widget", 10, 2.50)).await.unwrap();
        let after_insert = next(&mut all).await;
        store.update(&Item::new(1, "Widget", 4, 2.50)).await.unwrap();
        let after_update = next(&mut all).await;
        store.delete_by_id(ItemId::from(1)).await.unwrap();
        let after_delete = next(&mut all).await;

        assert_eq!(after_insert, vec![Item::new(1, "Widget", 10, 2.50)]);
        assert_eq!(after_update, vec![Item::new(1, "Widget", 4, 2.50)]);
        assert!(after_delete.is_empty());
        assert_quiet(&mut all).await;
    }

    #[tokio::test]
    async fn one_emission_per_mutation_in_memory() {
        one_emission_per_mutation(memory_store()).await;
    }

    #[tokio::test]
    async fn one_emission_per_mutation_sqlite() {
        one_emission_per_mutation(sqlite_store().await).await;
    }

    async fn duplicate_insert_is_silent(store: ItemStore) {
        let original = Item::new(1, "Widget", 10, 2.50);
        store.insert(&original).await.unwrap();

        let mut all = store.list_all();
        assert_eq!(next(&mut all).await, vec![original.clone()]);

        let ignored = store
            .insert(&Item::new(1, "Counterfeit", 999, 0.01))
            .await
            .unwrap();
        assert_eq!(ignored, None);
        assert_quiet(&mut all).await;
        assert_eq!(store.find(1).await.unwrap(), Some(original));
    }

    #[tokio::test]
    async fn duplicate_insert_is_silent_in_memory() {
        duplicate_insert_is_silent(memory_store()).await;
    }

    #[tokio::test]
    async fn duplicate_insert_is_silent_sqlite() {
        duplicate_insert_is_silent(sqlite_store().await).await;
    }

    async fn missing_rows_are_silent_no_ops(store: ItemStore) {
        let mut all = store.list_all();
        assert!(next(&mut all).await.is_empty());

        assert!(!store.update(&Item::new(4, "Ghost", 1, 1.0)).await.unwrap());
        assert!(!store.delete_by_id(ItemId::from(4)).await.unwrap());
        assert_quiet(&mut all).await;
    }

    #[tokio::test]
    async fn missing_rows_are_silent_no_ops_in_memory() {
        missing_rows_are_silent_no_ops(memory_store()).await;
    }

    #[tokio::test]
    async fn missing_rows_are_silent_no_ops_sqlite() {
        missing_rows_are_silent_no_ops(sqlite_store().await).await;
    }

    async fn get_tracks_a_single_row(store: ItemStore) {
        // Nothing yet: the view waits for the row to exist.
        let mut one = store.get(1);
        assert_quiet(&mut one).await;

        store.insert(&Item::new(1, "Widget", 10, 2.50)).await.unwrap();
        assert_eq!(next(&mut one).await, Item::new(1, "Widget", 10, 2.50));

        // Writes to other rows do not wake it.
        store.insert(&Item::new(2, "Apple", 5, 1.00)).await.unwrap();
        assert_quiet(&mut one).await;

        let updated = Item::new(1, "Widget", 3, 2.75);
        store.update(&updated).await.unwrap();
        assert_eq!(next(&mut one).await, updated);

        store.delete(&updated).await.unwrap();
        assert_quiet(&mut one).await;

        let mut fresh = store.get(1);
        assert_quiet(&mut fresh).await;
        assert_eq!(names(&store.snapshot().await.unwrap()), vec!["Apple"]);
    }

    #[tokio::test]
    async fn get_tracks_a_single_row_in_memory() {
        get_tracks_a_single_row(memory_store()).await;
    }

    #[tokio::test]
    async fn get_tracks_a_single_row_sqlite() {
        get_tracks_a_single_row(sqlite_store().await).await;
    }

    #[tokio::test]
    async fn auto_assigned_keys_flow_through_live_queries() {
        let store = memory_store();
        let id = store
            .insert(&Item::unsaved("Widget", 1, 1.0))
            .await
            .unwrap()
            .expect("row written");

        let mut one = store.get(id);
        assert_eq!(next(&mut one).await.id, id);
    }

    #[tokio::test]
    async fn queued_changes_coalesce_into_latest_state() {
        let store = memory_store();
        let mut all = store.list_all();
        assert!(next(&mut all).await.is_empty());

        for n in 1..=5 {
            store
                .insert(&Item::new(n, format!("item-{n}"), 1, 1.0))
                .await
                .unwrap();
        }

        assert_eq!(next(&mut all).await.len(), 5);
        assert_quiet(&mut all).await;
    }

    #[tokio::test]
    async fn dropping_a_live_query_releases_its_registration() {
        let store = memory_store();
        let all = store.list_all();
        let one = store.get(1);
        assert_eq!(store.subscriber_count(), 2);

        drop(all);
        assert_eq!(store.subscriber_count(), 1);
        drop(one);
        assert_eq!(store.subscriber_count(), 0);

        // Writes with nobody listening still succeed.
        store.insert(&Item::new(1, "Widget", 1, 1.0)).await.unwrap();
    }

    #[tokio::test]
    async fn live_query_ends_when_store_is_dropped() {
        let store = memory_store();
        let mut all = store.list_all();
        assert!(next(&mut all).await.is_empty());

        drop(store);
        let ended = timeout(Duration::from_secs(2), all.next()).await.unwrap();
        assert!(ended.is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: items inserted with distinct ids are listed sorted by name.
        #[test]
        fn listing_is_sorted_by_name(
            labels in prop::collection::vec("[A-Za-z ]{1,12}", 1..25)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let listed = rt.block_on(async {
                let store = ItemStore::in_memory();
                for (i, name) in labels.iter().enumerate() {
                    let name = if name.trim().is_empty() { "x".to_string() } else { name.clone() };
                    store
                        .insert(&Item::new(i as i64 + 1, name, 1, 1.0))
                        .await
                        .unwrap();
                }
                let mut all = store.list_all();
                next(&mut all).await
            });

            prop_assert_eq!(listed.len(), labels.len());
            for pair in listed.windows(2) {
                prop_assert!(pair[0].name <= pair[1].name);
            }
        }
    }
}
